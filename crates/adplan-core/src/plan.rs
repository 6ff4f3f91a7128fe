//! Plan documents: named, ordered collections of pages.

use crate::shapes::Drawable;

/// Application version stamped into saved plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AppVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl AppVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self { major, minor, patch }
    }

    /// Version of this build, taken from the crate manifest.
    pub fn current() -> Self {
        let parse = |s: &str| s.parse().unwrap_or(0);
        Self::new(
            parse(env!("CARGO_PKG_VERSION_MAJOR")),
            parse(env!("CARGO_PKG_VERSION_MINOR")),
            parse(env!("CARGO_PKG_VERSION_PATCH")),
        )
    }
}

impl std::fmt::Display for AppVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A named page and the drawables on it, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub name: String,
    pub drawables: Vec<Drawable>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            drawables: Vec::new(),
        }
    }

    pub fn with_drawables(name: impl Into<String>, drawables: Vec<Drawable>) -> Self {
        Self {
            name: name.into(),
            drawables,
        }
    }
}

/// A complete plan document.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub name: String,
    /// Container format version the plan was read with or will be written as.
    pub format_version: i32,
    pub app_version: AppVersion,
    pub pages: Vec<Page>,
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format_version: crate::codec::PLAN_FORMAT_VERSION,
            app_version: AppVersion::current(),
            pages: Vec::new(),
        }
    }

    pub fn with_pages(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            pages,
            ..Self::new(name)
        }
    }

    pub fn drawable_count(&self) -> usize {
        self.pages.iter().map(|p| p.drawables.len()).sum()
    }
}
