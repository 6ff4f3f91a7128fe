//! Text label shape.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use kurbo::{Point, Rect, Size, Vec2};

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) base: DrawableBase,
    pub position: Point,
    text: String,
    font_size: f64,
    /// Wrap width (0 = no wrapping).
    wrap_width: f64,
    /// Derived from the fields above, never persisted.
    computed_size: Size,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    /// Advance per character, relative to font size.
    const CHAR_WIDTH_RATIO: f64 = 0.6;
    const LINE_HEIGHT_RATIO: f64 = 1.2;

    pub fn new(position: Point, text: impl Into<String>, font_size: f64, wrap_width: f64, style: DrawableStyle) -> Self {
        let mut shape = Self {
            base: DrawableBase::new(style),
            position,
            text: text.into(),
            font_size,
            wrap_width,
            computed_size: Size::ZERO,
        };
        shape.recompute_size();
        shape
    }

    pub(crate) fn reconstruct(
        id: DrawableId,
        style: DrawableStyle,
        position: Point,
        text: String,
        font_size: f64,
        wrap_width: f64,
    ) -> Self {
        let mut shape = Self {
            base: DrawableBase::with_id(id, style),
            position,
            text,
            font_size,
            wrap_width,
            computed_size: Size::ZERO,
        };
        shape.recompute_size();
        shape
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn wrap_width(&self) -> f64 {
        self.wrap_width
    }

    pub fn computed_size(&self) -> Size {
        self.computed_size
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.recompute_size();
    }

    pub fn set_font_size(&mut self, font_size: f64) {
        self.font_size = font_size;
        self.recompute_size();
    }

    pub fn set_wrap_width(&mut self, wrap_width: f64) {
        self.wrap_width = wrap_width;
        self.recompute_size();
    }

    /// Lines after wrapping, measured in characters.
    pub fn wrapped_lines(&self) -> Vec<String> {
        let char_width = self.font_size * Self::CHAR_WIDTH_RATIO;
        let max_chars = if self.wrap_width > 0.0 && char_width > 0.0 {
            ((self.wrap_width / char_width).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        let mut lines = Vec::new();
        for raw in self.text.split('\n') {
            let mut current = String::new();
            let mut current_len = 0;
            for word in raw.split(' ') {
                let word_len = word.chars().count();
                if !current.is_empty() && current_len + 1 + word_len > max_chars {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                // Break words longer than a full line.
                let mut rest = word;
                let mut rest_len = word_len;
                while current_len + rest_len > max_chars {
                    let split_at = rest.char_indices().nth(max_chars).map_or(rest.len(), |(i, _)| i);
                    lines.push(rest[..split_at].to_string());
                    rest = &rest[split_at..];
                    rest_len -= max_chars;
                }
                current.push_str(rest);
                current_len += rest_len;
            }
            lines.push(current);
        }
        lines
    }

    fn recompute_size(&mut self) {
        let lines = self.wrapped_lines();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = longest as f64 * self.font_size * Self::CHAR_WIDTH_RATIO;
        let height = lines.len() as f64 * self.font_size * Self::LINE_HEIGHT_RATIO;
        self.computed_size = Size::new(width, height);
    }
}

impl DrawableTrait for Text {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        Rect::from_origin_size(self.position, self.computed_size)
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        self.bounding_box().inflate(threshold, threshold).contains(point)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    // Text is placed, not dragged out.
    fn update_preview(&mut self, _point: Point) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_size() {
        let text = Text::new(Point::ZERO, "hello", 10.0, 0.0, DrawableStyle::default());
        let size = text.computed_size();
        assert!((size.width - 30.0).abs() < 1e-9);
        assert!((size.height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_wraps_at_width() {
        // 6 px per char, 5 chars per line.
        let text = Text::new(Point::ZERO, "aaa bbb ccc", 10.0, 30.0, DrawableStyle::default());
        assert_eq!(text.wrapped_lines(), vec!["aaa", "bbb", "ccc"]);
        assert!((text.computed_size().height - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_word_is_broken() {
        let text = Text::new(Point::ZERO, "abcdefgh", 10.0, 30.0, DrawableStyle::default());
        assert_eq!(text.wrapped_lines(), vec!["abcde", "fgh"]);
    }

    #[test]
    fn test_long_word_wraps_in_linear_time() {
        let word = "é".repeat(200_000);
        let start = std::time::Instant::now();
        // One character per line.
        let text = Text::new(Point::ZERO, word, 16.0, 6.0, DrawableStyle::default());
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
        let lines = text.wrapped_lines();
        assert_eq!(lines.len(), 200_000);
        assert!(lines.iter().all(|line| line == "é"));
    }

    #[test]
    fn test_set_text_recomputes() {
        let mut text = Text::new(Point::ZERO, "a", 10.0, 0.0, DrawableStyle::default());
        text.set_text("a\nb\nc");
        assert!((text.computed_size().height - 36.0).abs() < 1e-9);
        assert!(text.is_hit(Point::new(3.0, 30.0), 0.0));
        assert!(!text.is_hit(Point::new(10.0, 30.0), 0.0));
    }
}
