//! Page store: the pages being edited and the page currently shown.

use crate::codec::{CodecError, MAX_PAGES_PER_PLAN, NetworkPayload, PayloadAction};
use crate::config::{CoreConfig, DEFAULT_HIT_THRESHOLD};
use crate::plan::Page;
use crate::shapes::{Drawable, DrawableId};
use kurbo::{Point, Vec2};
use std::collections::HashSet;
use thiserror::Error;

/// Page store errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Page index {0} is negative")]
    NegativePageIndex(i32),
    #[error("Page index {index} exceeds the limit of {max} pages")]
    PageIndexTooLarge { index: usize, max: usize },
    #[error("Page {index} does not exist ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Payload data is malformed: {0}")]
    Codec(#[from] CodecError),
}

/// Ordered pages plus the index of the active one.
///
/// The store always holds at least one page.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: Vec<Page>,
    current: usize,
    /// Tolerance used by [`PageStore::pick`].
    hit_threshold: f64,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore {
    /// Create a store with a single empty page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::new(default_page_name(0))],
            current: 0,
            hit_threshold: DEFAULT_HIT_THRESHOLD,
        }
    }

    /// Create a store that picks with `config.hit_threshold`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            hit_threshold: config.hit_threshold,
            ..Self::new()
        }
    }

    pub fn hit_threshold(&self) -> f64 {
        self.hit_threshold
    }

    pub fn set_hit_threshold(&mut self, threshold: f64) {
        self.hit_threshold = threshold;
    }

    /// All pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_index(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    /// Drawables on the active page, back to front.
    pub fn current_page_drawables(&self) -> &[Drawable] {
        &self.pages[self.current].drawables
    }

    pub fn current_page_drawables_mut(&mut self) -> &mut Vec<Drawable> {
        &mut self.pages[self.current].drawables
    }

    /// Replace the active page's drawables wholesale.
    pub fn set_current_page_drawables(&mut self, drawables: Vec<Drawable>) {
        self.pages[self.current].drawables = drawables;
    }

    /// Replace every page, e.g. after opening a plan. The first page becomes active.
    pub fn load_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        if self.pages.is_empty() {
            self.pages.push(Page::new(default_page_name(0)));
        }
        self.current = 0;
    }

    /// Take the pages out, leaving a fresh single-page store behind.
    pub fn take_pages(&mut self) -> Vec<Page> {
        let fresh = Self {
            hit_threshold: self.hit_threshold,
            ..Self::new()
        };
        std::mem::replace(self, fresh).pages
    }

    /// Append a page and return its index.
    pub fn add_page(&mut self, name: impl Into<String>) -> usize {
        self.pages.push(Page::new(name));
        self.pages.len() - 1
    }

    /// Switch the active page.
    pub fn set_current_page(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.pages.len() {
            return Err(StoreError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Append a drawable on top of the active page.
    pub fn add_drawable(&mut self, drawable: Drawable) {
        self.current_page_drawables_mut().push(drawable);
    }

    pub fn get_drawable(&self, id: DrawableId) -> Option<&Drawable> {
        self.current_page_drawables().iter().find(|d| d.id() == id)
    }

    pub fn get_drawable_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.current_page_drawables_mut().iter_mut().find(|d| d.id() == id)
    }

    /// Find drawables on the active page under `point`.
    /// Returned front to back, so the first hit is the one painted on top.
    pub fn drawables_at_point(&self, point: Point, threshold: f64) -> Vec<DrawableId> {
        self.current_page_drawables()
            .iter()
            .rev()
            .filter(|d| d.is_hit(point, threshold))
            .map(Drawable::id)
            .collect()
    }

    /// Topmost drawable under `point` at the store's hit threshold.
    pub fn pick(&self, point: Point) -> Option<DrawableId> {
        self.current_page_drawables()
            .iter()
            .rev()
            .find(|d| d.is_hit(point, self.hit_threshold))
            .map(Drawable::id)
    }

    /// Remove drawables from the active page and return them.
    pub fn remove_drawables(&mut self, ids: &[DrawableId]) -> Vec<Drawable> {
        let ids: HashSet<_> = ids.iter().copied().collect();
        let (removed, kept) = std::mem::take(self.current_page_drawables_mut())
            .into_iter()
            .partition(|d| ids.contains(&d.id()));
        self.set_current_page_drawables(kept);
        removed
    }

    /// Move drawables on the active page by `delta`.
    pub fn translate_drawables(&mut self, ids: &[DrawableId], delta: Vec2) {
        for drawable in self.current_page_drawables_mut() {
            if ids.contains(&drawable.id()) {
                drawable.translate(delta);
            }
        }
    }

    /// Make sure `index` exists, appending empty pages as needed.
    fn ensure_page(&mut self, index: usize) -> &mut Page {
        while self.pages.len() <= index {
            let name = default_page_name(self.pages.len());
            self.pages.push(Page::new(name));
        }
        &mut self.pages[index]
    }

    /// Apply a remote page mutation.
    ///
    /// Indices past the end pad the store with empty pages, up to the number
    /// of pages a plan file can hold. Add does not deduplicate, so a
    /// redelivered add duplicates its drawables.
    pub fn apply_payload(&mut self, payload: &NetworkPayload) -> Result<(), StoreError> {
        let index = usize::try_from(payload.page_index)
            .map_err(|_| StoreError::NegativePageIndex(payload.page_index))?;
        if index >= MAX_PAGES_PER_PLAN {
            return Err(StoreError::PageIndexTooLarge {
                index,
                max: MAX_PAGES_PER_PLAN,
            });
        }

        // Decode before touching the store so a bad payload changes nothing.
        match payload.action {
            PayloadAction::AddObjects => {
                let drawables = payload.drawables()?;
                self.ensure_page(index).drawables.extend(drawables);
            }
            PayloadAction::ReplacePage => {
                let drawables = payload.drawables()?;
                self.ensure_page(index).drawables = drawables;
            }
            PayloadAction::UpdateObjects => {
                let drawables = payload.drawables()?;
                let page = self.ensure_page(index);
                for incoming in drawables {
                    match page.drawables.iter_mut().find(|d| d.id() == incoming.id()) {
                        Some(existing) => *existing = incoming,
                        None => page.drawables.push(incoming),
                    }
                }
            }
            PayloadAction::DeleteObjects => {
                let ids: HashSet<_> = payload.deleted_ids()?.into_iter().collect();
                self.ensure_page(index)
                    .drawables
                    .retain(|d| !ids.contains(&d.id()));
            }
            PayloadAction::ClearPage => {
                self.ensure_page(index).drawables.clear();
            }
        }
        log::debug!("Applied {:?} to page {}", payload.action, index);
        Ok(())
    }
}

/// Pages are named by their 1-based position.
fn default_page_name(index: usize) -> String {
    (index + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, DrawableStyle, Rectangle, Rgba, StraightLine};

    fn line(x: f64) -> Drawable {
        StraightLine::new(Point::new(x, 0.0), Point::new(x, 100.0), DrawableStyle::default()).into()
    }

    #[test]
    fn test_new_store_has_one_page() {
        let store = PageStore::new();
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.current_page().name, "1");
        assert!(store.current_page_drawables().is_empty());
    }

    #[test]
    fn test_add_payload_pads_sparse_pages() {
        let mut store = PageStore::new();
        store.add_drawable(line(0.0));
        let original = store.current_page_drawables().to_vec();

        let incoming = vec![line(10.0), line(20.0)];
        let payload = NetworkPayload::add_objects(3, &incoming).unwrap();
        store.apply_payload(&payload).unwrap();

        assert_eq!(store.page_count(), 4);
        assert_eq!(store.pages()[0].drawables, original);
        assert!(store.pages()[1].drawables.is_empty());
        assert!(store.pages()[2].drawables.is_empty());
        assert_eq!(store.pages()[3].drawables, incoming);
        assert_eq!(store.pages()[3].name, "4");
    }

    #[test]
    fn test_add_is_not_deduplicated() {
        let mut store = PageStore::new();
        let payload = NetworkPayload::add_objects(0, &[line(1.0)]).unwrap();
        store.apply_payload(&payload).unwrap();
        store.apply_payload(&payload).unwrap();
        assert_eq!(store.current_page_drawables().len(), 2);
    }

    #[test]
    fn test_replace_update_delete_clear() {
        let mut store = PageStore::new();
        let a = line(1.0);
        let b = line(2.0);
        store
            .apply_payload(&NetworkPayload::replace_page(0, &[a.clone(), b.clone()]).unwrap())
            .unwrap();
        assert_eq!(store.current_page_drawables().len(), 2);

        let mut moved = a.clone();
        moved.translate(Vec2::new(5.0, 0.0));
        let c = line(3.0);
        store
            .apply_payload(&NetworkPayload::update_objects(0, &[moved.clone(), c.clone()]).unwrap())
            .unwrap();
        assert_eq!(store.current_page_drawables(), &[moved, b.clone(), c][..]);

        store
            .apply_payload(&NetworkPayload::delete_objects(0, &[b.id()]).unwrap())
            .unwrap();
        assert!(store.get_drawable(b.id()).is_none());
        assert_eq!(store.current_page_drawables().len(), 2);

        store.apply_payload(&NetworkPayload::clear_page(0)).unwrap();
        assert!(store.current_page_drawables().is_empty());
    }

    #[test]
    fn test_negative_index_rejected() {
        let mut store = PageStore::new();
        let payload = NetworkPayload::clear_page(-1);
        assert_eq!(store.apply_payload(&payload), Err(StoreError::NegativePageIndex(-1)));
        assert_eq!(store.page_count(), 1);
    }

    #[test]
    fn test_page_index_beyond_plan_limit_rejected() {
        let mut store = PageStore::new();
        let last = MAX_PAGES_PER_PLAN as i32 - 1;
        store.apply_payload(&NetworkPayload::clear_page(last)).unwrap();
        assert_eq!(store.page_count(), MAX_PAGES_PER_PLAN);

        let mut store = PageStore::new();
        for index in [MAX_PAGES_PER_PLAN as i32, i32::MAX] {
            let result = store.apply_payload(&NetworkPayload::clear_page(index));
            assert_eq!(
                result,
                Err(StoreError::PageIndexTooLarge {
                    index: index as usize,
                    max: MAX_PAGES_PER_PLAN
                })
            );
            assert_eq!(store.page_count(), 1);
        }
    }

    #[test]
    fn test_malformed_payload_leaves_store_untouched() {
        let mut store = PageStore::new();
        let payload = NetworkPayload {
            page_index: 5,
            action: PayloadAction::AddObjects,
            data: vec![1, 2, 3],
        };
        assert!(matches!(store.apply_payload(&payload), Err(StoreError::Codec(_))));
        assert_eq!(store.page_count(), 1);
    }

    #[test]
    fn test_drawables_at_point_topmost_first() {
        let mut store = PageStore::new();
        let rect: Drawable =
            Rectangle::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0), DrawableStyle::tinted(Rgba::black(), 2.0, true)).into();
        let circle: Drawable = Circle::new(Point::new(50.0, 50.0), 10.0, DrawableStyle::tinted(Rgba::black(), 2.0, true)).into();
        store.add_drawable(rect.clone());
        store.add_drawable(circle.clone());

        assert_eq!(store.drawables_at_point(Point::new(50.0, 50.0), 0.0), vec![circle.id(), rect.id()]);
        assert_eq!(store.drawables_at_point(Point::new(10.0, 10.0), 0.0), vec![rect.id()]);
        assert!(store.drawables_at_point(Point::new(300.0, 300.0), 0.0).is_empty());
    }

    #[test]
    fn test_pick_uses_configured_threshold() {
        let circle: Drawable = Circle::new(Point::new(0.0, 0.0), 10.0, DrawableStyle::default()).into();
        // Ring reach is the threshold plus half the thickness.
        let outside_default = Point::new(17.0, 0.0);

        let mut store = PageStore::new();
        store.add_drawable(circle.clone());
        assert_eq!(store.hit_threshold(), DEFAULT_HIT_THRESHOLD);
        assert!(store.pick(Point::new(16.0, 0.0)).is_some());
        assert!(store.pick(outside_default).is_none());

        let config = CoreConfig::from_json(r#"{"hit_threshold": 6.0}"#).unwrap();
        let mut store = PageStore::from_config(&config);
        store.add_drawable(circle.clone());
        assert_eq!(store.pick(outside_default), Some(circle.id()));
        store.take_pages();
        assert_eq!(store.hit_threshold(), 6.0);
    }

    #[test]
    fn test_remove_and_translate() {
        let mut store = PageStore::new();
        let a = line(0.0);
        let b = line(50.0);
        store.set_current_page_drawables(vec![a.clone(), b.clone()]);

        store.translate_drawables(&[b.id()], Vec2::new(10.0, 0.0));
        let Some(Drawable::StraightLine(moved)) = store.get_drawable(b.id()) else {
            panic!("expected line");
        };
        assert_eq!(moved.start_point, Point::new(60.0, 0.0));

        let removed = store.remove_drawables(&[a.id()]);
        assert_eq!(removed, vec![a]);
        assert_eq!(store.current_page_drawables().len(), 1);
    }

    #[test]
    fn test_pages_and_switching() {
        let mut store = PageStore::new();
        let second = store.add_page("Upstairs");
        assert_eq!(second, 1);
        store.set_current_page(second).unwrap();
        store.add_drawable(line(0.0));
        assert_eq!(store.pages()[1].drawables.len(), 1);
        assert!(store.set_current_page(9).is_err());

        store.load_pages(Vec::new());
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.current_page_index(), 0);
    }
}
