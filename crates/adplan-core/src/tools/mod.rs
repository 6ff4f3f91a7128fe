//! Tool-driven construction of drawables.

use crate::history::UndoManager;
use crate::shapes::{
    Arrow, Circle, Cone, Dash, Drawable, DrawableId, DrawableStyle, Path, Rectangle, Rgba,
    StraightLine, Triangle,
};
use crate::store::PageStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Path,
    Dash,
    Line,
    Arrow,
    Rectangle,
    Circle,
    Donut,
    Cone,
    Triangle,
}

impl ToolKind {
    /// Whether dragging with this tool draws a new drawable.
    pub fn is_drawing_tool(self) -> bool {
        self != ToolKind::Select
    }

    /// Shapes whose fill option tints the color instead of drawing an outline.
    fn supports_fill(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Donut | ToolKind::Cone | ToolKind::Triangle
        )
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A drawable is being dragged out.
    Active {
        /// Starting point of the interaction.
        start: Point,
        /// Preview drawable being drawn.
        preview: Drawable,
    },
}

/// Manages the current tool and the drawable it is drawing.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Color applied to new drawables.
    pub color: Rgba,
    /// Stroke thickness applied to new drawables.
    pub thickness: f64,
    /// Fill toggle for shapes that support it.
    pub filled: bool,
}

impl Default for ToolManager {
    fn default() -> Self {
        let style = DrawableStyle::default();
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            color: style.color,
            thickness: style.thickness,
            filled: false,
        }
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, abandoning any drawing in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// The drawable currently being drawn, if any.
    pub fn preview(&self) -> Option<&Drawable> {
        match &self.state {
            ToolState::Active { preview, .. } => Some(preview),
            ToolState::Idle => None,
        }
    }

    fn style(&self) -> DrawableStyle {
        if self.current_tool.supports_fill() {
            DrawableStyle::tinted(self.color, self.thickness, self.filled)
        } else {
            DrawableStyle::new(self.color, self.thickness, false)
        }
    }

    /// Begin drawing at `point`. Does nothing for the select tool.
    pub fn begin(&mut self, point: Point) {
        let style = self.style();
        let mut preview: Drawable = match self.current_tool {
            ToolKind::Select => return,
            ToolKind::Path => Path::new(vec![point], style).into(),
            ToolKind::Dash => Dash::new(vec![point], style).into(),
            ToolKind::Line => StraightLine::new(point, point, style).into(),
            ToolKind::Arrow => Arrow::new(point, point, style).into(),
            ToolKind::Rectangle => Rectangle::new(point, point, style).into(),
            ToolKind::Circle => Circle::new(point, 0.0, style).into(),
            ToolKind::Donut => Drawable::Donut(Circle::new(point, 0.0, style)),
            ToolKind::Cone => Cone::new(point, point, style).into(),
            ToolKind::Triangle => Triangle::anchored(point, style).into(),
        };
        preview.flags_mut().preview = true;
        self.state = ToolState::Active { start: point, preview };
    }

    /// Grow the preview toward `point`.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { preview, .. } = &mut self.state {
            preview.update_preview(point);
        }
    }

    /// Finish drawing.
    ///
    /// A drawable that passes the validity gate is recorded for undo and
    /// appended to the active page. One that fails is discarded and `None`
    /// is returned.
    pub fn finish(&mut self, store: &mut PageStore, undo: &mut UndoManager) -> Option<DrawableId> {
        let ToolState::Active { mut preview, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        if !preview.is_valid() {
            log::debug!("Discarding {} below minimum size", preview.drawable_type().name());
            return None;
        }
        preview.flags_mut().preview = false;
        undo.record_action(
            store.current_page_drawables(),
            format!("Draw {}", preview.drawable_type().name()),
        );
        let id = preview.id();
        store.add_drawable(preview);
        Some(id)
    }

    /// Abandon the drawing in progress.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{DrawableType, FILL_ALPHA};

    fn draw(tool: ToolKind, from: Point, to: Point) -> (Option<DrawableId>, PageStore, UndoManager) {
        let mut tools = ToolManager::new();
        tools.set_tool(tool);
        let mut store = PageStore::new();
        let mut undo = UndoManager::default();
        tools.begin(from);
        tools.update(to);
        let id = tools.finish(&mut store, &mut undo);
        (id, store, undo)
    }

    #[test]
    fn test_rectangle_drawn_and_recorded() {
        let (id, store, undo) = draw(ToolKind::Rectangle, Point::new(0.0, 0.0), Point::new(40.0, 30.0));
        let id = id.unwrap();
        let drawable = store.get_drawable(id).unwrap();
        assert_eq!(drawable.drawable_type(), DrawableType::Rectangle);
        assert!(!drawable.flags().preview);
        assert_eq!(undo.peek_description(), Some("Draw rectangle"));
    }

    #[test]
    fn test_small_shapes_are_discarded() {
        let (id, store, undo) = draw(ToolKind::Rectangle, Point::new(0.0, 0.0), Point::new(1.0, 40.0));
        assert!(id.is_none());
        assert!(store.current_page_drawables().is_empty());
        assert!(undo.is_empty());

        let (id, _, _) = draw(ToolKind::Circle, Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!(id.is_none());
    }

    #[test]
    fn test_circle_radius_from_drag() {
        let (id, store, _) = draw(ToolKind::Circle, Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        let Some(Drawable::Circle(c)) = store.get_drawable(id.unwrap()) else {
            panic!("expected circle");
        };
        assert!((c.radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_needs_two_points() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Path);
        let mut store = PageStore::new();
        let mut undo = UndoManager::default();

        tools.begin(Point::new(0.0, 0.0));
        assert!(tools.finish(&mut store, &mut undo).is_none());

        tools.begin(Point::new(0.0, 0.0));
        tools.update(Point::new(5.0, 0.0));
        tools.update(Point::new(10.0, 0.0));
        let id = tools.finish(&mut store, &mut undo).unwrap();
        let Some(Drawable::Path(p)) = store.get_drawable(id) else {
            panic!("expected path");
        };
        assert_eq!(p.points.len(), 3);
    }

    #[test]
    fn test_filled_shapes_are_tinted() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Triangle);
        tools.filled = true;
        tools.begin(Point::ZERO);
        assert_eq!(tools.preview().unwrap().style().color.a, FILL_ALPHA);
        assert!(tools.preview().unwrap().flags().preview);

        tools.set_tool(ToolKind::Line);
        assert!(!tools.is_active());
        tools.begin(Point::ZERO);
        assert_eq!(tools.preview().unwrap().style().color.a, 1.0);
    }

    #[test]
    fn test_select_tool_draws_nothing() {
        let mut tools = ToolManager::new();
        tools.begin(Point::ZERO);
        assert!(!tools.is_active());
        let mut store = PageStore::new();
        assert!(tools.finish(&mut store, &mut UndoManager::default()).is_none());
    }
}
