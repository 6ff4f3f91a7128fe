//! Drawable definitions for plan pages.

mod circle;
mod cone;
pub mod factory;
mod image;
mod line;
mod path;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use cone::Cone;
pub use image::Image;
pub use line::{Arrow, StraightLine};
pub use path::{Dash, Path};
pub use rectangle::Rectangle;
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use uuid::Uuid;

/// Unique identifier for drawables.
pub type DrawableId = Uuid;

/// Alpha applied to the tint of filled convenience shapes.
pub const FILL_ALPHA: f32 = 0.4;

/// RGBA color with unit-float channels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub const fn red() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.components;
        Self { r, g, b, a }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::new([color.r, color.g, color.b, color.a])
    }
}

/// Persisted appearance shared by every drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawableStyle {
    pub color: Rgba,
    /// Stroke thickness.
    pub thickness: f64,
    pub is_filled: bool,
}

impl DrawableStyle {
    pub fn new(color: Rgba, thickness: f64, is_filled: bool) -> Self {
        Self {
            color,
            thickness,
            is_filled,
        }
    }

    /// Style for a filled-capable convenience shape.
    ///
    /// Filling tints the color to [`FILL_ALPHA`] instead of relying on the
    /// flag alone.
    pub fn tinted(color: Rgba, thickness: f64, is_filled: bool) -> Self {
        let color = if is_filled {
            color.with_alpha(FILL_ALPHA)
        } else {
            color
        };
        Self::new(color, thickness, is_filled)
    }

    /// Half the stroke thickness, the distance a stroke reaches past its geometry.
    pub fn half_thickness(&self) -> f64 {
        self.thickness / 2.0
    }
}

impl Default for DrawableStyle {
    fn default() -> Self {
        Self::new(Rgba::black(), 2.0, false)
    }
}

/// Transient interaction flags. Never persisted.
///
/// Cloning yields cleared flags: a copy is never mid-interaction.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DrawableFlags {
    pub preview: bool,
    pub selected: bool,
    pub hovered: bool,
}

impl Clone for DrawableFlags {
    fn clone(&self) -> Self {
        Self::default()
    }
}

/// Attributes every drawable carries besides its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableBase {
    id: DrawableId,
    pub style: DrawableStyle,
    pub flags: DrawableFlags,
}

impl DrawableBase {
    /// Fresh base with a newly assigned identifier.
    pub fn new(style: DrawableStyle) -> Self {
        Self::with_id(Uuid::new_v4(), style)
    }

    /// Base for a drawable restored from storage or the network.
    pub(crate) fn with_id(id: DrawableId, style: DrawableStyle) -> Self {
        Self {
            id,
            style,
            flags: DrawableFlags::default(),
        }
    }

    pub fn id(&self) -> DrawableId {
        self.id
    }
}

/// Variant discriminant, also the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DrawableType {
    Path = 0,
    Rectangle = 1,
    Circle = 2,
    StraightLine = 3,
    Arrow = 4,
    Text = 5,
    Image = 6,
    Triangle = 7,
    Cone = 8,
    Dash = 9,
    Donut = 10,
}

impl DrawableType {
    pub const ALL: [DrawableType; 11] = [
        DrawableType::Path,
        DrawableType::Rectangle,
        DrawableType::Circle,
        DrawableType::StraightLine,
        DrawableType::Arrow,
        DrawableType::Text,
        DrawableType::Image,
        DrawableType::Triangle,
        DrawableType::Cone,
        DrawableType::Dash,
        DrawableType::Donut,
    ];

    pub fn from_u8(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Name used in property bags.
    pub fn name(self) -> &'static str {
        match self {
            DrawableType::Path => "path",
            DrawableType::Rectangle => "rectangle",
            DrawableType::Circle => "circle",
            DrawableType::StraightLine => "straight_line",
            DrawableType::Arrow => "arrow",
            DrawableType::Text => "text",
            DrawableType::Image => "image",
            DrawableType::Triangle => "triangle",
            DrawableType::Cone => "cone",
            DrawableType::Dash => "dash",
            DrawableType::Donut => "donut",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

/// Capabilities of a single drawable variant.
pub trait DrawableTrait {
    fn base(&self) -> &DrawableBase;

    fn base_mut(&mut self) -> &mut DrawableBase;

    /// Axis-aligned bounding box in page coordinates.
    fn bounding_box(&self) -> Rect;

    /// Whether `point` hits the shape, with `threshold` extra tolerance.
    fn is_hit(&self, point: Point, threshold: f64) -> bool;

    /// Shift every positional field. Rotation and size are untouched.
    fn translate(&mut self, delta: Vec2);

    /// Grow the shape toward the pointer during interactive drawing.
    fn update_preview(&mut self, point: Point);

    fn id(&self) -> DrawableId {
        self.base().id()
    }

    fn style(&self) -> &DrawableStyle {
        &self.base().style
    }

    fn style_mut(&mut self) -> &mut DrawableStyle {
        &mut self.base_mut().style
    }
}

/// A persisted object on a page.
///
/// `Donut` shares the circle's geometry but keeps its own tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Path(Path),
    Dash(Dash),
    StraightLine(StraightLine),
    Arrow(Arrow),
    Rectangle(Rectangle),
    Circle(Circle),
    Donut(Circle),
    Cone(Cone),
    Triangle(Triangle),
    Text(Text),
    Image(Image),
}

impl Drawable {
    fn as_trait(&self) -> &dyn DrawableTrait {
        match self {
            Drawable::Path(s) => s,
            Drawable::Dash(s) => s,
            Drawable::StraightLine(s) => s,
            Drawable::Arrow(s) => s,
            Drawable::Rectangle(s) => s,
            Drawable::Circle(s) => s,
            Drawable::Donut(s) => s,
            Drawable::Cone(s) => s,
            Drawable::Triangle(s) => s,
            Drawable::Text(s) => s,
            Drawable::Image(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn DrawableTrait {
        match self {
            Drawable::Path(s) => s,
            Drawable::Dash(s) => s,
            Drawable::StraightLine(s) => s,
            Drawable::Arrow(s) => s,
            Drawable::Rectangle(s) => s,
            Drawable::Circle(s) => s,
            Drawable::Donut(s) => s,
            Drawable::Cone(s) => s,
            Drawable::Triangle(s) => s,
            Drawable::Text(s) => s,
            Drawable::Image(s) => s,
        }
    }

    pub fn drawable_type(&self) -> DrawableType {
        match self {
            Drawable::Path(_) => DrawableType::Path,
            Drawable::Dash(_) => DrawableType::Dash,
            Drawable::StraightLine(_) => DrawableType::StraightLine,
            Drawable::Arrow(_) => DrawableType::Arrow,
            Drawable::Rectangle(_) => DrawableType::Rectangle,
            Drawable::Circle(_) => DrawableType::Circle,
            Drawable::Donut(_) => DrawableType::Donut,
            Drawable::Cone(_) => DrawableType::Cone,
            Drawable::Triangle(_) => DrawableType::Triangle,
            Drawable::Text(_) => DrawableType::Text,
            Drawable::Image(_) => DrawableType::Image,
        }
    }

    pub fn id(&self) -> DrawableId {
        self.as_trait().id()
    }

    pub fn base(&self) -> &DrawableBase {
        self.as_trait().base()
    }

    pub fn base_mut(&mut self) -> &mut DrawableBase {
        self.as_trait_mut().base_mut()
    }

    pub fn style(&self) -> &DrawableStyle {
        self.as_trait().style()
    }

    pub fn style_mut(&mut self) -> &mut DrawableStyle {
        self.as_trait_mut().style_mut()
    }

    pub fn flags(&self) -> &DrawableFlags {
        &self.base().flags
    }

    pub fn flags_mut(&mut self) -> &mut DrawableFlags {
        &mut self.base_mut().flags
    }

    pub fn bounding_box(&self) -> Rect {
        self.as_trait().bounding_box()
    }

    pub fn is_hit(&self, point: Point, threshold: f64) -> bool {
        self.as_trait().is_hit(point, threshold)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    pub fn update_preview(&mut self, point: Point) {
        self.as_trait_mut().update_preview(point);
    }

    /// Minimum-size gate for finalizing an interactively drawn shape.
    ///
    /// Shapes that fail it are discarded rather than added to the page.
    pub fn is_valid(&self) -> bool {
        match self {
            Drawable::Path(p) => p.points.len() >= 2,
            Drawable::Dash(d) => d.points.len() >= 2,
            Drawable::Circle(c) | Drawable::Donut(c) => c.radius >= Circle::MIN_RADIUS,
            Drawable::Rectangle(r) => {
                let extent = r.end_point - r.start_point;
                extent.x.abs() >= Rectangle::MIN_EXTENT && extent.y.abs() >= Rectangle::MIN_EXTENT
            }
            _ => true,
        }
    }

    /// Rotation in degrees (0 for variants without one).
    pub fn rotation(&self) -> f64 {
        match self {
            Drawable::Arrow(a) => a.rotation,
            Drawable::Rectangle(r) => r.rotation,
            Drawable::Cone(c) => c.rotation,
            Drawable::Image(i) => i.rotation,
            _ => 0.0,
        }
    }

    /// Set the rotation in degrees. Ignored by variants without one.
    pub fn set_rotation(&mut self, degrees: f64) {
        match self {
            Drawable::Arrow(a) => a.rotation = degrees,
            Drawable::Rectangle(r) => r.rotation = degrees,
            Drawable::Cone(c) => c.rotation = degrees,
            Drawable::Image(i) => i.rotation = degrees,
            _ => {}
        }
    }

    pub fn supports_rotation(&self) -> bool {
        matches!(
            self,
            Drawable::Arrow(_) | Drawable::Rectangle(_) | Drawable::Cone(_) | Drawable::Image(_)
        )
    }
}

impl From<Path> for Drawable {
    fn from(value: Path) -> Self {
        Drawable::Path(value)
    }
}

impl From<Dash> for Drawable {
    fn from(value: Dash) -> Self {
        Drawable::Dash(value)
    }
}

impl From<StraightLine> for Drawable {
    fn from(value: StraightLine) -> Self {
        Drawable::StraightLine(value)
    }
}

impl From<Arrow> for Drawable {
    fn from(value: Arrow) -> Self {
        Drawable::Arrow(value)
    }
}

impl From<Rectangle> for Drawable {
    fn from(value: Rectangle) -> Self {
        Drawable::Rectangle(value)
    }
}

impl From<Circle> for Drawable {
    fn from(value: Circle) -> Self {
        Drawable::Circle(value)
    }
}

impl From<Cone> for Drawable {
    fn from(value: Cone) -> Self {
        Drawable::Cone(value)
    }
}

impl From<Triangle> for Drawable {
    fn from(value: Triangle) -> Self {
        Drawable::Triangle(value)
    }
}

impl From<Text> for Drawable {
    fn from(value: Text) -> Self {
        Drawable::Text(value)
    }
}

impl From<Image> for Drawable {
    fn from(value: Image) -> Self {
        Drawable::Image(value)
    }
}
