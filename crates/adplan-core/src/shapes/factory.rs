//! Property-bag factory for drawables.
//!
//! A property bag is a flat JSON object. It is what the clipboard carries and
//! what restore paths hand back when they need a fresh `Drawable`. The factory
//! dispatches on the `type` key, builds the variant from its required
//! properties, then overlays every remaining saved property (id, end point,
//! radius, rotation, ...) onto the new instance.

use super::{
    Arrow, Circle, Cone, Dash, Drawable, DrawableBase, DrawableStyle, DrawableType, Image, Path,
    Rectangle, Rgba, StraightLine, Text, Triangle,
};
use kurbo::Point;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

/// Property bag keyed by property name.
pub type PropertyBag = Map<String, Value>;

// Common keys
const KEY_TYPE: &str = "type";
const KEY_ID: &str = "id";
const KEY_COLOR: &str = "color";
const KEY_THICKNESS: &str = "thickness";
const KEY_IS_FILLED: &str = "isFilled";

// Geometry keys
const KEY_POINTS: &str = "points";
const KEY_DASH_LENGTH: &str = "dashLength";
const KEY_GAP_LENGTH: &str = "gapLength";
const KEY_START_POINT: &str = "startPoint";
const KEY_END_POINT: &str = "endPoint";
const KEY_ROTATION: &str = "rotation";
const KEY_HEAD_LENGTH: &str = "headLength";
const KEY_HEAD_WIDTH: &str = "headWidth";
const KEY_CENTER: &str = "center";
const KEY_RADIUS: &str = "radius";
const KEY_APEX: &str = "apex";
const KEY_BASE_CENTER: &str = "baseCenter";
const KEY_VERTICES: &str = "vertices";
const KEY_POSITION: &str = "position";
const KEY_TEXT: &str = "text";
const KEY_FONT_SIZE: &str = "fontSize";
const KEY_WRAP_WIDTH: &str = "wrapWidth";
const KEY_DRAW_MODE: &str = "drawMode";
const KEY_PATH: &str = "path";
const KEY_WIDTH: &str = "width";
const KEY_HEIGHT: &str = "height";

/// Errors restoring a drawable from a property bag.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Property bag is not an object")]
    NotAnObject,
    #[error("Unknown drawable type: {0}")]
    UnknownType(String),
    #[error("Missing or invalid property: {0}")]
    Missing(&'static str),
    #[error("Invalid clipboard data: {0}")]
    Json(#[from] serde_json::Error),
}

type FactoryResult<T> = Result<T, FactoryError>;

fn point_value(p: Point) -> Value {
    json!({ "x": p.x, "y": p.y })
}

fn points_value(points: &[Point]) -> Value {
    Value::Array(points.iter().map(|p| point_value(*p)).collect())
}

fn get_f64(bag: &PropertyBag, key: &'static str) -> Option<f64> {
    bag.get(key)?.as_f64()
}

fn get_point_value(value: &Value) -> Option<Point> {
    Some(Point::new(value.get("x")?.as_f64()?, value.get("y")?.as_f64()?))
}

fn get_point(bag: &PropertyBag, key: &'static str) -> Option<Point> {
    get_point_value(bag.get(key)?)
}

fn get_points(bag: &PropertyBag, key: &'static str) -> Option<Vec<Point>> {
    bag.get(key)?.as_array()?.iter().map(get_point_value).collect()
}

fn require<T>(value: Option<T>, key: &'static str) -> FactoryResult<T> {
    value.ok_or(FactoryError::Missing(key))
}

fn style_from_bag(bag: &PropertyBag) -> DrawableStyle {
    let mut style = DrawableStyle::default();
    if let Some(color) = bag
        .get(KEY_COLOR)
        .and_then(|c| serde_json::from_value::<Rgba>(c.clone()).ok())
    {
        style.color = color;
    }
    if let Some(thickness) = get_f64(bag, KEY_THICKNESS) {
        style.thickness = thickness;
    }
    if let Some(filled) = bag.get(KEY_IS_FILLED).and_then(Value::as_bool) {
        style.is_filled = filled;
    }
    style
}

/// Flatten a drawable into a property bag.
pub fn to_property_bag(drawable: &Drawable) -> PropertyBag {
    let mut bag = PropertyBag::new();
    let style = drawable.style();
    bag.insert(KEY_TYPE.into(), drawable.drawable_type().name().into());
    bag.insert(KEY_ID.into(), drawable.id().to_string().into());
    bag.insert(KEY_COLOR.into(), json!(style.color));
    bag.insert(KEY_THICKNESS.into(), style.thickness.into());
    bag.insert(KEY_IS_FILLED.into(), style.is_filled.into());

    match drawable {
        Drawable::Path(p) => {
            bag.insert(KEY_POINTS.into(), points_value(&p.points));
        }
        Drawable::Dash(d) => {
            bag.insert(KEY_POINTS.into(), points_value(&d.points));
            bag.insert(KEY_DASH_LENGTH.into(), d.dash_length.into());
            bag.insert(KEY_GAP_LENGTH.into(), d.gap_length.into());
        }
        Drawable::StraightLine(l) => {
            bag.insert(KEY_START_POINT.into(), point_value(l.start_point));
            bag.insert(KEY_END_POINT.into(), point_value(l.end_point));
        }
        Drawable::Arrow(a) => {
            bag.insert(KEY_START_POINT.into(), point_value(a.start_point));
            bag.insert(KEY_END_POINT.into(), point_value(a.end_point));
            bag.insert(KEY_ROTATION.into(), a.rotation.into());
            bag.insert(KEY_HEAD_LENGTH.into(), a.head_length.into());
            bag.insert(KEY_HEAD_WIDTH.into(), a.head_width.into());
        }
        Drawable::Rectangle(r) => {
            bag.insert(KEY_START_POINT.into(), point_value(r.start_point));
            bag.insert(KEY_END_POINT.into(), point_value(r.end_point));
            bag.insert(KEY_ROTATION.into(), r.rotation.into());
        }
        Drawable::Circle(c) | Drawable::Donut(c) => {
            bag.insert(KEY_CENTER.into(), point_value(c.center));
            bag.insert(KEY_RADIUS.into(), c.radius.into());
        }
        Drawable::Cone(c) => {
            bag.insert(KEY_APEX.into(), point_value(c.apex));
            bag.insert(KEY_BASE_CENTER.into(), point_value(c.base_center));
            bag.insert(KEY_ROTATION.into(), c.rotation.into());
        }
        Drawable::Triangle(t) => {
            bag.insert(KEY_VERTICES.into(), points_value(&t.vertices));
        }
        Drawable::Text(t) => {
            bag.insert(KEY_POSITION.into(), point_value(t.position));
            bag.insert(KEY_TEXT.into(), t.text().into());
            bag.insert(KEY_FONT_SIZE.into(), t.font_size().into());
            bag.insert(KEY_WRAP_WIDTH.into(), t.wrap_width().into());
        }
        Drawable::Image(i) => {
            bag.insert(KEY_DRAW_MODE.into(), i.draw_mode.into());
            bag.insert(KEY_PATH.into(), i.path.clone().into());
            bag.insert(KEY_POSITION.into(), point_value(i.position));
            bag.insert(KEY_WIDTH.into(), i.width.into());
            bag.insert(KEY_HEIGHT.into(), i.height.into());
            bag.insert(KEY_ROTATION.into(), i.rotation.into());
        }
    }
    bag
}

/// Build the variant selected by the bag's type tag from its required
/// constructor properties.
fn construct(ty: DrawableType, bag: &PropertyBag, style: DrawableStyle) -> FactoryResult<Drawable> {
    let drawable = match ty {
        DrawableType::Path => Path::new(require(get_points(bag, KEY_POINTS), KEY_POINTS)?, style).into(),
        DrawableType::Dash => Dash::new(require(get_points(bag, KEY_POINTS), KEY_POINTS)?, style).into(),
        DrawableType::StraightLine => {
            let start = require(get_point(bag, KEY_START_POINT), KEY_START_POINT)?;
            StraightLine::new(start, start, style).into()
        }
        DrawableType::Arrow => {
            let start = require(get_point(bag, KEY_START_POINT), KEY_START_POINT)?;
            Arrow::new(start, start, style).into()
        }
        DrawableType::Rectangle => {
            let start = require(get_point(bag, KEY_START_POINT), KEY_START_POINT)?;
            Rectangle::new(start, start, style).into()
        }
        DrawableType::Circle | DrawableType::Donut => {
            let center = require(get_point(bag, KEY_CENTER), KEY_CENTER)?;
            let circle = Circle::new(center, 0.0, style);
            if ty == DrawableType::Donut {
                Drawable::Donut(circle)
            } else {
                Drawable::Circle(circle)
            }
        }
        DrawableType::Cone => {
            let apex = require(get_point(bag, KEY_APEX), KEY_APEX)?;
            Cone::new(apex, apex, style).into()
        }
        DrawableType::Triangle => {
            // Exactly three vertices; any other count is invalid.
            let vertices = get_points(bag, KEY_VERTICES)
                .and_then(|v| <[Point; 3]>::try_from(v).ok())
                .ok_or(FactoryError::Missing(KEY_VERTICES))?;
            Triangle::new(vertices, style).into()
        }
        DrawableType::Text => {
            let position = require(get_point(bag, KEY_POSITION), KEY_POSITION)?;
            let text = require(bag.get(KEY_TEXT).and_then(Value::as_str), KEY_TEXT)?;
            let font_size = get_f64(bag, KEY_FONT_SIZE).unwrap_or(Text::DEFAULT_FONT_SIZE);
            let wrap_width = get_f64(bag, KEY_WRAP_WIDTH).unwrap_or(0.0);
            Text::new(position, text, font_size, wrap_width, style).into()
        }
        DrawableType::Image => {
            let draw_mode = require(
                bag.get(KEY_DRAW_MODE)
                    .and_then(Value::as_u64)
                    .and_then(|m| u8::try_from(m).ok()),
                KEY_DRAW_MODE,
            )?;
            let path = require(bag.get(KEY_PATH).and_then(Value::as_str), KEY_PATH)?;
            let position = require(get_point(bag, KEY_POSITION), KEY_POSITION)?;
            let width = require(get_f64(bag, KEY_WIDTH), KEY_WIDTH)?;
            let height = require(get_f64(bag, KEY_HEIGHT), KEY_HEIGHT)?;
            Image::new(draw_mode, path, position, width, height, style).into()
        }
    };
    Ok(drawable)
}

/// Copy every saved property the constructor did not take onto `drawable`.
fn overlay(drawable: &mut Drawable, bag: &PropertyBag) {
    if let Some(id) = bag
        .get(KEY_ID)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
    {
        let style = drawable.style().clone();
        *drawable.base_mut() = DrawableBase::with_id(id, style);
    }

    let end_point = get_point(bag, KEY_END_POINT);
    let rotation = get_f64(bag, KEY_ROTATION);
    match drawable {
        Drawable::Dash(d) => {
            if let Some(v) = get_f64(bag, KEY_DASH_LENGTH) {
                d.dash_length = v;
            }
            if let Some(v) = get_f64(bag, KEY_GAP_LENGTH) {
                d.gap_length = v;
            }
        }
        Drawable::StraightLine(l) => {
            if let Some(p) = end_point {
                l.end_point = p;
            }
        }
        Drawable::Arrow(a) => {
            if let Some(p) = end_point {
                a.end_point = p;
            }
            if let Some(r) = rotation {
                a.rotation = r;
            }
            if let Some(v) = get_f64(bag, KEY_HEAD_LENGTH) {
                a.head_length = v;
            }
            if let Some(v) = get_f64(bag, KEY_HEAD_WIDTH) {
                a.head_width = v;
            }
        }
        Drawable::Rectangle(r) => {
            if let Some(p) = end_point {
                r.end_point = p;
            }
            if let Some(v) = rotation {
                r.rotation = v;
            }
        }
        Drawable::Circle(c) | Drawable::Donut(c) => {
            if let Some(r) = get_f64(bag, KEY_RADIUS) {
                c.radius = r;
            }
        }
        Drawable::Cone(c) => {
            if let Some(p) = get_point(bag, KEY_BASE_CENTER) {
                c.base_center = p;
            }
            if let Some(v) = rotation {
                c.rotation = v;
            }
        }
        Drawable::Image(i) => {
            if let Some(v) = rotation {
                i.rotation = v;
            }
        }
        Drawable::Path(_) | Drawable::Triangle(_) | Drawable::Text(_) => {}
    }
}

/// Reconstruct a drawable from a property bag.
pub fn from_property_bag(value: &Value) -> FactoryResult<Drawable> {
    let bag = value.as_object().ok_or(FactoryError::NotAnObject)?;
    let tag = require(bag.get(KEY_TYPE).and_then(Value::as_str), KEY_TYPE)?;
    let ty = DrawableType::from_name(tag).ok_or_else(|| FactoryError::UnknownType(tag.to_string()))?;

    let mut drawable = construct(ty, bag, style_from_bag(bag))?;
    overlay(&mut drawable, bag);
    Ok(drawable)
}

/// Serialize drawables for the clipboard.
pub fn copy_to_clipboard(drawables: &[Drawable]) -> String {
    let bags: Vec<Value> = drawables
        .iter()
        .map(|d| Value::Object(to_property_bag(d)))
        .collect();
    Value::Array(bags).to_string()
}

/// Restore drawables from clipboard text.
///
/// Entries that fail to restore are skipped and logged.
pub fn paste_from_clipboard(text: &str) -> FactoryResult<Vec<Drawable>> {
    let value: Value = serde_json::from_str(text)?;
    let entries = value.as_array().ok_or(FactoryError::NotAnObject)?;
    Ok(entries
        .iter()
        .filter_map(|entry| match from_property_bag(entry) {
            Ok(d) => Some(d),
            Err(e) => {
                log::warn!("Skipping clipboard entry: {}", e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Drawable> {
        let style = DrawableStyle::tinted(Rgba::new(0.2, 0.4, 0.6, 1.0), 3.0, true);
        let mut rect = Rectangle::new(Point::new(1.0, 2.0), Point::new(30.0, 40.0), style.clone());
        rect.rotation = 15.0;
        let mut cone = Cone::new(Point::new(5.0, 5.0), Point::new(25.0, 5.0), style.clone());
        cone.rotation = -30.0;
        let mut dash = Dash::new(vec![Point::ZERO, Point::new(9.0, 9.0)], style.clone());
        dash.gap_length = 2.5;
        vec![
            Path::new(vec![Point::ZERO, Point::new(3.0, 4.0)], style.clone()).into(),
            dash.into(),
            StraightLine::new(Point::ZERO, Point::new(7.0, 1.0), style.clone()).into(),
            Arrow::new(Point::ZERO, Point::new(0.0, 50.0), style.clone()).into(),
            rect.into(),
            Circle::new(Point::new(3.0, 3.0), 12.0, style.clone()).into(),
            Drawable::Donut(Circle::new(Point::new(4.0, 4.0), 6.0, style.clone())),
            cone.into(),
            Triangle::new(
                [Point::ZERO, Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
                style.clone(),
            )
            .into(),
            Text::new(Point::new(8.0, 8.0), "Exit", 14.0, 120.0, style.clone()).into(),
            Image::new(2, "icons/stairs.png", Point::new(1.0, 1.0), 32.0, 32.0, style).into(),
        ]
    }

    #[test]
    fn test_every_variant_restores_identically() {
        for original in samples() {
            let bag = Value::Object(to_property_bag(&original));
            let restored = from_property_bag(&bag).unwrap();
            assert_eq!(restored, original, "variant {:?}", original.drawable_type());
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let bag = json!({ "type": "hexagon" });
        assert!(matches!(from_property_bag(&bag), Err(FactoryError::UnknownType(_))));
    }

    #[test]
    fn test_missing_required_property() {
        let bag = json!({ "type": "circle", "radius": 4.0 });
        assert!(matches!(from_property_bag(&bag), Err(FactoryError::Missing("center"))));
    }

    #[test]
    fn test_triangle_needs_three_vertices() {
        let pt = |x: f64, y: f64| json!({ "x": x, "y": y });
        let too_few = json!([pt(0.0, 0.0), pt(4.0, 0.0)]);
        let too_many = json!([pt(0.0, 0.0), pt(4.0, 0.0), pt(0.0, 4.0), pt(4.0, 4.0)]);
        for vertices in [too_few, too_many] {
            let bag = json!({ "type": "triangle", "vertices": vertices });
            assert!(matches!(from_property_bag(&bag), Err(FactoryError::Missing("vertices"))));
        }

        let bag = json!({ "type": "triangle", "vertices": [pt(0.0, 0.0), pt(4.0, 0.0), pt(0.0, 4.0)] });
        let Drawable::Triangle(t) = from_property_bag(&bag).unwrap() else {
            panic!("expected triangle");
        };
        assert_eq!(t.vertices[2], Point::new(0.0, 4.0));
    }

    #[test]
    fn test_clipboard_roundtrip_skips_bad_entries() {
        let originals = samples();
        let text = copy_to_clipboard(&originals[..2]);
        let mut value: Value = serde_json::from_str(&text).unwrap();
        value.as_array_mut().unwrap().push(json!({ "type": "nope" }));

        let pasted = paste_from_clipboard(&value.to_string()).unwrap();
        assert_eq!(pasted.len(), 2);
        assert_eq!(pasted[0].id(), originals[0].id());
    }
}
