//! Binary layout of a single drawable.
//!
//! Every record starts with the common header
//! `[type u8][r g b a: f32][thickness f32][isFilled u8][id: 16 bytes]`
//! followed by the variant's own fields. Rotations travel as radians.

use super::buffer::{ByteBuffer, write_count};
use super::{CodecError, CodecResult, MAX_POINTS_PER_DRAWABLE};
use crate::shapes::{
    Arrow, Circle, Cone, Dash, Drawable, DrawableId, DrawableStyle, DrawableType, Image, Path,
    Rectangle, Rgba, StraightLine, Text, Triangle,
};
use kurbo::Point;

fn write_rotation(buf: &mut ByteBuffer, degrees: f64) {
    buf.write_f64_as_f32(degrees.to_radians());
}

fn read_rotation(buf: &mut ByteBuffer) -> CodecResult<f64> {
    Ok(buf.read_f32_as_f64()?.to_degrees())
}

fn write_points(buf: &mut ByteBuffer, points: &[Point]) -> CodecResult<()> {
    write_count(buf, "point", points.len(), MAX_POINTS_PER_DRAWABLE)?;
    for p in points {
        buf.write_point(*p);
    }
    Ok(())
}

fn read_points(buf: &mut ByteBuffer) -> CodecResult<Vec<Point>> {
    let count = buf.read_count("point", MAX_POINTS_PER_DRAWABLE)?;
    // Each point is 8 bytes; refuse counts the data cannot back before allocating.
    if count * 8 > buf.remaining() {
        return Err(CodecError::UnexpectedEof {
            needed: count * 8,
            remaining: buf.remaining(),
        });
    }
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push(buf.read_point()?);
    }
    Ok(points)
}

fn write_header(buf: &mut ByteBuffer, drawable: &Drawable) {
    let style = drawable.style();
    buf.write_u8(drawable.drawable_type() as u8);
    buf.write_f32(style.color.r);
    buf.write_f32(style.color.g);
    buf.write_f32(style.color.b);
    buf.write_f32(style.color.a);
    buf.write_f64_as_f32(style.thickness);
    buf.write_bool(style.is_filled);
    buf.write_id(drawable.id());
}

/// Append one drawable to `buf`.
pub fn write_drawable(buf: &mut ByteBuffer, drawable: &Drawable) -> CodecResult<()> {
    write_header(buf, drawable);
    match drawable {
        Drawable::Path(p) => write_points(buf, &p.points)?,
        Drawable::Dash(d) => {
            write_points(buf, &d.points)?;
            buf.write_f64_as_f32(d.dash_length);
            buf.write_f64_as_f32(d.gap_length);
        }
        Drawable::StraightLine(l) => {
            buf.write_point(l.start_point);
            buf.write_point(l.end_point);
        }
        Drawable::Arrow(a) => {
            buf.write_point(a.start_point);
            buf.write_point(a.end_point);
            write_rotation(buf, a.rotation);
            buf.write_f64_as_f32(a.head_length);
            buf.write_f64_as_f32(a.head_width);
        }
        Drawable::Rectangle(r) => {
            buf.write_point(r.start_point);
            buf.write_point(r.end_point);
            write_rotation(buf, r.rotation);
        }
        Drawable::Circle(c) | Drawable::Donut(c) => {
            buf.write_point(c.center);
            buf.write_f64_as_f32(c.radius);
        }
        Drawable::Cone(c) => {
            buf.write_point(c.apex);
            buf.write_point(c.base_center);
            write_rotation(buf, c.rotation);
        }
        Drawable::Triangle(t) => {
            for v in t.vertices {
                buf.write_point(v);
            }
        }
        Drawable::Text(t) => {
            buf.write_point(t.position);
            buf.write_string(t.text())?;
            buf.write_f64_as_f32(t.font_size());
            buf.write_f64_as_f32(t.wrap_width());
        }
        Drawable::Image(i) => {
            buf.write_u8(i.draw_mode);
            buf.write_string(&i.path)?;
            buf.write_point(i.position);
            buf.write_f64_as_f32(i.width);
            buf.write_f64_as_f32(i.height);
            write_rotation(buf, i.rotation);
        }
    }
    Ok(())
}

/// Read one drawable from the cursor of `buf`.
pub fn read_drawable(buf: &mut ByteBuffer) -> CodecResult<Drawable> {
    let tag = buf.read_u8()?;
    let kind = DrawableType::from_u8(tag).ok_or(CodecError::UnknownDrawableType(tag))?;
    let color = Rgba::new(buf.read_f32()?, buf.read_f32()?, buf.read_f32()?, buf.read_f32()?);
    let thickness = buf.read_f32_as_f64()?;
    let is_filled = buf.read_bool()?;
    let style = DrawableStyle::new(color, thickness, is_filled);
    let id: DrawableId = buf.read_id()?;

    let drawable = match kind {
        DrawableType::Path => Path::reconstruct(id, style, read_points(buf)?).into(),
        DrawableType::Dash => {
            let points = read_points(buf)?;
            let dash = buf.read_f32_as_f64()?;
            let gap = buf.read_f32_as_f64()?;
            Dash::reconstruct(id, style, points, dash, gap).into()
        }
        DrawableType::StraightLine => {
            let start = buf.read_point()?;
            let end = buf.read_point()?;
            StraightLine::reconstruct(id, style, start, end).into()
        }
        DrawableType::Arrow => {
            let start = buf.read_point()?;
            let end = buf.read_point()?;
            let rotation = read_rotation(buf)?;
            let head_length = buf.read_f32_as_f64()?;
            let head_width = buf.read_f32_as_f64()?;
            Arrow::reconstruct(id, style, start, end, rotation, head_length, head_width).into()
        }
        DrawableType::Rectangle => {
            let start = buf.read_point()?;
            let end = buf.read_point()?;
            let rotation = read_rotation(buf)?;
            Rectangle::reconstruct(id, style, start, end, rotation).into()
        }
        DrawableType::Circle | DrawableType::Donut => {
            let center = buf.read_point()?;
            let radius = buf.read_f32_as_f64()?;
            let circle = Circle::reconstruct(id, style, center, radius);
            if kind == DrawableType::Donut {
                Drawable::Donut(circle)
            } else {
                Drawable::Circle(circle)
            }
        }
        DrawableType::Cone => {
            let apex = buf.read_point()?;
            let base_center = buf.read_point()?;
            let rotation = read_rotation(buf)?;
            Cone::reconstruct(id, style, apex, base_center, rotation).into()
        }
        DrawableType::Triangle => {
            let vertices = [buf.read_point()?, buf.read_point()?, buf.read_point()?];
            Triangle::reconstruct(id, style, vertices).into()
        }
        DrawableType::Text => {
            let position = buf.read_point()?;
            let text = buf.read_string()?;
            let font_size = buf.read_f32_as_f64()?;
            let wrap_width = buf.read_f32_as_f64()?;
            Text::reconstruct(id, style, position, text, font_size, wrap_width).into()
        }
        DrawableType::Image => {
            let draw_mode = buf.read_u8()?;
            let path = buf.read_string()?;
            let position = buf.read_point()?;
            let width = buf.read_f32_as_f64()?;
            let height = buf.read_f32_as_f64()?;
            let rotation = read_rotation(buf)?;
            Image::reconstruct(id, style, draw_mode, path, position, width, height, rotation).into()
        }
    };
    Ok(drawable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(drawable: &Drawable) -> Drawable {
        let mut buf = ByteBuffer::new();
        write_drawable(&mut buf, drawable).unwrap();
        let decoded = read_drawable(&mut buf).unwrap();
        assert_eq!(buf.remaining(), 0);
        decoded
    }

    #[test]
    fn test_header_layout() {
        let line = StraightLine::new(Point::ZERO, Point::new(1.0, 1.0), DrawableStyle::default());
        let id = line.base.id();
        let mut buf = ByteBuffer::new();
        write_drawable(&mut buf, &line.into()).unwrap();
        let bytes = buf.as_bytes();
        assert_eq!(bytes[0], DrawableType::StraightLine as u8);
        assert_eq!(&bytes[1..5], &0.0f32.to_le_bytes());
        assert_eq!(&bytes[13..17], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[17..21], &2.0f32.to_le_bytes());
        assert_eq!(bytes[21], 0);
        assert_eq!(&bytes[22..38], &id.to_bytes_le());
        assert_eq!(bytes.len(), 38 + 16);
    }

    #[test]
    fn test_rotation_travels_as_radians() {
        let mut rect = Rectangle::new(Point::ZERO, Point::new(10.0, 10.0), DrawableStyle::default());
        rect.rotation = 180.0;
        let mut buf = ByteBuffer::new();
        write_drawable(&mut buf, &rect.clone().into()).unwrap();
        let tail = &buf.as_bytes()[buf.len() - 4..];
        let radians = f32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        assert!((radians - std::f32::consts::PI).abs() < 1e-6);

        let Drawable::Rectangle(decoded) = round_trip(&rect.into()) else {
            panic!("expected rectangle");
        };
        assert!((decoded.rotation - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_donut_keeps_its_tag() {
        let donut = Drawable::Donut(Circle::new(Point::new(5.0, 5.0), 8.0, DrawableStyle::default()));
        let decoded = round_trip(&donut);
        assert_eq!(decoded.drawable_type(), DrawableType::Donut);
        assert_eq!(decoded.id(), donut.id());
    }

    #[test]
    fn test_text_and_image_fields() {
        let text = Text::new(Point::new(1.0, 2.0), "Kitchen", 14.0, 120.0, DrawableStyle::default());
        let Drawable::Text(t) = round_trip(&text.into()) else {
            panic!("expected text");
        };
        assert_eq!(t.text(), "Kitchen");
        assert_eq!(t.font_size(), 14.0);
        assert_eq!(t.wrap_width(), 120.0);

        let image = Image::new(2, "icons/window.png", Point::new(4.0, 4.0), 32.0, 16.0, DrawableStyle::default());
        let Drawable::Image(i) = round_trip(&image.into()) else {
            panic!("expected image");
        };
        assert_eq!(i.draw_mode, 2);
        assert_eq!(i.path, "icons/window.png");
        assert_eq!((i.width, i.height), (32.0, 16.0));
    }

    #[test]
    fn test_every_variant_round_trips_exactly() {
        use crate::codec::{decode_drawables, encode_drawables};
        use crate::shapes::DrawableFlags;

        let outline = DrawableStyle::new(Rgba::new(0.25, 0.5, 0.75, 1.0), 3.5, false);
        let filled = DrawableStyle::tinted(Rgba::new(1.0, 0.125, 0.0, 1.0), 1.5, true);
        let p = Point::new;

        let mut dash = Dash::new(vec![p(0.0, 0.0), p(8.5, 2.25), p(16.0, -4.0)], outline);
        dash.dash_length = 12.5;
        dash.gap_length = 3.25;
        // Rotations stay zero so they survive the f32 radians conversion bit for bit.
        let drawables: Vec<Drawable> = vec![
            Path::new(vec![p(0.5, 1.5), p(10.25, -3.75), p(20.0, 8.0)], outline).into(),
            Rectangle::new(p(-4.0, 2.5), p(60.5, 30.0), filled).into(),
            Circle::new(p(12.0, 24.5), 7.75, filled).into(),
            StraightLine::new(p(1.0, 2.0), p(3.5, 40.0), outline).into(),
            Arrow::new(p(0.0, 5.0), p(32.0, 5.0), outline).into(),
            Text::new(p(4.0, 8.0), "Boiler room\nnorth wall", 14.0, 96.0, outline).into(),
            Image::new(3, "icons/door.png", p(-8.0, 16.5), 48.0, 24.5, outline).into(),
            Triangle::new([p(0.0, 0.0), p(30.0, 0.5), p(15.25, -20.0)], filled).into(),
            Cone::new(p(5.0, 5.0), p(45.5, 5.0), filled).into(),
            dash.into(),
            Drawable::Donut(Circle::new(p(-2.5, 3.0), 11.0, outline)),
        ];
        assert_eq!(drawables.len(), DrawableType::ALL.len());

        let mut sent = drawables.clone();
        for drawable in &mut sent {
            let flags = drawable.flags_mut();
            flags.preview = true;
            flags.selected = true;
            flags.hovered = true;
        }

        let decoded = decode_drawables(&encode_drawables(&sent).unwrap()).unwrap();
        assert_eq!(decoded.len(), drawables.len());
        for (decoded, expected) in decoded.iter().zip(&drawables) {
            assert_eq!(decoded, expected, "{:?} did not round trip", expected.drawable_type());
            assert_eq!(decoded.flags(), &DrawableFlags::default());
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut buf = ByteBuffer::from_bytes(vec![42u8; 64]);
        assert_eq!(read_drawable(&mut buf), Err(CodecError::UnknownDrawableType(42)));
    }

    #[test]
    fn test_point_count_over_cap_rejected() {
        let path = Path::new(vec![Point::ZERO, Point::new(3.0, 4.0)], DrawableStyle::default());
        let mut buf = ByteBuffer::new();
        write_drawable(&mut buf, &path.into()).unwrap();
        let mut bytes = buf.into_bytes();
        let over = (MAX_POINTS_PER_DRAWABLE as i32 + 1).to_le_bytes();
        bytes[38..42].copy_from_slice(&over);
        let mut buf = ByteBuffer::from_bytes(bytes);
        assert!(matches!(read_drawable(&mut buf), Err(CodecError::CountOutOfRange { .. })));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let circle = Circle::new(Point::new(5.0, 5.0), 8.0, DrawableStyle::default());
        let mut buf = ByteBuffer::new();
        write_drawable(&mut buf, &circle.into()).unwrap();
        let mut bytes = buf.into_bytes();
        bytes.truncate(bytes.len() - 2);
        let mut buf = ByteBuffer::from_bytes(bytes);
        assert!(matches!(read_drawable(&mut buf), Err(CodecError::UnexpectedEof { .. })));
    }
}
