//! Triangle shape.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use crate::geometry::{bounding_rect, circle_triangle_intersect, distance_point_to_outline};
use kurbo::{Point, Rect, Vec2};

/// A triangle with exactly three vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub(crate) base: DrawableBase,
    pub vertices: [Point; 3],
}

impl Triangle {
    pub fn new(vertices: [Point; 3], style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            vertices,
        }
    }

    /// Degenerate triangle anchored at `point`, ready to be dragged out.
    pub fn anchored(point: Point, style: DrawableStyle) -> Self {
        Self::new([point; 3], style)
    }

    pub(crate) fn reconstruct(id: DrawableId, style: DrawableStyle, vertices: [Point; 3]) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            vertices,
        }
    }
}

impl DrawableTrait for Triangle {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        bounding_rect(&self.vertices)
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        let reach = threshold + self.base.style.half_thickness();
        if self.base.style.is_filled {
            circle_triangle_intersect(point, reach, &self.vertices)
        } else {
            distance_point_to_outline(point, &self.vertices) <= reach
        }
    }

    fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }

    /// Right angle at the second vertex: it takes the cursor's x and the
    /// anchor's y, the third vertex follows the cursor.
    fn update_preview(&mut self, point: Point) {
        self.vertices[1] = Point::new(point.x, self.vertices[0].y);
        self.vertices[2] = point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rgba;

    #[test]
    fn test_preview_builds_right_triangle() {
        let mut t = Triangle::anchored(Point::new(10.0, 10.0), DrawableStyle::default());
        t.update_preview(Point::new(40.0, 50.0));
        assert_eq!(t.vertices[0], Point::new(10.0, 10.0));
        assert_eq!(t.vertices[1], Point::new(40.0, 10.0));
        assert_eq!(t.vertices[2], Point::new(40.0, 50.0));
        assert_eq!(t.bounding_box(), Rect::new(10.0, 10.0, 40.0, 50.0));
    }

    #[test]
    fn test_hit_filled_vs_outline() {
        let verts = [Point::new(0.0, 0.0), Point::new(30.0, 0.0), Point::new(30.0, 30.0)];
        let filled = Triangle::new(verts, DrawableStyle::tinted(Rgba::black(), 2.0, true));
        let outline = Triangle::new(verts, DrawableStyle::tinted(Rgba::black(), 2.0, false));

        let inside = Point::new(20.0, 10.0);
        assert!(filled.is_hit(inside, 0.0));
        assert!(!outline.is_hit(inside, 0.0));
        assert!(outline.is_hit(Point::new(15.0, -2.0), 1.0));
        assert!(!outline.is_hit(Point::new(15.0, -2.5), 1.0));
    }
}
