//! Circle shape, also backing the donut variant.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use kurbo::{Point, Rect, Vec2};

/// A circle given by center and radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub(crate) base: DrawableBase,
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    /// Smallest radius a drawn circle must reach to be kept.
    pub const MIN_RADIUS: f64 = 1.5;

    pub fn new(center: Point, radius: f64, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            center,
            radius,
        }
    }

    pub(crate) fn reconstruct(id: DrawableId, style: DrawableStyle, center: Point, radius: f64) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            center,
            radius,
        }
    }
}

impl DrawableTrait for Circle {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        let dist = (point - self.center).hypot();
        let reach = threshold + self.base.style.half_thickness();
        if self.base.style.is_filled {
            dist <= self.radius + reach
        } else {
            (dist - self.radius).abs() <= reach
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }

    fn update_preview(&mut self, point: Point) {
        self.radius = (point - self.center).hypot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rgba;

    fn ring() -> Circle {
        Circle::new(Point::ZERO, 10.0, DrawableStyle::new(Rgba::black(), 2.0, false))
    }

    #[test]
    fn test_outline_hit_boundary_is_inclusive() {
        let circle = ring();
        // r ± (threshold + t/2) = 10 ± 4
        assert!(circle.is_hit(Point::new(14.0, 0.0), 3.0));
        assert!(!circle.is_hit(Point::new(14.01, 0.0), 3.0));
        assert!(circle.is_hit(Point::new(0.0, 6.0), 3.0));
        assert!(!circle.is_hit(Point::new(0.0, 5.99), 3.0));
    }

    #[test]
    fn test_filled_hit_center() {
        let circle = Circle::new(Point::ZERO, 10.0, DrawableStyle::tinted(Rgba::black(), 2.0, true));
        assert!(circle.is_hit(Point::ZERO, 0.0));
        assert!(circle.is_hit(Point::new(11.0, 0.0), 0.0));
        assert!(!circle.is_hit(Point::new(11.5, 0.0), 0.0));
    }

    #[test]
    fn test_preview_sets_radius() {
        let mut circle = ring();
        circle.update_preview(Point::new(3.0, 4.0));
        assert!((circle.radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds() {
        let mut circle = ring();
        circle.translate(Vec2::new(5.0, 5.0));
        assert_eq!(circle.bounding_box(), Rect::new(-5.0, -5.0, 15.0, 15.0));
    }
}
