//! Cone (view-cone) shape.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use crate::geometry::{bounding_rect, circle_triangle_intersect, distance_point_to_outline, rotate_about};
use kurbo::{Point, Rect, Vec2};

/// An isosceles triangle opening from `apex` toward `base_center`, rotated
/// about the apex.
#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    pub(crate) base: DrawableBase,
    pub apex: Point,
    pub base_center: Point,
    /// Rotation in degrees about the apex.
    pub rotation: f64,
}

impl Cone {
    /// Base half-width as a fraction of the apex→base distance.
    pub const SPREAD: f64 = 0.5;

    pub fn new(apex: Point, base_center: Point, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            apex,
            base_center,
            rotation: 0.0,
        }
    }

    pub(crate) fn reconstruct(
        id: DrawableId,
        style: DrawableStyle,
        apex: Point,
        base_center: Point,
        rotation: f64,
    ) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            apex,
            base_center,
            rotation,
        }
    }

    /// Apex followed by the two base corners, rotation applied.
    pub fn vertices(&self) -> [Point; 3] {
        let axis = self.base_center - self.apex;
        let perp = Vec2::new(-axis.y, axis.x) * Self::SPREAD;
        let angle = self.rotation.to_radians();
        [
            self.apex,
            rotate_about(self.base_center + perp, self.apex, angle),
            rotate_about(self.base_center - perp, self.apex, angle),
        ]
    }
}

impl DrawableTrait for Cone {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        bounding_rect(&self.vertices())
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        let reach = threshold + self.base.style.half_thickness();
        let vertices = self.vertices();
        if self.base.style.is_filled {
            circle_triangle_intersect(point, reach, &vertices)
        } else {
            distance_point_to_outline(point, &vertices) <= reach
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.apex += delta;
        self.base_center += delta;
    }

    fn update_preview(&mut self, point: Point) {
        self.base_center = point;
    }
}
