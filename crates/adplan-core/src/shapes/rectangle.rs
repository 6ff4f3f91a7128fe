//! Rectangle shape.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use crate::geometry::{bounding_rect, rotate_vec, rotated_quad_vertices};
use kurbo::{Point, Rect, Vec2};

/// A rectangle spanned by two corners, rotated about its center.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub(crate) base: DrawableBase,
    pub start_point: Point,
    pub end_point: Point,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Rectangle {
    /// Smallest extent, per axis, a drawn rectangle must reach to be kept.
    pub const MIN_EXTENT: f64 = 2.0;

    pub fn new(start_point: Point, end_point: Point, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            start_point,
            end_point,
            rotation: 0.0,
        }
    }

    pub(crate) fn reconstruct(
        id: DrawableId,
        style: DrawableStyle,
        start_point: Point,
        end_point: Point,
        rotation: f64,
    ) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            start_point,
            end_point,
            rotation,
        }
    }

    pub fn center(&self) -> Point {
        self.start_point.midpoint(self.end_point)
    }

    /// Half width and half height.
    pub fn half_extents(&self) -> Vec2 {
        let d = self.end_point - self.start_point;
        Vec2::new(d.x.abs() / 2.0, d.y.abs() / 2.0)
    }

    /// Corners after rotation.
    pub fn corners(&self) -> [Point; 4] {
        rotated_quad_vertices(self.center(), self.half_extents(), self.rotation.to_radians())
    }
}

impl DrawableTrait for Rectangle {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        bounding_rect(&self.corners())
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        let local = rotate_vec(point - self.center(), -self.rotation.to_radians());
        let half = self.half_extents();
        let reach = threshold + self.base.style.half_thickness();

        let inside_outer = local.x.abs() <= half.x + reach && local.y.abs() <= half.y + reach;
        if !inside_outer {
            return false;
        }
        if self.base.style.is_filled {
            return true;
        }
        // Outline only: reject the interior well away from the border.
        let inside_inner = local.x.abs() < half.x - reach && local.y.abs() < half.y - reach;
        !inside_inner
    }

    fn translate(&mut self, delta: Vec2) {
        self.start_point += delta;
        self.end_point += delta;
    }

    fn update_preview(&mut self, point: Point) {
        self.end_point = point;
    }
}
