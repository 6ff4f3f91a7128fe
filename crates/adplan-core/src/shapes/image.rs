//! Image/icon shape.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use crate::geometry::{bounding_rect, rotate_vec, rotated_quad_vertices};
use kurbo::{Point, Rect, Vec2};

/// A placed bitmap or icon. `draw_mode` identifies which icon the resource is.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub(crate) base: DrawableBase,
    pub draw_mode: u8,
    pub path: String,
    /// Top-left corner before rotation.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees about the center.
    pub rotation: f64,
}

impl Image {
    pub fn new(draw_mode: u8, path: impl Into<String>, position: Point, width: f64, height: f64, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            draw_mode,
            path: path.into(),
            position,
            width,
            height,
            rotation: 0.0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn reconstruct(
        id: DrawableId,
        style: DrawableStyle,
        draw_mode: u8,
        path: String,
        position: Point,
        width: f64,
        height: f64,
        rotation: f64,
    ) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            draw_mode,
            path,
            position,
            width,
            height,
            rotation,
        }
    }

    pub fn center(&self) -> Point {
        self.position + Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width.abs() / 2.0, self.height.abs() / 2.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        rotated_quad_vertices(self.center(), self.half_extents(), self.rotation.to_radians())
    }
}

impl DrawableTrait for Image {
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
        local.x.abs() <= half.x + threshold && local.y.abs() <= half.y + threshold
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    // Images are placed, not dragged out.
    fn update_preview(&mut self, _point: Point) {}
}
