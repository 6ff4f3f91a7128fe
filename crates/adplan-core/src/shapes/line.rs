//! Straight lines and arrows.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use crate::geometry::{bounding_rect, circle_triangle_intersect, distance_point_to_segment, rotate_vec};
use kurbo::{Point, Rect, Vec2};

/// A single straight segment.
#[derive(Debug, Clone, PartialEq)]
pub struct StraightLine {
    pub(crate) base: DrawableBase,
    pub start_point: Point,
    pub end_point: Point,
}

impl StraightLine {
    pub fn new(start_point: Point, end_point: Point, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            start_point,
            end_point,
        }
    }

    pub(crate) fn reconstruct(id: DrawableId, style: DrawableStyle, start_point: Point, end_point: Point) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            start_point,
            end_point,
        }
    }

    pub fn length(&self) -> f64 {
        (self.end_point - self.start_point).hypot()
    }
}

impl DrawableTrait for StraightLine {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        Rect::from_points(self.start_point, self.end_point)
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        distance_point_to_segment(point, self.start_point, self.end_point)
            <= threshold + self.base.style.half_thickness()
    }

    fn translate(&mut self, delta: Vec2) {
        self.start_point += delta;
        self.end_point += delta;
    }

    fn update_preview(&mut self, point: Point) {
        self.end_point = point;
    }
}

/// A line with an arrowhead at its end point.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub(crate) base: DrawableBase,
    pub start_point: Point,
    pub end_point: Point,
    /// Shaft heading in degrees.
    pub rotation: f64,
    pub head_length: f64,
    pub head_width: f64,
}

impl Arrow {
    pub const DEFAULT_HEAD_LENGTH: f64 = 15.0;
    pub const DEFAULT_HEAD_WIDTH: f64 = 10.0;

    pub fn new(start_point: Point, end_point: Point, style: DrawableStyle) -> Self {
        let mut arrow = Self {
            base: DrawableBase::new(style),
            start_point,
            end_point,
            rotation: 0.0,
            head_length: Self::DEFAULT_HEAD_LENGTH,
            head_width: Self::DEFAULT_HEAD_WIDTH,
        };
        arrow.align_rotation();
        arrow
    }

    pub(crate) fn reconstruct(
        id: DrawableId,
        style: DrawableStyle,
        start_point: Point,
        end_point: Point,
        rotation: f64,
        head_length: f64,
        head_width: f64,
    ) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            start_point,
            end_point,
            rotation,
            head_length,
            head_width,
        }
    }

    /// Point the heading along start→end. A zero-length shaft keeps the old heading.
    fn align_rotation(&mut self) {
        let shaft = self.end_point - self.start_point;
        if shaft.hypot2() > f64::EPSILON {
            self.rotation = shaft.atan2().to_degrees();
        }
    }

    /// Arrowhead triangle: tip, then the two base corners.
    pub fn head_vertices(&self) -> [Point; 3] {
        let dir = rotate_vec(Vec2::new(1.0, 0.0), self.rotation.to_radians());
        let perp = Vec2::new(-dir.y, dir.x);
        let back = self.end_point - dir * self.head_length;
        let half = self.head_width / 2.0;
        [self.end_point, back + perp * half, back - perp * half]
    }
}

impl DrawableTrait for Arrow {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        let [tip, left, right] = self.head_vertices();
        bounding_rect(&[self.start_point, tip, left, right])
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        let reach = threshold + self.base.style.half_thickness();
        distance_point_to_segment(point, self.start_point, self.end_point) <= reach
            || circle_triangle_intersect(point, reach, &self.head_vertices())
    }

    fn translate(&mut self, delta: Vec2) {
        self.start_point += delta;
        self.end_point += delta;
    }

    fn update_preview(&mut self, point: Point) {
        self.end_point = point;
        self.align_rotation();
    }
}
