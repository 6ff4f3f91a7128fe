//! Freehand paths and dashed paths.

use super::{DrawableBase, DrawableId, DrawableStyle, DrawableTrait};
use crate::geometry::{bounding_rect, distance_point_to_polyline};
use kurbo::{Point, Rect, Vec2};

/// Append `point` unless it is within `min_dist_sq` of the last point while
/// previewing, in which case the last point follows the pointer instead.
fn push_decimated(points: &mut Vec<Point>, point: Point, min_dist_sq: f64, preview: bool) {
    match points.last_mut() {
        Some(last) if preview && (point - *last).hypot2() <= min_dist_sq => *last = point,
        _ => points.push(point),
    }
}

fn polyline_hit(points: &[Point], style: &DrawableStyle, point: Point, threshold: f64) -> bool {
    distance_point_to_polyline(point, points) <= threshold + style.half_thickness()
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub(crate) base: DrawableBase,
    pub points: Vec<Point>,
}

impl Path {
    /// Squared distance a new pointer sample must travel before it is recorded.
    pub const MIN_POINT_DIST_SQ: f64 = 0.01 * 0.01;

    pub fn new(points: Vec<Point>, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            points,
        }
    }

    pub(crate) fn reconstruct(id: DrawableId, style: DrawableStyle, points: Vec<Point>) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            points,
        }
    }
}

impl DrawableTrait for Path {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        bounding_rect(&self.points)
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        polyline_hit(&self.points, &self.base.style, point, threshold)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn update_preview(&mut self, point: Point) {
        let preview = self.base.flags.preview;
        push_decimated(&mut self.points, point, Self::MIN_POINT_DIST_SQ, preview);
    }
}

/// A dashed stroke along a point sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Dash {
    pub(crate) base: DrawableBase,
    pub points: Vec<Point>,
    pub dash_length: f64,
    pub gap_length: f64,
}

impl Dash {
    pub const MIN_POINT_DIST_SQ: f64 = 4.0 * 4.0;
    pub const DEFAULT_DASH_LENGTH: f64 = 10.0;
    pub const DEFAULT_GAP_LENGTH: f64 = 6.0;

    pub fn new(points: Vec<Point>, style: DrawableStyle) -> Self {
        Self {
            base: DrawableBase::new(style),
            points,
            dash_length: Self::DEFAULT_DASH_LENGTH,
            gap_length: Self::DEFAULT_GAP_LENGTH,
        }
    }

    pub(crate) fn reconstruct(
        id: DrawableId,
        style: DrawableStyle,
        points: Vec<Point>,
        dash_length: f64,
        gap_length: f64,
    ) -> Self {
        Self {
            base: DrawableBase::with_id(id, style),
            points,
            dash_length,
            gap_length,
        }
    }

    /// Visible dash segments along the path, for renderers without native dashing.
    pub fn dash_segments(&self) -> Vec<(Point, Point)> {
        let period = self.dash_length + self.gap_length;
        if self.dash_length <= 0.0 || period <= 0.0 {
            return self.points.windows(2).map(|w| (w[0], w[1])).collect();
        }

        let mut segments = Vec::new();
        // Distance travelled into the current dash/gap period.
        let mut phase = 0.0;
        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            let len = (b - a).hypot();
            if len < f64::EPSILON {
                continue;
            }
            let dir = (b - a) / len;
            let mut t = 0.0;
            while t < len {
                let step = if phase < self.dash_length {
                    (self.dash_length - phase).min(len - t)
                } else {
                    (period - phase).min(len - t)
                };
                if phase < self.dash_length {
                    segments.push((a + dir * t, a + dir * (t + step)));
                }
                t += step;
                phase = (phase + step) % period;
            }
        }
        segments
    }
}

impl DrawableTrait for Dash {
    fn base(&self) -> &DrawableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DrawableBase {
        &mut self.base
    }

    fn bounding_box(&self) -> Rect {
        bounding_rect(&self.points)
    }

    fn is_hit(&self, point: Point, threshold: f64) -> bool {
        polyline_hit(&self.points, &self.base.style, point, threshold)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn update_preview(&mut self, point: Point) {
        let preview = self.base.flags.preview;
        push_decimated(&mut self.points, point, Self::MIN_POINT_DIST_SQ, preview);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_path_hit_includes_half_thickness() {
        let path = Path::new(
            line(&[(0.0, 0.0), (100.0, 0.0)]),
            DrawableStyle::default(),
        );
        assert!(path.is_hit(Point::new(50.0, 6.0), 5.0));
        assert!(!path.is_hit(Point::new(50.0, 6.5), 5.0));
    }

    #[test]
    fn test_path_bounds() {
        let path = Path::new(
            line(&[(0.0, 0.0), (100.0, 50.0), (50.0, 100.0)]),
            DrawableStyle::default(),
        );
        assert_eq!(path.bounding_box(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_path_preview_decimates() {
        let mut path = Path::new(line(&[(0.0, 0.0)]), DrawableStyle::default());
        path.base.flags.preview = true;

        path.update_preview(Point::new(0.005, 0.0));
        assert_eq!(path.points.len(), 1);
        assert_eq!(path.points[0], Point::new(0.005, 0.0));

        path.update_preview(Point::new(1.0, 0.0));
        assert_eq!(path.points.len(), 2);
    }

    #[test]
    fn test_dash_preview_uses_coarser_spacing() {
        let mut dash = Dash::new(line(&[(0.0, 0.0)]), DrawableStyle::default());
        dash.base.flags.preview = true;

        dash.update_preview(Point::new(3.0, 0.0));
        assert_eq!(dash.points.len(), 1);
        dash.update_preview(Point::new(8.0, 0.0));
        assert_eq!(dash.points.len(), 2);
    }

    #[test]
    fn test_translate_keeps_shape() {
        let mut dash = Dash::new(line(&[(0.0, 0.0), (10.0, 0.0)]), DrawableStyle::default());
        dash.translate(Vec2::new(5.0, -5.0));
        assert_eq!(dash.points, line(&[(5.0, -5.0), (15.0, -5.0)]));
        assert_eq!(dash.dash_length, Dash::DEFAULT_DASH_LENGTH);
    }

    #[test]
    fn test_dash_segments() {
        let mut dash = Dash::new(line(&[(0.0, 0.0), (30.0, 0.0)]), DrawableStyle::default());
        dash.dash_length = 10.0;
        dash.gap_length = 5.0;
        let segments = dash.dash_segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], (Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
        assert_eq!(segments[1], (Point::new(15.0, 0.0), Point::new(25.0, 0.0)));
    }
}
