//! Geometry kernel shared by every drawable variant.
//!
//! Pure functions over 2-D points. Drawables reduce their hit tests to these
//! after moving the query point into their own unrotated frame.

use kurbo::{Point, Rect, Vec2};

/// Distance from a point to a line segment (a→b).
///
/// The projection parameter is clamped to `[0, 1]`; a zero-length segment
/// degrades to plain point distance.
pub fn distance_point_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline.
///
/// A single point polyline measures against that point; an empty one is
/// infinitely far away.
pub fn distance_point_to_polyline(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| distance_point_to_segment(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Point-in-triangle by sign consistency of the three edge cross products.
///
/// Points on an edge (zero cross product) are inside.
pub fn point_in_triangle(point: Point, a: Point, b: Point, c: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(a, b, point);
    let d2 = cross(b, c, point);
    let d3 = cross(c, a, point);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Rotate a vector by `angle` radians: `x' = x·cosθ − y·sinθ, y' = x·sinθ + y·cosθ`.
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate `point` about `pivot` by `angle` radians.
pub fn rotate_about(point: Point, pivot: Point, angle: f64) -> Point {
    pivot + rotate_vec(point - pivot, angle)
}

/// Corners of an axis-aligned box of half extents `half_size`, rotated by
/// `angle` radians and placed at `center`.
///
/// Order: top-left, top-right, bottom-right, bottom-left (before rotation).
pub fn rotated_quad_vertices(center: Point, half_size: Vec2, angle: f64) -> [Point; 4] {
    let corners = [
        Vec2::new(-half_size.x, -half_size.y),
        Vec2::new(half_size.x, -half_size.y),
        Vec2::new(half_size.x, half_size.y),
        Vec2::new(-half_size.x, half_size.y),
    ];
    corners.map(|c| center + rotate_vec(c, angle))
}

/// True if the circle overlaps the triangle: its center is inside, or it lies
/// within `radius` of any edge (vertices included).
pub fn circle_triangle_intersect(center: Point, radius: f64, triangle: &[Point; 3]) -> bool {
    let [a, b, c] = *triangle;
    if point_in_triangle(center, a, b, c) {
        return true;
    }
    [(a, b), (b, c), (c, a)]
        .iter()
        .any(|&(p, q)| distance_point_to_segment(center, p, q) <= radius)
}

/// Minimum distance from a point to the outline of a closed polygon.
pub fn distance_point_to_outline(point: Point, vertices: &[Point]) -> f64 {
    let n = vertices.len();
    if n < 2 {
        return distance_point_to_polyline(point, vertices);
    }
    (0..n)
        .map(|i| distance_point_to_segment(point, vertices[i], vertices[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Axis-aligned bounding box of a point set (`Rect::ZERO` when empty).
pub fn bounding_rect(points: &[Point]) -> Rect {
    let Some((first, rest)) = points.split_first() else {
        return Rect::ZERO;
    };
    rest.iter()
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}
