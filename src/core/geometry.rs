//! Geometry kernel: segment intersection, closest-point queries, projection.
//!
//! Pure, total functions over finite floats. Degenerate (zero-length)
//! segments are treated as points and never divide by zero.

use super::point::{CampusPoint, CampusVector};

/// A line segment in campus coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: CampusPoint,
    pub end: CampusPoint,
}

impl Segment {
    /// Create a new segment
    #[inline]
    pub fn new(start: CampusPoint, end: CampusPoint) -> Self {
        Self { start, end }
    }

    /// Direction vector (not normalized)
    #[inline]
    pub fn direction(&self) -> CampusVector {
        self.end - self.start
    }

    /// Segment length
    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// Heading of the segment direction (radians)
    #[inline]
    pub fn heading(&self) -> f32 {
        self.direction().heading()
    }

    /// Midpoint of the segment
    #[inline]
    pub fn midpoint(&self) -> CampusPoint {
        self.start.lerp(&self.end, 0.5)
    }
}

/// Intersection point of two segments, if they cross.
///
/// Parametric test: returns `None` when the segments are parallel (within
/// floating precision) or when the intersection lies outside either
/// segment's [0, 1] parameter range.
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<CampusPoint> {
    let d1 = a.direction();
    let d2 = b.direction();

    let denom = d1.cross(&d2);
    if denom.abs() < f32::EPSILON {
        return None; // Parallel or degenerate
    }

    let offset = b.start - a.start;
    let t = offset.cross(&d2) / denom;
    let u = offset.cross(&d1) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a.start + d1 * t)
    } else {
        None
    }
}

/// Closest point on a segment to `point`.
///
/// Zero-length segments resolve to their start point.
pub fn closest_point_on_segment(point: &CampusPoint, segment: &Segment) -> CampusPoint {
    let dir = segment.direction();
    let len_sq = dir.length_squared();
    if len_sq < f32::EPSILON {
        return segment.start;
    }

    let t = (*point - segment.start).dot(&dir) / len_sq;
    let t = t.clamp(0.0, 1.0);
    segment.start + dir * t
}

/// Distance from a point to a segment.
#[inline]
pub fn point_segment_distance(point: &CampusPoint, segment: &Segment) -> f32 {
    point.distance(&closest_point_on_segment(point, segment))
}

/// Scalar projection of `v` onto the direction of `segment`.
///
/// Returns 0 for zero-length segments.
pub fn project_onto_segment(v: &CampusVector, segment: &Segment) -> f32 {
    let dir = segment.direction().normalized();
    v.dot(&dir)
}
