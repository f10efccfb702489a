//! Fundamental types: campus points, grid coordinates, angles, geometry.

pub mod geometry;
pub mod math;
pub mod point;

pub use geometry::{
    closest_point_on_segment, point_segment_distance, project_onto_segment, segment_intersection,
    Segment,
};
pub use math::{angle_diff, deg_to_rad, lerp, normalize_angle, rad_to_deg, TWO_PI};
pub use point::{CampusPoint, CampusVector, GridCoord};
