//! Line-of-sight path smoothing.
//!
//! Greedy shortcutting over the A* waypoints: from each kept waypoint,
//! jump to the furthest later waypoint the straight segment can reach.
//! Visibility is sampled against [`FloorGrid::clear_for_smoothing`], which
//! also rejects samples inside the wall buffer band, so smoothing never
//! trades the cost model's clearance away for a shorter polyline.

use log::trace;

use crate::config::SmoothingSettings;
use crate::core::CampusPoint;

use super::grid::FloorGrid;

/// Collapse collinear and mutually visible waypoints.
///
/// The first and last waypoints are always kept.
pub fn smooth_path(
    grid: &FloorGrid,
    waypoints: &[CampusPoint],
    settings: &SmoothingSettings,
) -> Vec<CampusPoint> {
    if waypoints.len() <= 2 {
        return waypoints.to_vec();
    }

    let mut smoothed = vec![waypoints[0]];
    let mut anchor = 0;

    while anchor < waypoints.len() - 1 {
        let mut furthest = anchor + 1;
        for candidate in (anchor + 2..waypoints.len()).rev() {
            if line_of_sight(grid, &waypoints[anchor], &waypoints[candidate], settings) {
                furthest = candidate;
                break;
            }
        }
        smoothed.push(waypoints[furthest]);
        anchor = furthest;
    }

    trace!(
        "[Smoothing] {} waypoints -> {}",
        waypoints.len(),
        smoothed.len()
    );
    smoothed
}

/// Sampled visibility between two campus points.
fn line_of_sight(
    grid: &FloorGrid,
    from: &CampusPoint,
    to: &CampusPoint,
    settings: &SmoothingSettings,
) -> bool {
    let distance = from.distance(to);
    let samples = ((distance / settings.sample_step).ceil() as usize).max(1);
    for i in 0..=samples {
        let t = i as f32 / samples as f32;
        let point = from.lerp(to, t);
        if !grid.clear_for_smoothing(&point) {
            return false;
        }
    }
    true
}
