//! Default values for configuration fields.
//!
//! Kept as free functions so serde `#[serde(default = "...")]` attributes
//! and the `Default` impls share one source of truth.

// --- Correction pipeline ---

pub fn buffer_size() -> usize {
    5
}
pub fn entrance_snap_radius() -> f32 {
    3.0
}
pub fn entrance_heading_tolerance() -> f32 {
    1.05 // ~60 degrees
}
pub fn turn_detection_threshold() -> f32 {
    0.52 // ~30 degrees
}
pub fn wall_epsilon() -> f32 {
    0.15
}
pub fn wall_search_radius() -> f32 {
    5.0
}
pub fn max_wall_iterations() -> usize {
    3
}
pub fn heading_correction_factor() -> f32 {
    0.1
}
pub fn retroactive_smooth_steps() -> usize {
    5
}
pub fn max_stride_adjustment() -> f32 {
    0.2
}
pub fn stride_smoothing_alpha() -> f32 {
    0.1
}

// --- Stairwell detection ---

pub fn stair_proximity_radius() -> f32 {
    2.0
}
pub fn stair_expanded_radius() -> f32 {
    4.0
}
pub fn stair_fov_half_angle() -> f32 {
    0.79 // ~45 degrees
}
pub fn heading_lag_steps() -> usize {
    2
}
pub fn candidate_hold_steps() -> usize {
    8
}
pub fn label_window_size() -> usize {
    6
}
pub fn label_matches_required() -> usize {
    3
}
pub fn confidence_threshold() -> f32 {
    0.65
}
pub fn sustained_run_threshold() -> usize {
    4
}

// --- Stairwell animation ---

pub fn stair_step_unit_length() -> f32 {
    0.3
}
pub fn min_transition_steps() -> usize {
    8
}
pub fn max_transition_steps() -> usize {
    40
}
pub fn min_arrival_progress() -> f32 {
    0.5
}
pub fn walking_run_for_arrival() -> usize {
    2
}
pub fn landing_turn_threshold() -> f32 {
    1.2 // ~70 degrees off the climb heading average
}
pub fn heading_window_size() -> usize {
    5
}
pub fn opposite_run_for_cancel() -> usize {
    3
}
pub fn min_steps_before_cancel() -> usize {
    4
}
pub fn replay_clamp_min() -> usize {
    1
}
pub fn replay_clamp_max() -> usize {
    4
}

// --- Pathfinding ---

pub fn grid_resolution() -> f32 {
    0.25
}
pub fn grid_padding() -> f32 {
    2.0
}
pub fn block_distance() -> f32 {
    0.2
}
pub fn buffer_zone_distance() -> f32 {
    0.6
}
pub fn near_wall_distance() -> f32 {
    1.2
}
pub fn buffer_zone_cost() -> f32 {
    10.0
}
pub fn near_wall_cost() -> f32 {
    3.0
}
pub fn base_cost() -> f32 {
    1.0
}
pub fn diagonal_cost() -> f32 {
    std::f32::consts::SQRT_2
}
pub fn max_iterations() -> usize {
    100_000
}
pub fn snap_search_radius_cells() -> i32 {
    20
}
pub fn los_sample_step() -> f32 {
    0.1
}
pub fn stair_pair_max_distance() -> f32 {
    5.0
}
pub fn reroute_threshold() -> f32 {
    4.0
}
pub fn ground_floor_number() -> i32 {
    0
}
pub fn arrival_radius() -> f32 {
    1.0
}
