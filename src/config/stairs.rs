//! Stairwell subsystem configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Stairwell settings section: detection plus animation.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StairsSection {
    /// Transition detector settings
    #[serde(default)]
    pub detection: StairDetectionConfig,

    /// Transition animator settings
    #[serde(default)]
    pub animation: StairAnimationConfig,
}

/// Stair transition detector settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StairDetectionConfig {
    /// Radius around the user searched for stair entrances (meters)
    #[serde(default = "defaults::stair_proximity_radius")]
    pub proximity_radius: f32,

    /// Expanded radius used by the sustained-label fallback path (meters)
    #[serde(default = "defaults::stair_expanded_radius")]
    pub expanded_radius: f32,

    /// Half-angle of the field-of-view cone around the lagged heading (radians)
    #[serde(default = "defaults::stair_fov_half_angle")]
    pub fov_half_angle: f32,

    /// Heading lag in steps, so the FOV uses the approach direction
    #[serde(default = "defaults::heading_lag_steps")]
    pub heading_lag_steps: usize,

    /// Steps a candidate entrance persists after the user leaves proximity
    #[serde(default = "defaults::candidate_hold_steps")]
    pub candidate_hold_steps: usize,

    /// Size of the sliding window of recent classifier labels
    #[serde(default = "defaults::label_window_size")]
    pub label_window_size: usize,

    /// Matching labels required in the window to fire a transition
    #[serde(default = "defaults::label_matches_required")]
    pub label_matches_required: usize,

    /// Classifier confidence below which a sample is discarded
    #[serde(default = "defaults::confidence_threshold")]
    pub confidence_threshold: f32,

    /// Identical consecutive stair labels needed for the fallback path
    #[serde(default = "defaults::sustained_run_threshold")]
    pub sustained_run_threshold: usize,
}

impl Default for StairDetectionConfig {
    fn default() -> Self {
        Self {
            proximity_radius: defaults::stair_proximity_radius(),
            expanded_radius: defaults::stair_expanded_radius(),
            fov_half_angle: defaults::stair_fov_half_angle(),
            heading_lag_steps: defaults::heading_lag_steps(),
            candidate_hold_steps: defaults::candidate_hold_steps(),
            label_window_size: defaults::label_window_size(),
            label_matches_required: defaults::label_matches_required(),
            confidence_threshold: defaults::confidence_threshold(),
            sustained_run_threshold: defaults::sustained_run_threshold(),
        }
    }
}

/// Stair transition animator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StairAnimationConfig {
    /// Horizontal distance covered by one stair step (meters)
    #[serde(default = "defaults::stair_step_unit_length")]
    pub stair_step_unit_length: f32,

    /// Lower clamp on the estimated total step count
    #[serde(default = "defaults::min_transition_steps")]
    pub min_transition_steps: usize,

    /// Upper clamp on the estimated total step count
    #[serde(default = "defaults::max_transition_steps")]
    pub max_transition_steps: usize,

    /// Progress floor below which arrival triggers are ignored
    #[serde(default = "defaults::min_arrival_progress")]
    pub min_arrival_progress: f32,

    /// Consecutive walking labels that signal arrival at the landing
    #[serde(default = "defaults::walking_run_for_arrival")]
    pub walking_run_for_arrival: usize,

    /// Heading deviation from the sliding average that signals a landing turn (radians)
    #[serde(default = "defaults::landing_turn_threshold")]
    pub landing_turn_threshold: f32,

    /// Size of the sliding heading window during climbing
    #[serde(default = "defaults::heading_window_size")]
    pub heading_window_size: usize,

    /// Consecutive opposite-direction labels that signal a turnaround
    #[serde(default = "defaults::opposite_run_for_cancel")]
    pub opposite_run_for_cancel: usize,

    /// Steps that must elapse before a turnaround can be recognized
    #[serde(default = "defaults::min_steps_before_cancel")]
    pub min_steps_before_cancel: usize,

    /// Lower clamp on detection-lag replay steps after a walking arrival.
    /// Empirically tuned; exposed rather than derived.
    #[serde(default = "defaults::replay_clamp_min")]
    pub replay_clamp_min: usize,

    /// Upper clamp on detection-lag replay steps after a walking arrival
    #[serde(default = "defaults::replay_clamp_max")]
    pub replay_clamp_max: usize,
}

impl Default for StairAnimationConfig {
    fn default() -> Self {
        Self {
            stair_step_unit_length: defaults::stair_step_unit_length(),
            min_transition_steps: defaults::min_transition_steps(),
            max_transition_steps: defaults::max_transition_steps(),
            min_arrival_progress: defaults::min_arrival_progress(),
            walking_run_for_arrival: defaults::walking_run_for_arrival(),
            landing_turn_threshold: defaults::landing_turn_threshold(),
            heading_window_size: defaults::heading_window_size(),
            opposite_run_for_cancel: defaults::opposite_run_for_cancel(),
            min_steps_before_cancel: defaults::min_steps_before_cancel(),
            replay_clamp_min: defaults::replay_clamp_min(),
            replay_clamp_max: defaults::replay_clamp_max(),
        }
    }
}
