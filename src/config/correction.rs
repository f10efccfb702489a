//! Correction pipeline configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Tunable parameters for the dead-reckoning correction pipeline.
///
/// Immutable from the pipeline's point of view; swapping in a new config at
/// runtime does not disturb accumulated path state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Number of raw steps buffered before corrections commit
    #[serde(default = "defaults::buffer_size")]
    pub buffer_size: usize,

    /// Search radius for candidate entrances when snapping (meters)
    #[serde(default = "defaults::entrance_snap_radius")]
    pub entrance_snap_radius: f32,

    /// Maximum angular deviation between walking direction and entrance
    /// direction for a snap candidate (radians)
    #[serde(default = "defaults::entrance_heading_tolerance")]
    pub entrance_heading_tolerance: f32,

    /// Minimum heading change inside the buffer that counts as a turn (radians)
    #[serde(default = "defaults::turn_detection_threshold")]
    pub turn_detection_threshold: f32,

    /// Stand-off distance kept between a constrained position and the wall (meters)
    #[serde(default = "defaults::wall_epsilon")]
    pub wall_epsilon: f32,

    /// Radius of the wall query around each movement segment (meters)
    #[serde(default = "defaults::wall_search_radius")]
    pub wall_search_radius: f32,

    /// Maximum wall-slide iterations per step (corners need at least 2)
    #[serde(default = "defaults::max_wall_iterations")]
    pub max_wall_iterations: usize,

    /// Fraction of the slide angle fed back into future headings
    #[serde(default = "defaults::heading_correction_factor")]
    pub heading_correction_factor: f32,

    /// Number of already-committed points blended backward after a snap
    #[serde(default = "defaults::retroactive_smooth_steps")]
    pub retroactive_smooth_steps: usize,

    /// Clamp on the per-snap stride calibration factor (fractional)
    #[serde(default = "defaults::max_stride_adjustment")]
    pub max_stride_adjustment: f32,

    /// Weight of a new snap in the exponentially smoothed stride factor
    #[serde(default = "defaults::stride_smoothing_alpha")]
    pub stride_smoothing_alpha: f32,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            buffer_size: defaults::buffer_size(),
            entrance_snap_radius: defaults::entrance_snap_radius(),
            entrance_heading_tolerance: defaults::entrance_heading_tolerance(),
            turn_detection_threshold: defaults::turn_detection_threshold(),
            wall_epsilon: defaults::wall_epsilon(),
            wall_search_radius: defaults::wall_search_radius(),
            max_wall_iterations: defaults::max_wall_iterations(),
            heading_correction_factor: defaults::heading_correction_factor(),
            retroactive_smooth_steps: defaults::retroactive_smooth_steps(),
            max_stride_adjustment: defaults::max_stride_adjustment(),
            stride_smoothing_alpha: defaults::stride_smoothing_alpha(),
        }
    }
}
