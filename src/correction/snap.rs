//! Entrance snapping after a detected turn.
//!
//! People turn at doorways. When the turn detector fires, the dead-reckoned
//! pivot position is matched against nearby entrances in the walking
//! direction; an accepted match both moves the pivot and recalibrates the
//! stride model.

use log::debug;

use crate::config::CorrectionConfig;
use crate::core::{CampusPoint, CampusVector};
use crate::floor::FloorConstraintProvider;

use super::types::SnapResult;

/// Snaps turn positions onto known entrances.
#[derive(Clone, Debug)]
pub struct EntranceSnapper {
    config: CorrectionConfig,
}

impl EntranceSnapper {
    pub fn new(config: CorrectionConfig) -> Self {
        Self { config }
    }

    /// Swap in a new configuration.
    pub fn set_config(&mut self, config: CorrectionConfig) {
        self.config = config;
    }

    /// Try to snap `turn_position` onto the closest entrance consistent
    /// with `pre_turn_heading`.
    ///
    /// Matches farther than half the snap radius are rejected; beyond that
    /// the odds of grabbing the wrong door outweigh the correction value.
    pub fn try_snap(
        &self,
        provider: &FloorConstraintProvider,
        turn_position: &CampusPoint,
        pre_turn_heading: f32,
        stride_length: f32,
    ) -> Option<SnapResult> {
        let candidates = provider.entrances_near(
            turn_position,
            self.config.entrance_snap_radius,
            Some(pre_turn_heading),
            self.config.entrance_heading_tolerance,
        );

        let entrance = candidates.into_iter().min_by(|a, b| {
            let da = a.position.distance_squared(turn_position);
            let db = b.position.distance_squared(turn_position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })?;

        let distance = entrance.position.distance(turn_position);
        if distance > self.config.entrance_snap_radius * 0.5 {
            debug!(
                "[Snapper] rejected {}: {:.2}m exceeds half snap radius",
                entrance.id, distance
            );
            return None;
        }

        let correction = entrance.position - *turn_position;
        let walking_dir = CampusVector::from_heading(pre_turn_heading);

        // Positive along-track component: the entrance sits farther out than
        // dead reckoning placed us, so the stride was underestimated.
        let along_track = correction.dot(&walking_dir);
        let stride_adjustment = if stride_length > f32::EPSILON {
            (along_track / stride_length).clamp(
                -self.config.max_stride_adjustment,
                self.config.max_stride_adjustment,
            )
        } else {
            0.0
        };

        debug!(
            "[Snapper] snapped to {} ({:.2}m, stride nudge {:+.3})",
            entrance.id, distance, stride_adjustment
        );

        Some(SnapResult {
            snapped_position: entrance.position,
            correction,
            stride_adjustment,
        })
    }
}
