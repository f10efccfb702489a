//! Turn detection over the raw-step buffer.
//!
//! Operates on the whole buffer rather than consecutive heading pairs:
//! single-step sensor jitter rarely exceeds the threshold against the
//! pre-buffer heading, while a real turn holds its new heading for the
//! rest of the window.

use crate::config::CorrectionConfig;
use crate::core::angle_diff;

use super::types::{RawStep, TurnEvent};

/// Detects at most one turn per pipeline pass.
#[derive(Clone, Debug)]
pub struct TurnDetector {
    config: CorrectionConfig,
}

impl TurnDetector {
    pub fn new(config: CorrectionConfig) -> Self {
        Self { config }
    }

    /// Swap in a new configuration.
    pub fn set_config(&mut self, config: CorrectionConfig) {
        self.config = config;
    }

    /// Scan the buffer for a heading deviation against `pre_heading` (the
    /// heading of the last committed step).
    ///
    /// Returns the event at the index of maximum absolute deviation, or
    /// `None` when no interior heading deviates beyond the threshold.
    pub fn detect(&self, buffer: &[RawStep], pre_heading: f32) -> Option<TurnEvent> {
        let mut best: Option<(usize, f32)> = None;

        for (i, step) in buffer.iter().enumerate() {
            let delta = angle_diff(pre_heading, step.heading);
            if delta.abs() < self.config.turn_detection_threshold {
                continue;
            }
            match best {
                Some((_, d)) if d.abs() >= delta.abs() => {}
                _ => best = Some((i, delta)),
            }
        }

        best.map(|(index, delta)| {
            let step = &buffer[index];
            TurnEvent {
                buffer_index: index,
                pre_heading,
                post_heading: step.heading,
                heading_delta: delta,
                // Where the user pivoted: the start of the deviating step
                position: step.position.advanced(step.heading, -step.stride_length),
            }
        })
    }
}
