//! Step correction engine: buffered dead reckoning with turn-triggered
//! entrance snapping, wall clamping, and stride recalibration.
//!
//! Each call to [`StepCorrectionEngine::process_step`] appends one raw step
//! to the buffer. While the buffer is filling, the live position is returned
//! uncorrected; once full, every new step pushes the oldest buffered step
//! through turn detection, snapping, and wall constraint, and commits it to
//! the path. The remaining buffer is re-chained from the freshly committed
//! anchor.

use log::{debug, trace};

use crate::config::CorrectionConfig;
use crate::core::{normalize_angle, CampusPoint, CampusVector};
use crate::floor::FloorConstraintProvider;

use super::snap::EntranceSnapper;
use super::turn::TurnDetector;
use super::types::{PathPoint, RawStep, StepResult};
use super::wall::WallConstraint;

/// The buffered correction pipeline for one tracking session.
pub struct StepCorrectionEngine {
    config: CorrectionConfig,
    turn_detector: TurnDetector,
    snapper: EntranceSnapper,
    wall_constraint: WallConstraint,

    /// Uncommitted raw steps, oldest first
    buffer: Vec<RawStep>,
    /// Committed path, append-only (snap smoothing nudges the tail in place)
    committed: Vec<PathPoint>,
    /// Anchor position and heading, set by `set_origin`
    origin: Option<(CampusPoint, f32)>,
    /// Heading correction accumulated from wall slides
    heading_correction: f32,
    /// Exponentially smoothed stride calibration factor
    stride_factor: f32,
    /// Monotonic step counter
    step_count: u64,
}

impl StepCorrectionEngine {
    /// Create a new engine.
    pub fn new(config: CorrectionConfig) -> Self {
        Self {
            turn_detector: TurnDetector::new(config.clone()),
            snapper: EntranceSnapper::new(config.clone()),
            wall_constraint: WallConstraint::new(config.clone()),
            config,
            buffer: Vec::new(),
            committed: Vec::new(),
            origin: None,
            heading_correction: 0.0,
            stride_factor: 1.0,
            step_count: 0,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CorrectionConfig::default())
    }

    /// Replace the configuration without disturbing buffered or committed
    /// path state.
    pub fn update_config(&mut self, config: CorrectionConfig) {
        self.turn_detector.set_config(config.clone());
        self.snapper.set_config(config.clone());
        self.wall_constraint.set_config(config.clone());
        self.config = config;
    }

    /// Anchor the path at `position` facing `heading`, discarding any
    /// buffered and committed state.
    pub fn set_origin(&mut self, position: CampusPoint, heading: f32) {
        self.buffer.clear();
        self.committed.clear();
        self.origin = Some((position, heading));
        self.heading_correction = 0.0;
        debug!(
            "[Correction] origin set at ({:.2}, {:.2})",
            position.x, position.y
        );
    }

    /// The committed path so far.
    pub fn committed_path(&self) -> &[PathPoint] {
        &self.committed
    }

    /// Current best position: the newest buffered step, else the newest
    /// committed point, else the origin.
    pub fn current_position(&self) -> Option<CampusPoint> {
        self.buffer
            .last()
            .map(|s| s.position)
            .or_else(|| self.committed.last().map(|p| p.position))
            .or_else(|| self.origin.map(|(p, _)| p))
    }

    /// Current stride calibration factor.
    pub fn stride_factor(&self) -> f32 {
        self.stride_factor
    }

    /// Accumulated heading correction.
    pub fn heading_correction(&self) -> f32 {
        self.heading_correction
    }

    /// Process one step event.
    pub fn process_step(
        &mut self,
        provider: &FloorConstraintProvider,
        heading: f32,
        stride_length: f32,
    ) -> StepResult {
        self.step_count += 1;

        // No origin: record uncorrected, never buffer
        let Some((origin_pos, _)) = self.origin else {
            let anchor = self
                .committed
                .last()
                .map(|p| p.position)
                .unwrap_or(CampusPoint::ZERO);
            let position = anchor.advanced(heading, stride_length);
            self.committed.push(PathPoint { position, heading });
            return StepResult {
                committed: vec![PathPoint { position, heading }],
                position,
                heading_correction: 0.0,
                stride_factor: self.stride_factor,
            };
        };

        let corrected_heading = normalize_angle(heading + self.heading_correction);
        let anchor = self
            .buffer
            .last()
            .map(|s| s.position)
            .or_else(|| self.committed.last().map(|p| p.position))
            .unwrap_or(origin_pos);

        let raw = RawStep {
            position: anchor.advanced(corrected_heading, stride_length),
            heading: corrected_heading,
            stride_length,
            timestamp: self.step_count,
        };
        self.buffer.push(raw);

        // Short buffers over-fit: report the live position and wait
        if self.buffer.len() < self.config.buffer_size {
            return StepResult {
                committed: Vec::new(),
                position: raw.position,
                heading_correction: self.heading_correction,
                stride_factor: self.stride_factor,
            };
        }

        let committed = self.run_pipeline_pass(provider);
        StepResult {
            committed,
            position: self
                .current_position()
                .unwrap_or(raw.position),
            heading_correction: self.heading_correction,
            stride_factor: self.stride_factor,
        }
    }

    /// Wall-constrain and commit every remaining buffered step, in order.
    ///
    /// Used when tracking stops or hands off to another floor's geometry.
    pub fn flush(&mut self, provider: &FloorConstraintProvider) -> Vec<PathPoint> {
        let mut flushed = Vec::with_capacity(self.buffer.len());
        while !self.buffer.is_empty() {
            flushed.push(self.commit_oldest(provider));
        }
        debug!("[Correction] flushed {} buffered steps", flushed.len());
        flushed
    }

    /// Discard all state without flushing.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.committed.clear();
        self.origin = None;
        self.heading_correction = 0.0;
        self.stride_factor = 1.0;
        self.step_count = 0;
    }

    /// One full pass: turn detection, snapping, then commit the oldest step.
    fn run_pipeline_pass(&mut self, provider: &FloorConstraintProvider) -> Vec<PathPoint> {
        let pre_heading = self.context_heading();

        if let Some(turn) = self.turn_detector.detect(&self.buffer, pre_heading) {
            trace!(
                "[Correction] turn at buffer index {} ({:+.1}°)",
                turn.buffer_index,
                turn.heading_delta.to_degrees()
            );
            let pivot_stride = self.buffer[turn.buffer_index].stride_length;
            if let Some(snap) =
                self.snapper
                    .try_snap(provider, &turn.position, turn.pre_heading, pivot_stride)
            {
                self.apply_snap(snap.correction);

                let new_factor = 1.0 + snap.stride_adjustment;
                let alpha = self.config.stride_smoothing_alpha;
                self.stride_factor = (1.0 - alpha) * self.stride_factor + alpha * new_factor;
            }
        }

        vec![self.commit_oldest(provider)]
    }

    /// Heading context preceding the buffer: the newest committed heading,
    /// else the origin heading.
    fn context_heading(&self) -> f32 {
        self.committed
            .last()
            .map(|p| p.heading)
            .or_else(|| self.origin.map(|(_, h)| h))
            .unwrap_or(0.0)
    }

    /// Shift the path onto the snapped entrance: blend the correction
    /// backward over the committed tail with linearly increasing weight
    /// (full correction at the newest point, so the chained buffer inherits
    /// it), then re-chain the buffer from the shifted anchor.
    fn apply_snap(&mut self, correction: CampusVector) {
        let n = self.config.retroactive_smooth_steps.min(self.committed.len());
        if n > 0 {
            let start = self.committed.len() - n;
            for (j, point) in self.committed[start..].iter_mut().enumerate() {
                let weight = (j + 1) as f32 / n as f32;
                point.position = point.position + correction * weight;
            }
        } else if let Some((pos, heading)) = self.origin {
            // Nothing committed yet: the origin itself is the anchor
            self.origin = Some((pos + correction, heading));
        }

        self.rechain_from(0);
    }

    /// Re-chain buffered steps starting at `from_index` so each follows its
    /// predecessor by its own heading and stride. Index 0 chains from the
    /// committed anchor.
    fn rechain_from(&mut self, from_index: usize) {
        for i in from_index..self.buffer.len() {
            let anchor = if i == 0 {
                self.committed
                    .last()
                    .map(|p| p.position)
                    .or_else(|| self.origin.map(|(p, _)| p))
                    .unwrap_or(CampusPoint::ZERO)
            } else {
                self.buffer[i - 1].position
            };
            let step = self.buffer[i];
            self.buffer[i].position = anchor.advanced(step.heading, step.stride_length);
        }
    }

    /// Pop the oldest buffered step, wall-constrain it against the previous
    /// committed anchor, commit it, and rebase the remaining buffer.
    fn commit_oldest(&mut self, provider: &FloorConstraintProvider) -> PathPoint {
        let step = self.buffer.remove(0);
        let anchor = self
            .committed
            .last()
            .map(|p| p.position)
            .or_else(|| self.origin.map(|(p, _)| p))
            .unwrap_or(step.position);

        let result = self
            .wall_constraint
            .constrain(provider, &anchor, &step.position);
        if result.was_constrained {
            self.heading_correction =
                normalize_angle(self.heading_correction + result.heading_correction);
        }

        let point = PathPoint {
            position: result.position,
            heading: step.heading,
        };
        self.committed.push(point);
        self.rechain_from(0);
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Segment;
    use crate::floor::{FloorPlan, FloorTransform, LocalEntrance, StairDirection};

    fn empty_provider() -> FloorConstraintProvider {
        FloorConstraintProvider::new()
    }

    fn engine_with_buffer(buffer_size: usize) -> StepCorrectionEngine {
        StepCorrectionEngine::new(CorrectionConfig {
            buffer_size,
            ..Default::default()
        })
    }

    #[test]
    fn test_straight_line_equivalence() {
        // N identical headings/strides, no walls, no turns: the committed
        // path lies on origin + k * stride * direction
        let provider = empty_provider();
        let mut engine = engine_with_buffer(4);
        engine.set_origin(CampusPoint::ZERO, 0.0);

        for _ in 0..10 {
            engine.process_step(&provider, 0.0, 0.7);
        }
        let flushed = engine.flush(&provider);
        assert!(!flushed.is_empty());

        for (k, point) in engine.committed_path().iter().enumerate() {
            let expected = 0.7 * (k + 1) as f32;
            assert!(
                (point.position.x - expected).abs() < 1e-4,
                "k={k}: {} vs {expected}",
                point.position.x
            );
            assert!(point.position.y.abs() < 1e-4);
        }
    }

    #[test]
    fn test_live_position_while_buffer_fills() {
        let provider = empty_provider();
        let mut engine = engine_with_buffer(5);
        engine.set_origin(CampusPoint::ZERO, 0.0);

        let result = engine.process_step(&provider, 0.0, 0.7);
        assert!(result.committed.is_empty());
        assert!((result.position.x - 0.7).abs() < 1e-5);

        // Fifth step fills the buffer and commits the oldest
        for _ in 0..3 {
            assert!(engine.process_step(&provider, 0.0, 0.7).committed.is_empty());
        }
        let result = engine.process_step(&provider, 0.0, 0.7);
        assert_eq!(result.committed.len(), 1);
    }

    #[test]
    fn test_no_origin_passes_through() {
        let provider = empty_provider();
        let mut engine = engine_with_buffer(5);

        let result = engine.process_step(&provider, 0.0, 0.7);
        assert_eq!(result.committed.len(), 1);
        assert_eq!(engine.committed_path().len(), 1);
    }

    #[test]
    fn test_reset_discards_everything() {
        let provider = empty_provider();
        let mut engine = engine_with_buffer(3);
        engine.set_origin(CampusPoint::ZERO, 0.0);
        for _ in 0..6 {
            engine.process_step(&provider, 0.2, 0.7);
        }
        engine.reset();
        assert!(engine.committed_path().is_empty());
        assert!(engine.current_position().is_none());
    }

    #[test]
    fn test_flush_commits_tail_in_order() {
        let provider = empty_provider();
        let mut engine = engine_with_buffer(8);
        engine.set_origin(CampusPoint::ZERO, 0.0);

        for _ in 0..5 {
            engine.process_step(&provider, 0.0, 1.0);
        }
        assert!(engine.committed_path().is_empty());

        let flushed = engine.flush(&provider);
        assert_eq!(flushed.len(), 5);
        for (k, point) in flushed.iter().enumerate() {
            assert!((point.position.x - (k + 1) as f32).abs() < 1e-4);
        }
    }

    #[test]
    fn test_snap_moves_pivot_and_rechains() {
        // Walk east, turn north at a doorway that sits slightly ahead of
        // where dead reckoning puts the turn
        let mut provider = FloorConstraintProvider::new();
        provider.load_floor(&FloorPlan {
            id: None,
            floor_number: 1,
            walls: Vec::new(),
            entrances: vec![LocalEntrance {
                id: "door".into(),
                name: "Door".into(),
                position: CampusPoint::new(3.3, 0.0),
                stair_direction: Some(StairDirection::Up),
                connected_floor: None,
            }],
            boundaries: Vec::new(),
            transform: FloorTransform::default(),
        });

        let mut engine = engine_with_buffer(3);
        engine.set_origin(CampusPoint::ZERO, 0.0);

        // Three eastbound steps land the pivot at x=3.0
        for _ in 0..3 {
            engine.process_step(&provider, 0.0, 1.0);
        }
        // Turn north: detector fires on the full buffer, snapper pulls the
        // pivot onto the door at x=3.3
        let result = engine.process_step(&provider, std::f32::consts::FRAC_PI_2, 1.0);

        assert!(result.stride_factor > 1.0);
        let last = engine.current_position().unwrap();
        // Chained from the snapped pivot, the live position reflects the
        // +0.3 correction
        assert!(last.x > 3.0);
    }

    #[test]
    fn test_update_config_keeps_path() {
        let provider = empty_provider();
        let mut engine = engine_with_buffer(3);
        engine.set_origin(CampusPoint::ZERO, 0.0);
        for _ in 0..5 {
            engine.process_step(&provider, 0.0, 1.0);
        }
        let before = engine.committed_path().len();
        assert!(before > 0);

        engine.update_config(CorrectionConfig {
            buffer_size: 6,
            ..Default::default()
        });
        assert_eq!(engine.committed_path().len(), before);
    }

    #[test]
    fn test_wall_blocks_pass_through() {
        let mut provider = FloorConstraintProvider::new();
        provider.load_floor(&FloorPlan {
            id: None,
            floor_number: 1,
            walls: vec![Segment::new(
                CampusPoint::new(2.5, -10.0),
                CampusPoint::new(2.5, 10.0),
            )],
            entrances: Vec::new(),
            boundaries: Vec::new(),
            transform: FloorTransform::default(),
        });

        let mut engine = engine_with_buffer(2);
        engine.set_origin(CampusPoint::ZERO, 0.0);
        for _ in 0..8 {
            engine.process_step(&provider, 0.0, 1.0);
        }
        engine.flush(&provider);

        for point in engine.committed_path() {
            assert!(
                point.position.x < 2.5,
                "committed point crossed the wall: {:?}",
                point.position
            );
        }
    }
}
