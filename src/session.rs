//! Tracking session facade.
//!
//! Owns one user's correction engine, stair detector, and crossing
//! animator, and routes every step event through them: normal steps go to
//! the correction pipeline, steps during a stair crossing drive the
//! animator, and resolved crossings hand the session off to the new
//! floor's geometry.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::config::NavConfig;
use crate::core::CampusPoint;
use crate::correction::{PathPoint, StepCorrectionEngine};
use crate::error::{NavError, Result};
use crate::floor::{
    BuildingMetadata, CampusEntrance, FloorConstraintProvider, FloorDataSource,
};
use crate::stairs::{
    build_stair_pairs, AdvanceOutcome, MotionSample, StairPair, StairTransitionAnimator,
    StairTransitionDetector, TransitionState,
};

/// What one step did to the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Normal dead-reckoning step on the current floor
    Tracking { position: CampusPoint },
    /// Mid-crossing: position interpolated along the stairwell
    StairCrossing { position: CampusPoint, progress: f32 },
    /// A crossing resolved; the session now tracks on the new floor
    FloorChanged { floor: i32, position: CampusPoint },
    /// A crossing rewound; the session resumes on the origin floor
    CrossingCancelled { position: CampusPoint },
}

/// One user's tracking state across floors.
pub struct TrackingSession {
    config: NavConfig,
    source: Arc<dyn FloorDataSource>,
    metadata: BuildingMetadata,
    provider: FloorConstraintProvider,
    engine: StepCorrectionEngine,
    detector: StairTransitionDetector,
    animator: StairTransitionAnimator,
    current_floor: i32,
    /// Most recent confident classifier label, fed to the animator
    last_label: crate::stairs::MotionLabel,
}

impl TrackingSession {
    /// Build a session over a floor data source.
    ///
    /// Loads every floor's entrances up front to pair the stairwells; the
    /// per-floor wall geometry is loaded lazily on [`Self::set_position`].
    pub fn new(source: Arc<dyn FloorDataSource>, config: NavConfig) -> Result<Self> {
        let metadata = source.load_building_metadata()?;
        let pairs = Self::build_pairs(&*source, &metadata, &config)?;
        info!(
            "[Session] building '{}': {} floors, {} stair pairs",
            metadata.building_name,
            metadata.floors.len(),
            pairs.len()
        );

        Ok(Self {
            engine: StepCorrectionEngine::new(config.correction.clone()),
            detector: StairTransitionDetector::new(config.stairs.detection.clone(), pairs),
            animator: StairTransitionAnimator::new(config.stairs.animation.clone()),
            provider: FloorConstraintProvider::new(),
            current_floor: 0,
            last_label: crate::stairs::MotionLabel::Unknown,
            config,
            source,
            metadata,
        })
    }

    /// Anchor the session at a known position, heading, and floor.
    ///
    /// Discards all tracking state; the stride calibration factor resets
    /// with it.
    pub fn set_position(&mut self, position: CampusPoint, heading: f32, floor: i32) -> Result<()> {
        self.load_floor(floor)?;
        self.engine.reset();
        self.engine.set_origin(position, heading);
        self.detector.reset();
        self.animator.reset();
        Ok(())
    }

    /// Feed one classifier output.
    pub fn on_motion(&mut self, sample: MotionSample) {
        if sample.passes(self.config.stairs.detection.confidence_threshold) {
            self.last_label = sample.label;
        }
        self.detector.on_motion_sample(sample);
    }

    /// Feed one step event (heading in radians, stride in meters).
    pub fn on_step(&mut self, heading: f32, stride_length: f32) -> Result<StepOutcome> {
        match self.animator.state() {
            TransitionState::Climbing { .. } => {
                return self.advance_crossing(heading, stride_length)
            }
            TransitionState::Returning { .. } => return self.advance_return(heading),
            _ => {}
        }

        // Stride recalibration applies to every subsequent raw stride
        let effective_stride = stride_length * self.engine.stride_factor();
        let result = self
            .engine
            .process_step(&self.provider, heading, effective_stride);
        let position = result.position;

        let event = self
            .detector
            .check_transition(&position, heading, self.current_floor)
            .or_else(|| {
                self.detector
                    .check_sustained_transition(&position, self.current_floor)
            });

        if let Some(event) = event {
            // Commit the buffered tail before suspending dead reckoning
            self.engine.flush(&self.provider);
            self.animator.start_transition(event, heading);
            debug!(
                "[Session] crossing started {:?} on floor {}",
                event.direction, self.current_floor
            );
            return Ok(StepOutcome::StairCrossing {
                position: event.start_position,
                progress: 0.0,
            });
        }

        Ok(StepOutcome::Tracking { position })
    }

    /// Force the active crossing to resolve at the destination entrance.
    pub fn force_arrive(&mut self) -> Result<Option<StepOutcome>> {
        if self.animator.force_arrive().is_none() {
            return Ok(None);
        }
        self.resolve_crossing(0.0, 0.0).map(Some)
    }

    /// Drop all tracking state. The session must be re-anchored with
    /// [`Self::set_position`] before stepping again.
    pub fn invalidate(&mut self) {
        self.engine.reset();
        self.detector.reset();
        self.animator.reset();
        self.last_label = crate::stairs::MotionLabel::Unknown;
        debug!("[Session] invalidated");
    }

    pub fn current_floor(&self) -> i32 {
        self.current_floor
    }

    pub fn current_position(&self) -> Option<CampusPoint> {
        self.engine.current_position()
    }

    pub fn stride_factor(&self) -> f32 {
        self.engine.stride_factor()
    }

    pub fn committed_path(&self) -> &[PathPoint] {
        self.engine.committed_path()
    }

    pub fn transition_state(&self) -> &TransitionState {
        self.animator.state()
    }

    pub fn provider(&self) -> &FloorConstraintProvider {
        &self.provider
    }

    /// Campus-transformed stair pairs across the whole building.
    fn build_pairs(
        source: &dyn FloorDataSource,
        metadata: &BuildingMetadata,
        config: &NavConfig,
    ) -> Result<Vec<StairPair>> {
        let mut by_floor: HashMap<i32, Vec<CampusEntrance>> = HashMap::new();
        for info in &metadata.floors {
            let plan = source.load_floor_plan(&info.id)?;
            let entrances = plan
                .entrances
                .iter()
                .map(|e| CampusEntrance {
                    id: e.id.clone(),
                    name: e.name.clone(),
                    position: plan.transform.apply(e.position),
                    stair_direction: e.stair_direction,
                    connected_floor: e.connected_floor,
                })
                .collect();
            by_floor.insert(info.floor_number, entrances);
        }
        Ok(build_stair_pairs(
            &by_floor,
            config.pathfinding.routing.stair_pair_max_distance,
        ))
    }

    fn load_floor(&mut self, floor: i32) -> Result<()> {
        let info = self
            .metadata
            .floor_by_number(floor)
            .ok_or_else(|| NavError::FloorData(format!("unknown floor number {floor}")))?;
        let plan = self.source.load_floor_plan(&info.id)?;
        self.provider.load_floor(&plan);
        self.current_floor = floor;
        Ok(())
    }

    fn advance_crossing(&mut self, heading: f32, stride_length: f32) -> Result<StepOutcome> {
        match self.animator.advance_step(heading, self.last_label) {
            AdvanceOutcome::Climbing(position) | AdvanceOutcome::TurnedAround(position) => {
                Ok(StepOutcome::StairCrossing {
                    position,
                    progress: self.animator.progress(),
                })
            }
            AdvanceOutcome::Arrived(_, _) => self.resolve_crossing(heading, stride_length),
            _ => Ok(StepOutcome::Tracking {
                position: self.engine.current_position().unwrap_or(CampusPoint::ZERO),
            }),
        }
    }

    fn advance_return(&mut self, heading: f32) -> Result<StepOutcome> {
        match self.animator.advance_return_step(self.last_label) {
            AdvanceOutcome::Returning(position) => Ok(StepOutcome::StairCrossing {
                position,
                progress: self.animator.progress(),
            }),
            AdvanceOutcome::Cancelled(position) => {
                self.animator.finalize();
                self.detector.reset();
                // Same floor, same geometry: re-anchor at the entrance
                self.engine.set_origin(position, heading);
                debug!("[Session] crossing cancelled on floor {}", self.current_floor);
                Ok(StepOutcome::CrossingCancelled { position })
            }
            _ => Ok(StepOutcome::Tracking {
                position: self.engine.current_position().unwrap_or(CampusPoint::ZERO),
            }),
        }
    }

    /// Hand off to the destination floor after an arrival.
    fn resolve_crossing(&mut self, heading: f32, stride_length: f32) -> Result<StepOutcome> {
        let end_position = self
            .animator
            .event()
            .map(|e| e.end_position)
            .unwrap_or(CampusPoint::ZERO);
        let outcome = self
            .animator
            .finalize()
            .ok_or_else(|| NavError::FloorData("crossing resolved with no event".into()))?;

        self.load_floor(outcome.floor)?;
        self.detector.reset();
        // Keep the stride calibration; set_origin preserves it
        self.engine.set_origin(end_position, heading);

        // Replay the steps the classifier lagged behind on
        let effective = stride_length * self.engine.stride_factor();
        for _ in 0..outcome.replay_steps {
            self.engine.process_step(&self.provider, heading, effective);
        }

        info!(
            "[Session] crossing resolved, now on floor {} ({} replayed)",
            outcome.floor, outcome.replay_steps
        );
        Ok(StepOutcome::FloorChanged {
            floor: outcome.floor,
            position: self.engine.current_position().unwrap_or(end_position),
        })
    }
}
