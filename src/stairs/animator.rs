//! Stairwell transition animator.
//!
//! While a transition is active, dead reckoning is suspended and the
//! position is interpolated between the stair entrances. Arrival is signaled
//! by either a run of walking labels (classifier ground truth, but it lags)
//! or a sharp landing turn detected from headings (immediate). A sustained
//! run of opposite-direction labels mid-climb means the user turned around;
//! the animation then rewinds to the origin entrance.

use std::collections::VecDeque;

use log::debug;

use crate::config::StairAnimationConfig;
use crate::core::{angle_diff, CampusPoint};
use crate::floor::StairDirection;

use super::detector::StairTransitionEvent;
use super::motion::MotionLabel;

/// Why the animator decided the user reached the destination floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrivalReason {
    /// A run of walking labels: the user already walked past the landing,
    /// so the caller should replay the compensated steps afterward
    Walking,
    /// A sharp heading change at the landing; no replay needed
    LandingTurn,
    /// Caller forced the arrival
    Forced,
}

/// Animator state. One value per subsystem; transitions are total
/// functions returning side output.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionState {
    Idle,
    Climbing {
        steps_taken: usize,
        estimated_total: usize,
        progress: f32,
    },
    Arrived {
        reason: ArrivalReason,
    },
    Returning {
        steps_taken: usize,
        estimated_total: usize,
        from_progress: f32,
        progress: f32,
    },
    Cancelled,
}

impl TransitionState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            TransitionState::Idle => "Idle",
            TransitionState::Climbing { .. } => "Climbing",
            TransitionState::Arrived { .. } => "Arrived",
            TransitionState::Returning { .. } => "Returning",
            TransitionState::Cancelled => "Cancelled",
        }
    }
}

/// Side output of one animator advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AdvanceOutcome {
    /// Still climbing; interpolated position
    Climbing(CampusPoint),
    /// Arrival fired this step; position snapped to the destination entrance
    Arrived(CampusPoint, ArrivalReason),
    /// Turnaround fired this step; rewinding
    TurnedAround(CampusPoint),
    /// Still rewinding toward the origin entrance
    Returning(CampusPoint),
    /// Rewind finished; position back at the origin entrance
    Cancelled(CampusPoint),
    /// Call did not apply to the current state
    Inactive,
}

/// Outcome of finalizing a resolved transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinalizeOutcome {
    /// Steps the caller should replay through the correction pipeline to
    /// compensate detection lag (nonzero only for walking arrivals)
    pub replay_steps: usize,
    /// Floor the user ends up on
    pub floor: i32,
}

/// Drives an interpolated stair crossing.
pub struct StairTransitionAnimator {
    config: StairAnimationConfig,
    state: TransitionState,
    event: Option<StairTransitionEvent>,
    heading_window: VecDeque<f32>,
    walking_run: usize,
    opposite_run: usize,
}

impl StairTransitionAnimator {
    pub fn new(config: StairAnimationConfig) -> Self {
        Self {
            config,
            state: TransitionState::Idle,
            event: None,
            heading_window: VecDeque::new(),
            walking_run: 0,
            opposite_run: 0,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(StairAnimationConfig::default())
    }

    /// Swap in a new configuration.
    pub fn set_config(&mut self, config: StairAnimationConfig) {
        self.config = config;
    }

    /// Current state.
    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    /// Is a transition currently being animated?
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            TransitionState::Climbing { .. } | TransitionState::Returning { .. }
        )
    }

    /// Current progress along the crossing, in [0, 1].
    pub fn progress(&self) -> f32 {
        match &self.state {
            TransitionState::Climbing { progress, .. }
            | TransitionState::Returning { progress, .. } => *progress,
            TransitionState::Arrived { .. } => 1.0,
            _ => 0.0,
        }
    }

    /// The event driving the active transition, if any.
    pub fn event(&self) -> Option<&StairTransitionEvent> {
        self.event.as_ref()
    }

    /// Begin animating a crossing. Only valid from `Idle`; an active
    /// transition is left undisturbed.
    pub fn start_transition(&mut self, event: StairTransitionEvent, heading: f32) {
        if !matches!(self.state, TransitionState::Idle) {
            return;
        }

        let distance = event.start_position.distance(&event.end_position);
        let estimated_total = ((distance / self.config.stair_step_unit_length).ceil() as usize)
            .clamp(
                self.config.min_transition_steps,
                self.config.max_transition_steps,
            );

        debug!(
            "[StairAnimator] start {:?} {} -> {} ({} estimated steps)",
            event.direction, event.origin_floor, event.destination_floor, estimated_total
        );

        self.event = Some(event);
        self.heading_window.clear();
        self.heading_window.push_back(heading);
        self.walking_run = 0;
        self.opposite_run = 0;
        self.state = TransitionState::Climbing {
            steps_taken: 0,
            estimated_total,
            progress: 0.0,
        };
    }

    /// Advance one step while climbing.
    ///
    /// Progress caps at 1 without triggering arrival by itself; only a
    /// walking run or a landing turn resolves the crossing.
    pub fn advance_step(&mut self, heading: f32, label: MotionLabel) -> AdvanceOutcome {
        let TransitionState::Climbing {
            steps_taken,
            estimated_total,
            ..
        } = self.state
        else {
            return AdvanceOutcome::Inactive;
        };
        let Some(event) = self.event else {
            return AdvanceOutcome::Inactive;
        };

        let steps_taken = steps_taken + 1;
        let progress = (steps_taken as f32 / estimated_total as f32).min(1.0);
        let position = event.start_position.lerp(&event.end_position, progress);

        self.track_label(&event, label);
        let turned_sharply = self.heading_deviates(heading);
        self.push_heading(heading);

        // Arrival beats cancellation when both would fire this step
        let arrival = if progress >= self.config.min_arrival_progress {
            if self.walking_run >= self.config.walking_run_for_arrival {
                Some(ArrivalReason::Walking)
            } else if turned_sharply && label.stair_direction().is_none() {
                Some(ArrivalReason::LandingTurn)
            } else {
                None
            }
        } else {
            None
        };

        if let Some(reason) = arrival {
            debug!("[StairAnimator] arrived ({reason:?}) after {steps_taken} steps");
            self.state = TransitionState::Arrived { reason };
            return AdvanceOutcome::Arrived(event.end_position, reason);
        }

        if steps_taken >= self.config.min_steps_before_cancel
            && self.opposite_run >= self.config.opposite_run_for_cancel
        {
            let return_total = ((progress * estimated_total as f32).ceil() as usize).max(1);
            debug!("[StairAnimator] turnaround at progress {progress:.2}");
            self.state = TransitionState::Returning {
                steps_taken: 0,
                estimated_total: return_total,
                from_progress: progress,
                progress,
            };
            return AdvanceOutcome::TurnedAround(position);
        }

        self.state = TransitionState::Climbing {
            steps_taken,
            estimated_total,
            progress,
        };
        AdvanceOutcome::Climbing(position)
    }

    /// Advance one step while returning after a turnaround.
    pub fn advance_return_step(&mut self, label: MotionLabel) -> AdvanceOutcome {
        let TransitionState::Returning {
            steps_taken,
            estimated_total,
            from_progress,
            ..
        } = self.state
        else {
            return AdvanceOutcome::Inactive;
        };
        let Some(event) = self.event else {
            return AdvanceOutcome::Inactive;
        };

        let steps_taken = steps_taken + 1;
        let progress =
            (from_progress * (1.0 - steps_taken as f32 / estimated_total as f32)).max(0.0);
        let position = event.start_position.lerp(&event.end_position, progress);

        if progress <= 0.0 || label == MotionLabel::Walking {
            debug!("[StairAnimator] cancelled, back at origin entrance");
            self.state = TransitionState::Cancelled;
            return AdvanceOutcome::Cancelled(event.start_position);
        }

        self.state = TransitionState::Returning {
            steps_taken,
            estimated_total,
            from_progress,
            progress,
        };
        AdvanceOutcome::Returning(position)
    }

    /// Snap to the destination entrance regardless of signals.
    pub fn force_arrive(&mut self) -> Option<CampusPoint> {
        let event = self.event?;
        if matches!(self.state, TransitionState::Idle | TransitionState::Cancelled) {
            return None;
        }
        self.state = TransitionState::Arrived {
            reason: ArrivalReason::Forced,
        };
        Some(event.end_position)
    }

    /// Resolve a finished transition and return to `Idle`.
    ///
    /// Only a walking-triggered arrival carries replay compensation: the
    /// user already walked past the landing while the classifier caught up.
    pub fn finalize(&mut self) -> Option<FinalizeOutcome> {
        let event = self.event?;
        let outcome = match &self.state {
            TransitionState::Arrived { reason } => {
                let replay_steps = if *reason == ArrivalReason::Walking {
                    event.pre_climbed_steps.clamp(
                        self.config.replay_clamp_min,
                        self.config.replay_clamp_max,
                    )
                } else {
                    0
                };
                Some(FinalizeOutcome {
                    replay_steps,
                    floor: event.destination_floor,
                })
            }
            TransitionState::Cancelled => Some(FinalizeOutcome {
                replay_steps: 0,
                floor: event.origin_floor,
            }),
            _ => None,
        };

        if outcome.is_some() {
            self.reset();
        }
        outcome
    }

    /// Fully clear state back to `Idle`.
    pub fn reset(&mut self) {
        self.state = TransitionState::Idle;
        self.event = None;
        self.heading_window.clear();
        self.walking_run = 0;
        self.opposite_run = 0;
    }

    /// Update walking/opposite label runs for the travel direction.
    fn track_label(&mut self, event: &StairTransitionEvent, label: MotionLabel) {
        match label.stair_direction() {
            Some(d) if d == event.direction => {
                self.walking_run = 0;
                self.opposite_run = 0;
            }
            Some(_) => {
                self.walking_run = 0;
                self.opposite_run += 1;
            }
            None if label == MotionLabel::Walking => {
                self.walking_run += 1;
                self.opposite_run = 0;
            }
            None => {
                // Idle/unknown: no evidence either way
                self.walking_run = 0;
            }
        }
    }

    /// Does `heading` deviate sharply from the sliding average of recent
    /// climb headings?
    fn heading_deviates(&self, heading: f32) -> bool {
        if self.heading_window.is_empty() {
            return false;
        }
        // Circular mean of the window
        let (sin_sum, cos_sum) = self
            .heading_window
            .iter()
            .fold((0.0f32, 0.0f32), |(s, c), h| (s + h.sin(), c + h.cos()));
        let average = sin_sum.atan2(cos_sum);
        angle_diff(average, heading).abs() > self.config.landing_turn_threshold
    }

    fn push_heading(&mut self, heading: f32) {
        self.heading_window.push_back(heading);
        while self.heading_window.len() > self.config.heading_window_size {
            self.heading_window.pop_front();
        }
    }
}
