//! Two-stage stairwell transition detector.
//!
//! Path 1 combines spatial evidence (a stair entrance inside a proximity
//! radius and a field-of-view cone around a lagged heading) with a sliding
//! window of classifier labels. The spatial match latches a candidate that
//! outlives proximity by a few steps, bridging classifier latency.
//!
//! Path 2 is a proximity-only fallback keyed on a sustained run of
//! identical stair labels, for users who enter a stairwell from an angle
//! the field-of-view check rejects.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::config::StairDetectionConfig;
use crate::core::{angle_diff, CampusPoint};
use crate::floor::StairDirection;

use super::motion::{MotionLabel, MotionSample};
use super::pairs::{nearest_pair_either_end, nearest_pair_on_floor, StairPair};

/// A transition attempt, handed to the animator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StairTransitionEvent {
    pub direction: StairDirection,
    /// Entrance position on the origin floor
    pub start_position: CampusPoint,
    /// Entrance position on the destination floor
    pub end_position: CampusPoint,
    pub origin_floor: i32,
    pub destination_floor: i32,
    /// Steps elapsed since the first detection signal, for lag compensation
    pub pre_climbed_steps: usize,
}

/// A provisionally matched stair entrance that persists briefly without
/// fresh confirmation.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    pair_index: usize,
    direction: StairDirection,
    hold_remaining: usize,
    first_signal_step: u64,
}

/// Detects stairwell entries from position, heading, and classifier labels.
pub struct StairTransitionDetector {
    config: StairDetectionConfig,
    pairs: Vec<StairPair>,
    heading_history: VecDeque<f32>,
    /// Confidence-gated recent labels
    label_window: VecDeque<MotionLabel>,
    candidate: Option<Candidate>,
    /// Direction, run length, and start step of the current identical-label run
    sustained: Option<(StairDirection, usize, u64)>,
    step_count: u64,
}

impl StairTransitionDetector {
    /// Create a detector over the campus stair pairs.
    pub fn new(config: StairDetectionConfig, pairs: Vec<StairPair>) -> Self {
        Self {
            config,
            pairs,
            heading_history: VecDeque::new(),
            label_window: VecDeque::new(),
            candidate: None,
            sustained: None,
            step_count: 0,
        }
    }

    /// Replace the stair pairs (campus reload).
    pub fn set_pairs(&mut self, pairs: Vec<StairPair>) {
        self.pairs = pairs;
        self.reset();
    }

    /// Swap in a new configuration.
    pub fn set_config(&mut self, config: StairDetectionConfig) {
        self.config = config;
    }

    /// Feed one classifier output. Below-threshold samples are dropped
    /// before touching any window or counter.
    pub fn on_motion_sample(&mut self, sample: MotionSample) {
        if !sample.passes(self.config.confidence_threshold) {
            return;
        }

        self.label_window.push_back(sample.label);
        while self.label_window.len() > self.config.label_window_size {
            self.label_window.pop_front();
        }

        match sample.label.stair_direction() {
            Some(direction) => {
                self.sustained = match self.sustained {
                    Some((d, run, first)) if d == direction => Some((d, run + 1, first)),
                    _ => Some((direction, 1, self.step_count)),
                };
            }
            None => self.sustained = None,
        }
    }

    /// Path 1: spatial + classifier detection, called once per step.
    pub fn check_transition(
        &mut self,
        position: &CampusPoint,
        heading: f32,
        floor: i32,
    ) -> Option<StairTransitionEvent> {
        self.step_count += 1;
        self.heading_history.push_back(heading);
        while self.heading_history.len() > self.config.heading_lag_steps + 1 {
            self.heading_history.pop_front();
        }
        let lagged_heading = *self.heading_history.front().unwrap_or(&heading);

        match self.spatial_match(position, lagged_heading, floor) {
            Some((pair_index, direction)) => {
                let first_signal_step = match self.candidate {
                    Some(c) if c.pair_index == pair_index && c.direction == direction => {
                        c.first_signal_step
                    }
                    _ => self.step_count,
                };
                self.candidate = Some(Candidate {
                    pair_index,
                    direction,
                    hold_remaining: self.config.candidate_hold_steps,
                    first_signal_step,
                });
            }
            None => {
                // Latch: the candidate outlives proximity for a few steps
                if let Some(c) = self.candidate.as_mut() {
                    if c.hold_remaining == 0 {
                        trace!("[StairDetector] candidate expired");
                        self.candidate = None;
                    } else {
                        c.hold_remaining -= 1;
                    }
                }
            }
        }

        let candidate = self.candidate?;
        let matches = self
            .label_window
            .iter()
            .filter(|l| l.matches_direction(candidate.direction))
            .count();
        if matches < self.config.label_matches_required {
            return None;
        }

        let pair = &self.pairs[candidate.pair_index];
        let (start, end, destination) = pair.crossing_from(floor, candidate.direction)?;
        let event = StairTransitionEvent {
            direction: candidate.direction,
            start_position: start,
            end_position: end,
            origin_floor: floor,
            destination_floor: destination,
            pre_climbed_steps: (self.step_count - candidate.first_signal_step) as usize,
        };

        debug!(
            "[StairDetector] transition {:?} {} -> {} ({} pre-climbed)",
            event.direction, event.origin_floor, event.destination_floor, event.pre_climbed_steps
        );
        self.candidate = None;
        self.label_window.clear();
        Some(event)
    }

    /// Path 2: sustained-label fallback, proximity only.
    pub fn check_sustained_transition(
        &mut self,
        position: &CampusPoint,
        floor: i32,
    ) -> Option<StairTransitionEvent> {
        let (direction, run, first_signal_step) = self.sustained?;
        if run < self.config.sustained_run_threshold {
            return None;
        }

        let radius = self.config.expanded_radius;
        let pair = nearest_pair_on_floor(&self.pairs, position, floor, direction, radius)
            .or_else(|| nearest_pair_either_end(&self.pairs, position, floor, radius))?;

        let (start, end, destination) = pair
            .crossing_from(floor, direction)
            .or_else(|| self.either_end_crossing(pair, floor))?;

        // The either-end fallback can resolve against the label run (an
        // "upstairs" run at a pair's top entrance only has a downward
        // crossing); the event reports the actual floor movement
        let direction = if destination > floor {
            StairDirection::Up
        } else {
            StairDirection::Down
        };

        let event = StairTransitionEvent {
            direction,
            start_position: start,
            end_position: end,
            origin_floor: floor,
            destination_floor: destination,
            pre_climbed_steps: (self.step_count.saturating_sub(first_signal_step)) as usize,
        };

        debug!(
            "[StairDetector] sustained transition {:?} {} -> {} (run {})",
            event.direction, event.origin_floor, event.destination_floor, run
        );
        self.sustained = None;
        self.label_window.clear();
        Some(event)
    }

    /// Clear all counters, windows, and candidates. Must be called after a
    /// transition resolves so the next one can be detected on the new floor.
    pub fn reset(&mut self) {
        self.heading_history.clear();
        self.label_window.clear();
        self.candidate = None;
        self.sustained = None;
    }

    /// Nearest stair entrance on `floor` inside the proximity radius and
    /// field-of-view cone. Up candidates win over down when both qualify.
    fn spatial_match(
        &self,
        position: &CampusPoint,
        lagged_heading: f32,
        floor: i32,
    ) -> Option<(usize, StairDirection)> {
        for direction in [StairDirection::Up, StairDirection::Down] {
            let best = self
                .pairs
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.entry_on(floor, direction).map(|entry| (i, entry)))
                .filter(|(_, entry)| entry.distance(position) <= self.config.proximity_radius)
                .filter(|(_, entry)| {
                    let bearing = position.angle_to(entry);
                    angle_diff(lagged_heading, bearing).abs() <= self.config.fov_half_angle
                })
                .min_by(|(_, a), (_, b)| {
                    let da = a.distance_squared(position);
                    let db = b.distance_squared(position);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some((index, _)) = best {
                return Some((index, direction));
            }
        }
        None
    }

    /// Crossing via whichever end of `pair` lies on `floor`, for the
    /// either-end fallback.
    fn either_end_crossing(
        &self,
        pair: &StairPair,
        floor: i32,
    ) -> Option<(CampusPoint, CampusPoint, i32)> {
        if pair.bottom_floor == floor {
            Some((pair.bottom_position, pair.top_position, pair.top_floor))
        } else if pair.top_floor == floor {
            Some((pair.top_position, pair.bottom_position, pair.bottom_floor))
        } else {
            None
        }
    }
}
