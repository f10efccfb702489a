//! Motion classifier labels and confidence gating.
//!
//! The classifier delivers one `(label, confidence)` pair per inference
//! window. Below-threshold samples are dropped in one place, before any
//! counter or sliding window sees them; low confidence is "no signal",
//! never a negative label.

use serde::{Deserialize, Serialize};

use crate::floor::StairDirection;

/// Motion class reported by the external classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionLabel {
    Walking,
    Upstairs,
    Downstairs,
    Idle,
    Unknown,
}

impl MotionLabel {
    /// Stair direction this label indicates, if any.
    #[inline]
    pub fn stair_direction(&self) -> Option<StairDirection> {
        match self {
            MotionLabel::Upstairs => Some(StairDirection::Up),
            MotionLabel::Downstairs => Some(StairDirection::Down),
            _ => None,
        }
    }

    /// Is this a stair label in the given direction?
    #[inline]
    pub fn matches_direction(&self, direction: StairDirection) -> bool {
        self.stair_direction() == Some(direction)
    }
}

/// One classifier output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub label: MotionLabel,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

impl MotionSample {
    pub fn new(label: MotionLabel, confidence: f32) -> Self {
        Self { label, confidence }
    }

    /// Does this sample clear the confidence gate?
    #[inline]
    pub fn passes(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}
