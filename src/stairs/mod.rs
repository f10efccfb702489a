//! Stairwell transitions: pair construction, two-stage detection, and
//! interpolated crossing animation.

mod animator;
mod detector;
mod motion;
mod pairs;

pub use animator::{
    AdvanceOutcome, ArrivalReason, FinalizeOutcome, StairTransitionAnimator, TransitionState,
};
pub use detector::{StairTransitionDetector, StairTransitionEvent};
pub use motion::{MotionLabel, MotionSample};
pub use pairs::{
    build_stair_pairs, nearest_pair_either_end, nearest_pair_on_floor, StairPair,
};
