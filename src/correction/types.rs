//! Data types flowing through the correction pipeline.

use crate::core::{CampusPoint, CampusVector};

/// One uncommitted dead-reckoned step.
///
/// Lives only inside the correction buffer; its position may be rebased
/// several times before it is committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawStep {
    /// Current estimate of where this step landed
    pub position: CampusPoint,
    /// Corrected heading used to chain this step
    pub heading: f32,
    /// Stride length of this step (meters)
    pub stride_length: f32,
    /// Monotonic step counter at the time the step was taken
    pub timestamp: u64,
}

/// A committed point on the walked path. Immutable once committed, except
/// for retroactive snap smoothing which nudges recent history in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPoint {
    pub position: CampusPoint,
    pub heading: f32,
}

/// A detected heading change inside the correction buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnEvent {
    /// Index of the pivot step inside the buffer
    pub buffer_index: usize,
    /// Heading before the buffer (committed context)
    pub pre_heading: f32,
    /// Heading at the pivot step
    pub post_heading: f32,
    /// Signed heading change from pre to post
    pub heading_delta: f32,
    /// Dead-reckoned position where the turn occurred (start of the pivot
    /// step)
    pub position: CampusPoint,
}

/// Outcome of an accepted entrance snap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapResult {
    /// Position the turn step was moved to
    pub snapped_position: CampusPoint,
    /// Correction vector from the dead-reckoned position to the entrance
    pub correction: CampusVector,
    /// Signed stride calibration nudge, clamped to ±max_stride_adjustment.
    /// Positive means the stride was underestimated.
    pub stride_adjustment: f32,
}

/// Outcome of constraining one movement against the walls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallConstraintResult {
    /// Final constrained position
    pub position: CampusPoint,
    /// Whether any wall altered the movement
    pub was_constrained: bool,
    /// Heading nudge toward the corridor direction (radians)
    pub heading_correction: f32,
}

/// Result of processing one step through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    /// Points committed by this call (usually zero or one; `flush` commits
    /// the whole tail)
    pub committed: Vec<PathPoint>,
    /// Current best position, possibly still buffered and uncommitted
    pub position: CampusPoint,
    /// Accumulated heading correction applied to future raw headings
    pub heading_correction: f32,
    /// Exponentially smoothed stride calibration factor (1.0 = no change)
    pub stride_factor: f32,
}
