//! Buffered dead-reckoning correction pipeline.
//!
//! Turn detection, entrance snapping, wall clamping, and stride
//! recalibration, orchestrated by [`StepCorrectionEngine`].

mod engine;
mod snap;
mod turn;
mod types;
mod wall;

pub use engine::StepCorrectionEngine;
pub use snap::EntranceSnapper;
pub use turn::TurnDetector;
pub use types::{PathPoint, RawStep, SnapResult, StepResult, TurnEvent, WallConstraintResult};
pub use wall::WallConstraint;
