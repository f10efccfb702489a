//! Error types for marga-nav.

use thiserror::Error;

/// Navigation engine error type.
///
/// Tracking and pathfinding hot paths never fail with these; they degrade
/// to neutral results instead. Errors are raised only by configuration
/// loading and floor data sources.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Floor data error: {0}")]
    FloorData(String),

    #[error("Pathfinding failed: {0}")]
    Pathfinding(#[from] crate::pathfinding::PathFailure),

    #[error("No stair route from floor {from} to floor {to}")]
    NoStairRoute { from: i32, to: i32 },
}

impl From<serde_yaml::Error> for NavError {
    fn from(e: serde_yaml::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
