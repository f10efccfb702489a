//! # Marga-Nav: Indoor Pedestrian Positioning and Navigation
//!
//! A positioning and navigation engine for multi-floor buildings, built on
//! step events (heading + stride) from a pedestrian dead-reckoning source
//! and motion labels from an external activity classifier.
//!
//! ## Components
//!
//! - **Correction pipeline**: buffers raw steps and corrects drift with
//!   turn-triggered entrance snapping, stop-and-slide wall clamping, and
//!   stride recalibration
//! - **Stairwell transitions**: detects stair entries from spatial and
//!   classifier evidence, then animates the crossing between paired
//!   entrances until arrival, turnaround, or cancellation
//! - **Pathfinding**: per-floor cost grids with A* search, line-of-sight
//!   smoothing, stairwell-aware multi-floor routing, and live route
//!   tracking with background reroutes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use marga_nav::{NavConfig, TrackingSession, StepOutcome};
//! use marga_nav::core::CampusPoint;
//! use marga_nav::floor::StaticFloorSource;
//!
//! let source = Arc::new(StaticFloorSource::default());
//! let mut session = TrackingSession::new(source, NavConfig::default()).unwrap();
//! session.set_position(CampusPoint::new(4.0, 2.0), 0.0, 1).unwrap();
//!
//! match session.on_step(0.1, 0.7).unwrap() {
//!     StepOutcome::Tracking { position } => {
//!         println!("at ({:.2}, {:.2})", position.x, position.y);
//!     }
//!     other => println!("{other:?}"),
//! }
//! ```
//!
//! ## Coordinate Frame
//!
//! Every position crossing a component boundary is in the shared campus
//! frame: meters, angles in radians, counter-clockwise positive. Floor
//! plans are placed into it by a scale/rotate/translate transform.
//!
//! ## Modules
//!
//! - [`core`]: points, vectors, angles, segment geometry
//! - [`config`]: YAML-loadable tunables with full defaults
//! - [`floor`]: floor geometry, placement transform, data sources
//! - [`correction`]: the buffered dead-reckoning correction pipeline
//! - [`stairs`]: stair pairing, transition detection, crossing animation
//! - [`pathfinding`]: cost grids, A*, smoothing, multi-floor routes
//! - [`session`]: the per-user tracking facade

pub mod config;
pub mod core;
pub mod correction;
pub mod error;
pub mod floor;
pub mod pathfinding;
pub mod session;
pub mod stairs;

pub use config::NavConfig;
pub use error::{NavError, Result};
pub use pathfinding::{MultiFloorPathfinder, RouteTracker, RouteUpdate};
pub use session::{StepOutcome, TrackingSession};
