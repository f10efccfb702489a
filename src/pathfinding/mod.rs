//! Grid construction, A* search, smoothing, and multi-floor routing.

mod astar;
mod grid;
mod multi_floor;
mod route;
mod smoothing;

pub use astar::{find_path, GridPath, PathFailure};
pub use grid::FloorGrid;
pub use multi_floor::{
    FloorGridRepository, FloorPathSegment, MultiFloorPath, MultiFloorPathfinder,
};
pub use route::{RouteTracker, RouteUpdate};
pub use smoothing::smooth_path;
