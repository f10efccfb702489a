//! Pathfinding configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Pathfinding settings section.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PathfindingSection {
    /// Floor grid construction settings
    #[serde(default)]
    pub grid: GridSettings,

    /// A* search settings
    #[serde(default)]
    pub astar: AStarSettings,

    /// Line-of-sight smoothing settings
    #[serde(default)]
    pub smoothing: SmoothingSettings,

    /// Multi-floor routing settings
    #[serde(default)]
    pub routing: RoutingSettings,
}

/// Floor grid and cost model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSettings {
    /// Cell size in meters
    #[serde(default = "defaults::grid_resolution")]
    pub resolution: f32,

    /// Padding added around the wall bounding box (meters)
    #[serde(default = "defaults::grid_padding")]
    pub padding: f32,

    /// Distance below which a cell is hard-blocked (meters)
    #[serde(default = "defaults::block_distance")]
    pub block_distance: f32,

    /// Distance below which a cell falls in the high-cost buffer zone (meters)
    #[serde(default = "defaults::buffer_zone_distance")]
    pub buffer_zone_distance: f32,

    /// Distance below which a cell carries moderate near-wall cost (meters)
    #[serde(default = "defaults::near_wall_distance")]
    pub near_wall_distance: f32,

    /// Cost multiplier inside the buffer zone
    #[serde(default = "defaults::buffer_zone_cost")]
    pub buffer_zone_cost: f32,

    /// Cost multiplier in the moderate near-wall band
    #[serde(default = "defaults::near_wall_cost")]
    pub near_wall_cost: f32,

    /// Cost multiplier in open space
    #[serde(default = "defaults::base_cost")]
    pub base_cost: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            resolution: defaults::grid_resolution(),
            padding: defaults::grid_padding(),
            block_distance: defaults::block_distance(),
            buffer_zone_distance: defaults::buffer_zone_distance(),
            near_wall_distance: defaults::near_wall_distance(),
            buffer_zone_cost: defaults::buffer_zone_cost(),
            near_wall_cost: defaults::near_wall_cost(),
            base_cost: defaults::base_cost(),
        }
    }
}

/// A* search settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AStarSettings {
    /// Cost multiplier for diagonal moves (sqrt(2))
    #[serde(default = "defaults::diagonal_cost")]
    pub diagonal_cost: f32,

    /// Maximum nodes to expand before giving up
    #[serde(default = "defaults::max_iterations")]
    pub max_iterations: usize,

    /// Expanding-ring search radius for snapping endpoints to passable
    /// cells (cells)
    #[serde(default = "defaults::snap_search_radius_cells")]
    pub snap_search_radius_cells: i32,
}

impl Default for AStarSettings {
    fn default() -> Self {
        Self {
            diagonal_cost: defaults::diagonal_cost(),
            max_iterations: defaults::max_iterations(),
            snap_search_radius_cells: defaults::snap_search_radius_cells(),
        }
    }
}

/// Line-of-sight smoothing settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SmoothingSettings {
    /// Sub-step length for visibility sampling (meters)
    #[serde(default = "defaults::los_sample_step")]
    pub sample_step: f32,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            sample_step: defaults::los_sample_step(),
        }
    }
}

/// Multi-floor routing and live route maintenance settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Maximum campus-coordinate distance between paired stair entrances
    /// on adjacent floors (meters)
    #[serde(default = "defaults::stair_pair_max_distance")]
    pub stair_pair_max_distance: f32,

    /// Distance from the nearest waypoint that triggers a reroute (meters)
    #[serde(default = "defaults::reroute_threshold")]
    pub reroute_threshold: f32,

    /// Floor number treated as ground; exterior blocking is skipped there
    #[serde(default = "defaults::ground_floor_number")]
    pub ground_floor_number: i32,

    /// Distance from the final waypoint that counts as arrival (meters)
    #[serde(default = "defaults::arrival_radius")]
    pub arrival_radius: f32,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            stair_pair_max_distance: defaults::stair_pair_max_distance(),
            reroute_threshold: defaults::reroute_threshold(),
            ground_floor_number: defaults::ground_floor_number(),
            arrival_radius: defaults::arrival_radius(),
        }
    }
}
