//! A* search over a floor grid.
//!
//! 8-connected with octile heuristic and cost multipliers from the grid.
//! Diagonal moves are rejected when either adjacent cardinal cell is
//! blocked, so paths never cut through wall corners.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use log::{debug, trace};
use thiserror::Error;

use crate::config::AStarSettings;
use crate::core::{CampusPoint, GridCoord};

use super::grid::FloorGrid;

/// Why a search produced no path.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathFailure {
    #[error("start position has no passable cell nearby")]
    StartBlocked,
    #[error("goal position has no passable cell nearby")]
    GoalBlocked,
    #[error("iteration limit reached before the goal")]
    IterationLimit,
    #[error("no connected path between start and goal")]
    NoPath,
    #[error("search cancelled")]
    Cancelled,
}

/// A found path on one floor.
#[derive(Clone, Debug)]
pub struct GridPath {
    /// Waypoints in campus coordinates, start to goal inclusive
    pub waypoints: Vec<CampusPoint>,
    /// The underlying grid cells
    pub cells: Vec<GridCoord>,
    /// Accumulated traversal cost
    pub cost: f32,
    /// Nodes expanded during the search
    pub nodes_expanded: usize,
}

impl GridPath {
    /// Total polyline length in meters.
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

#[derive(Clone, Debug)]
struct SearchNode {
    coord: GridCoord,
    g_cost: f32,
    f_cost: f32,
}

impl Eq for SearchNode {}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a path between two campus points on one floor.
///
/// Both endpoints are snapped to the nearest passable cell first. `cancel`
/// is checked every iteration so a background search can be abandoned.
pub fn find_path(
    grid: &FloorGrid,
    start: &CampusPoint,
    goal: &CampusPoint,
    settings: &AStarSettings,
    cancel: Option<&AtomicBool>,
) -> Result<GridPath, PathFailure> {
    let start_cell = grid
        .snap_to_passable(&grid.to_grid(start), settings.snap_search_radius_cells)
        .ok_or(PathFailure::StartBlocked)?;
    let goal_cell = grid
        .snap_to_passable(&grid.to_grid(goal), settings.snap_search_radius_cells)
        .ok_or(PathFailure::GoalBlocked)?;

    let resolution = grid.resolution();
    let heuristic = |c: &GridCoord| -> f32 {
        let dx = (c.x - goal_cell.x).abs() as f32;
        let dy = (c.y - goal_cell.y).abs() as f32;
        // Octile distance
        resolution * (dx.max(dy) + (settings.diagonal_cost - 1.0) * dx.min(dy))
    };

    let mut open = BinaryHeap::new();
    let mut g_scores: HashMap<GridCoord, f32> = HashMap::new();
    let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();

    g_scores.insert(start_cell, 0.0);
    open.push(SearchNode {
        coord: start_cell,
        g_cost: 0.0,
        f_cost: heuristic(&start_cell),
    });

    let mut nodes_expanded = 0;
    while let Some(node) = open.pop() {
        if let Some(flag) = cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                trace!("[AStar] cancelled after {nodes_expanded} nodes");
                return Err(PathFailure::Cancelled);
            }
        }

        // Stale heap entry, a cheaper route to this cell was already expanded
        if node.g_cost > g_scores.get(&node.coord).copied().unwrap_or(f32::INFINITY) {
            continue;
        }

        if node.coord == goal_cell {
            let cells = reconstruct(&came_from, goal_cell);
            let mut waypoints: Vec<CampusPoint> =
                cells.iter().map(|c| grid.to_world(c)).collect();
            // Exact endpoints instead of snapped cell centers
            if let Some(first) = waypoints.first_mut() {
                *first = *start;
            }
            if let Some(last) = waypoints.last_mut() {
                *last = *goal;
            }
            debug!(
                "[AStar] path found: {} cells, cost {:.1}, {} expanded",
                cells.len(),
                node.g_cost,
                nodes_expanded
            );
            return Ok(GridPath {
                waypoints,
                cells,
                cost: node.g_cost,
                nodes_expanded,
            });
        }

        nodes_expanded += 1;
        if nodes_expanded > settings.max_iterations {
            debug!("[AStar] iteration limit {} reached", settings.max_iterations);
            return Err(PathFailure::IterationLimit);
        }

        let neighbors = node.coord.neighbors_8();
        for (i, neighbor) in neighbors.iter().enumerate() {
            if !grid.is_passable(neighbor) {
                continue;
            }
            // Corner-cut prevention: a diagonal move needs both adjacent
            // cardinal cells to be passable
            if i >= 4 {
                let side_a = neighbors[i - 4];
                let side_b = neighbors[(i - 3) % 4];
                if !grid.is_passable(&side_a) || !grid.is_passable(&side_b) {
                    continue;
                }
            }

            let step = if i < 4 {
                resolution
            } else {
                resolution * settings.diagonal_cost
            };
            let tentative = node.g_cost + step * grid.cost(neighbor);
            if tentative < g_scores.get(neighbor).copied().unwrap_or(f32::INFINITY) {
                g_scores.insert(*neighbor, tentative);
                came_from.insert(*neighbor, node.coord);
                open.push(SearchNode {
                    coord: *neighbor,
                    g_cost: tentative,
                    f_cost: tentative + heuristic(neighbor),
                });
            }
        }
    }

    debug!("[AStar] open set exhausted after {nodes_expanded} nodes");
    Err(PathFailure::NoPath)
}

fn reconstruct(came_from: &HashMap<GridCoord, GridCoord>, goal: GridCoord) -> Vec<GridCoord> {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridSettings;
    use crate::core::Segment;
    use crate::floor::FloorPlan;

    fn wall(x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
        Segment::new(CampusPoint::new(x1, y1), CampusPoint::new(x2, y2))
    }

    fn empty_room() -> FloorGrid {
        let plan = FloorPlan {
            floor_number: 1,
            walls: vec![
                wall(0.0, 0.0, 10.0, 0.0),
                wall(10.0, 0.0, 10.0, 10.0),
                wall(10.0, 10.0, 0.0, 10.0),
                wall(0.0, 10.0, 0.0, 0.0),
            ],
            ..Default::default()
        };
        FloorGrid::build(&plan, &GridSettings::default(), true)
    }

    fn divided_room() -> FloorGrid {
        // Wall across the middle with a gap on the right
        let plan = FloorPlan {
            floor_number: 1,
            walls: vec![
                wall(0.0, 0.0, 10.0, 0.0),
                wall(10.0, 0.0, 10.0, 10.0),
                wall(10.0, 10.0, 0.0, 10.0),
                wall(0.0, 10.0, 0.0, 0.0),
                wall(0.0, 5.0, 8.0, 5.0),
            ],
            ..Default::default()
        };
        FloorGrid::build(&plan, &GridSettings::default(), true)
    }

    #[test]
    fn test_straight_path_in_empty_room() {
        let grid = empty_room();
        let start = CampusPoint::new(2.0, 2.0);
        let goal = CampusPoint::new(8.0, 8.0);
        let path = find_path(&grid, &start, &goal, &AStarSettings::default(), None).unwrap();

        assert_eq!(*path.waypoints.first().unwrap(), start);
        assert_eq!(*path.waypoints.last().unwrap(), goal);
        // Octile-optimal length for a pure diagonal, with slack for the
        // cost bands near the boundary walls
        assert!(path.length() < start.distance(&goal) * 1.3);
    }

    #[test]
    fn test_path_goes_around_dividing_wall() {
        let grid = divided_room();
        let start = CampusPoint::new(2.0, 2.5);
        let goal = CampusPoint::new(2.0, 7.5);
        let path = find_path(&grid, &start, &goal, &AStarSettings::default(), None).unwrap();

        // Must detour through the gap at x > 8
        assert!(path.waypoints.iter().any(|p| p.x > 7.5));
        // Consecutive cells stay 8-connected
        for pair in path.cells.windows(2) {
            assert!(pair[0].chebyshev_distance(&pair[1]) == 1);
        }
    }

    #[test]
    fn test_no_path_when_fully_sealed() {
        let plan = FloorPlan {
            floor_number: 1,
            walls: vec![
                wall(0.0, 0.0, 10.0, 0.0),
                wall(10.0, 0.0, 10.0, 10.0),
                wall(10.0, 10.0, 0.0, 10.0),
                wall(0.0, 10.0, 0.0, 0.0),
                // Sealed divider
                wall(0.0, 5.0, 10.0, 5.0),
            ],
            ..Default::default()
        };
        let grid = FloorGrid::build(&plan, &GridSettings::default(), true);
        // Both endpoints deep in their halves so snapping cannot hop the wall
        let result = find_path(
            &grid,
            &CampusPoint::new(5.0, 2.5),
            &CampusPoint::new(5.0, 7.5),
            &AStarSettings {
                snap_search_radius_cells: 4,
                ..Default::default()
            },
            None,
        );
        assert_eq!(result.unwrap_err(), PathFailure::NoPath);
    }

    #[test]
    fn test_endpoints_snapped_out_of_walls() {
        let grid = empty_room();
        // Start exactly on the left wall
        let path = find_path(
            &grid,
            &CampusPoint::new(0.0, 5.0),
            &CampusPoint::new(5.0, 5.0),
            &AStarSettings::default(),
            None,
        )
        .unwrap();
        assert!(grid.is_passable(path.cells.first().unwrap()));
    }

    #[test]
    fn test_cancellation() {
        let grid = divided_room();
        let cancel = AtomicBool::new(true);
        let result = find_path(
            &grid,
            &CampusPoint::new(2.0, 2.5),
            &CampusPoint::new(2.0, 7.5),
            &AStarSettings::default(),
            Some(&cancel),
        );
        assert_eq!(result.unwrap_err(), PathFailure::Cancelled);
    }

    #[test]
    fn test_iteration_limit() {
        let grid = divided_room();
        let result = find_path(
            &grid,
            &CampusPoint::new(2.0, 2.5),
            &CampusPoint::new(2.0, 7.5),
            &AStarSettings {
                max_iterations: 3,
                ..Default::default()
            },
            None,
        );
        assert_eq!(result.unwrap_err(), PathFailure::IterationLimit);
    }

    #[test]
    fn test_matches_brute_force_on_small_grid() {
        // Uniform-cost search as ground truth for optimal cost
        let grid = divided_room();
        let settings = AStarSettings::default();
        let start = CampusPoint::new(2.0, 2.5);
        let goal = CampusPoint::new(2.0, 7.5);
        let path = find_path(&grid, &start, &goal, &settings, None).unwrap();

        let start_cell = grid
            .snap_to_passable(&grid.to_grid(&start), settings.snap_search_radius_cells)
            .unwrap();
        let goal_cell = grid
            .snap_to_passable(&grid.to_grid(&goal), settings.snap_search_radius_cells)
            .unwrap();
        let optimal = dijkstra_cost(&grid, start_cell, goal_cell, &settings);
        assert!((path.cost - optimal).abs() < 1e-3, "A* cost must be optimal");
    }

    /// Plain Dijkstra over the same movement rules.
    fn dijkstra_cost(
        grid: &FloorGrid,
        start: GridCoord,
        goal: GridCoord,
        settings: &AStarSettings,
    ) -> f32 {
        let mut dist: HashMap<GridCoord, f32> = HashMap::new();
        let mut heap = BinaryHeap::new();
        dist.insert(start, 0.0);
        heap.push(SearchNode {
            coord: start,
            g_cost: 0.0,
            f_cost: 0.0,
        });

        while let Some(node) = heap.pop() {
            if node.coord == goal {
                return node.g_cost;
            }
            if node.g_cost > dist.get(&node.coord).copied().unwrap_or(f32::INFINITY) {
                continue;
            }
            let neighbors = node.coord.neighbors_8();
            for (i, neighbor) in neighbors.iter().enumerate() {
                if !grid.is_passable(neighbor) {
                    continue;
                }
                if i >= 4
                    && (!grid.is_passable(&neighbors[i - 4])
                        || !grid.is_passable(&neighbors[(i - 3) % 4]))
                {
                    continue;
                }
                let step = if i < 4 {
                    grid.resolution()
                } else {
                    grid.resolution() * settings.diagonal_cost
                };
                let d = node.g_cost + step * grid.cost(neighbor);
                if d < dist.get(neighbor).copied().unwrap_or(f32::INFINITY) {
                    dist.insert(*neighbor, d);
                    heap.push(SearchNode {
                        coord: *neighbor,
                        g_cost: d,
                        f_cost: d,
                    });
                }
            }
        }
        f32::INFINITY
    }
}
