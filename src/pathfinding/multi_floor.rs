//! Multi-floor routing: lazy grid cache and stairwell-aware pathfinding.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::config::{AStarSettings, GridSettings, RoutingSettings, SmoothingSettings};
use crate::core::CampusPoint;
use crate::error::{NavError, Result};
use crate::floor::{BuildingMetadata, FloorDataSource};
use crate::stairs::StairPair;

use super::astar::{find_path, PathFailure};
use super::grid::FloorGrid;
use super::smoothing::smooth_path;

/// Lazily built, cached cost grids keyed by floor number.
///
/// Grids are immutable once built and shared via `Arc`, so concurrent
/// searches (foreground plus a background reroute) read without copying.
pub struct FloorGridRepository {
    source: Arc<dyn FloorDataSource>,
    metadata: BuildingMetadata,
    grid_settings: GridSettings,
    ground_floor: i32,
    cache: RwLock<HashMap<i32, Arc<FloorGrid>>>,
}

impl FloorGridRepository {
    /// Load the building metadata and prepare an empty cache.
    pub fn new(
        source: Arc<dyn FloorDataSource>,
        grid_settings: GridSettings,
        ground_floor: i32,
    ) -> Result<Self> {
        let metadata = source.load_building_metadata()?;
        info!(
            "[GridRepository] building '{}' with {} floors",
            metadata.building_name,
            metadata.floors.len()
        );
        Ok(Self {
            source,
            metadata,
            grid_settings,
            ground_floor,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn metadata(&self) -> &BuildingMetadata {
        &self.metadata
    }

    /// Grid for one floor, building it on first access.
    pub fn grid_for(&self, floor: i32) -> Result<Arc<FloorGrid>> {
        if let Some(grid) = self.cache.read().get(&floor) {
            return Ok(Arc::clone(grid));
        }

        let info = self
            .metadata
            .floor_by_number(floor)
            .ok_or_else(|| NavError::FloorData(format!("unknown floor number {floor}")))?;
        let plan = self.source.load_floor_plan(&info.id)?;
        let grid = Arc::new(FloorGrid::build(
            &plan,
            &self.grid_settings,
            floor == self.ground_floor,
        ));

        // A racing builder may have inserted first; keep whichever won
        let mut cache = self.cache.write();
        let entry = cache.entry(floor).or_insert(grid);
        Ok(Arc::clone(entry))
    }

    /// Drop all cached grids, forcing rebuilds on next access.
    pub fn invalidate(&self) {
        self.cache.write().clear();
        debug!("[GridRepository] cache invalidated");
    }
}

/// One floor's portion of a multi-floor route.
#[derive(Clone, Debug)]
pub struct FloorPathSegment {
    pub floor: i32,
    /// Smoothed waypoints in campus coordinates
    pub waypoints: Vec<CampusPoint>,
    /// Polyline length in meters
    pub length: f32,
}

/// A complete route, possibly spanning floors via stairwells.
#[derive(Clone, Debug)]
pub struct MultiFloorPath {
    pub segments: Vec<FloorPathSegment>,
    pub total_length: f32,
}

impl MultiFloorPath {
    /// Does this route change floors?
    pub fn crosses_floors(&self) -> bool {
        self.segments.len() > 1
    }

    /// Final waypoint of the route.
    pub fn destination(&self) -> Option<(i32, CampusPoint)> {
        self.segments
            .last()
            .and_then(|s| s.waypoints.last().map(|p| (s.floor, *p)))
    }
}

/// Stairwell-aware pathfinder over the grid repository.
pub struct MultiFloorPathfinder {
    repository: Arc<FloorGridRepository>,
    pairs: Vec<StairPair>,
    astar: AStarSettings,
    smoothing: SmoothingSettings,
    routing: RoutingSettings,
}

impl MultiFloorPathfinder {
    pub fn new(
        repository: Arc<FloorGridRepository>,
        pairs: Vec<StairPair>,
        astar: AStarSettings,
        smoothing: SmoothingSettings,
        routing: RoutingSettings,
    ) -> Self {
        Self {
            repository,
            pairs,
            astar,
            smoothing,
            routing,
        }
    }

    pub fn repository(&self) -> &Arc<FloorGridRepository> {
        &self.repository
    }

    pub fn routing(&self) -> &RoutingSettings {
        &self.routing
    }

    /// Route from a start position/floor to a goal position/floor.
    ///
    /// Same-floor requests are a single searched segment. Cross-floor
    /// requests complete a full route through every candidate stair pair
    /// heading toward the goal floor and return the one with the lowest
    /// total polyline length. A candidate whose later legs are unreachable
    /// (a sealed exit, say) is skipped in favor of the next stairwell.
    pub fn find_multi_floor_path(
        &self,
        start: &CampusPoint,
        start_floor: i32,
        goal: &CampusPoint,
        goal_floor: i32,
        cancel: Option<&AtomicBool>,
    ) -> Result<MultiFloorPath> {
        let segments = self.route_toward_goal(*start, start_floor, goal, goal_floor, cancel)?;
        let total_length = segments.iter().map(|s| s.length).sum();
        info!(
            "[MultiFloor] route found: {} segment(s), {:.1}m total",
            segments.len(),
            total_length
        );
        Ok(MultiFloorPath {
            segments,
            total_length,
        })
    }

    /// Best segment list from `position` on `floor` to the goal.
    ///
    /// The recursion is bounded: every candidate crossing must move
    /// strictly closer to the goal floor. Candidates are compared by
    /// completed route length including the stairwell traversals.
    fn route_toward_goal(
        &self,
        position: CampusPoint,
        floor: i32,
        goal: &CampusPoint,
        goal_floor: i32,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<FloorPathSegment>> {
        let grid = self.repository.grid_for(floor)?;

        if floor == goal_floor {
            let path = find_path(&grid, &position, goal, &self.astar, cancel)?;
            let waypoints = smooth_path(&grid, &path.waypoints, &self.smoothing);
            let length = polyline_length(&waypoints);
            return Ok(vec![FloorPathSegment {
                floor,
                waypoints,
                length,
            }]);
        }

        let mut best: Option<(Vec<FloorPathSegment>, f32)> = None;
        for pair in self.pairs.iter().filter(|p| p.connects(floor)) {
            for direction in [crate::floor::StairDirection::Up, crate::floor::StairDirection::Down]
            {
                let Some((entry, exit, destination)) = pair.crossing_from(floor, direction)
                else {
                    continue;
                };
                if (destination - goal_floor).abs() >= (floor - goal_floor).abs() {
                    continue;
                }
                let path = match find_path(&grid, &position, &entry, &self.astar, cancel) {
                    Ok(path) => path,
                    Err(PathFailure::Cancelled) => return Err(PathFailure::Cancelled.into()),
                    Err(_) => continue,
                };
                let waypoints = smooth_path(&grid, &path.waypoints, &self.smoothing);
                let length = polyline_length(&waypoints);

                let rest = match self.route_toward_goal(exit, destination, goal, goal_floor, cancel)
                {
                    Ok(rest) => rest,
                    Err(NavError::Pathfinding(PathFailure::Cancelled)) => {
                        return Err(PathFailure::Cancelled.into())
                    }
                    // This stairwell dead-ends further along; try the next
                    Err(_) => continue,
                };

                let total = length
                    + entry.distance(&exit)
                    + rest.iter().map(|s| s.length).sum::<f32>();
                if best.as_ref().map_or(true, |(_, bt)| total < *bt) {
                    debug!(
                        "[MultiFloor] floor {} -> {} candidate, {:.1}m total",
                        floor, destination, total
                    );
                    let mut segments = vec![FloorPathSegment {
                        floor,
                        waypoints,
                        length,
                    }];
                    segments.extend(rest);
                    best = Some((segments, total));
                }
            }
        }

        best.map(|(segments, _)| segments)
            .ok_or(NavError::NoStairRoute {
                from: floor,
                to: goal_floor,
            })
    }
}

fn polyline_length(waypoints: &[CampusPoint]) -> f32 {
    waypoints.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Segment;
    use crate::floor::{
        FloorId, FloorInfo, FloorPlan, LocalEntrance, StairDirection, StaticFloorSource,
    };

    fn wall(x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
        Segment::new(CampusPoint::new(x1, y1), CampusPoint::new(x2, y2))
    }

    fn room_walls() -> Vec<Segment> {
        vec![
            wall(0.0, 0.0, 10.0, 0.0),
            wall(10.0, 0.0, 10.0, 10.0),
            wall(10.0, 10.0, 0.0, 10.0),
            wall(0.0, 10.0, 0.0, 0.0),
        ]
    }

    fn stair_entrance(
        id: &str,
        x: f32,
        y: f32,
        direction: StairDirection,
        connected: i32,
    ) -> LocalEntrance {
        LocalEntrance {
            id: id.into(),
            name: id.into(),
            position: CampusPoint::new(x, y),
            stair_direction: Some(direction),
            connected_floor: Some(connected),
        }
    }

    /// Two identical floors joined by one stairwell near (8, 8).
    fn two_floor_source() -> StaticFloorSource {
        let floor1 = FloorPlan {
            id: Some(FloorId::new("f1")),
            floor_number: 1,
            walls: room_walls(),
            entrances: vec![stair_entrance("f1-up", 8.0, 8.0, StairDirection::Up, 2)],
            ..Default::default()
        };
        let floor2 = FloorPlan {
            id: Some(FloorId::new("f2")),
            floor_number: 2,
            walls: room_walls(),
            entrances: vec![stair_entrance("f2-down", 8.2, 8.0, StairDirection::Down, 1)],
            ..Default::default()
        };
        StaticFloorSource {
            metadata: BuildingMetadata {
                building_name: "test".into(),
                floors: vec![
                    FloorInfo {
                        id: FloorId::new("f1"),
                        floor_number: 1,
                        name: "First".into(),
                    },
                    FloorInfo {
                        id: FloorId::new("f2"),
                        floor_number: 2,
                        name: "Second".into(),
                    },
                ],
            },
            plans: vec![floor1, floor2],
        }
    }

    fn test_pairs() -> Vec<StairPair> {
        vec![StairPair {
            bottom_position: CampusPoint::new(8.0, 8.0),
            top_position: CampusPoint::new(8.2, 8.0),
            bottom_floor: 1,
            top_floor: 2,
        }]
    }

    fn pathfinder() -> MultiFloorPathfinder {
        pathfinder_with(two_floor_source(), test_pairs())
    }

    fn pathfinder_with(source: StaticFloorSource, pairs: Vec<StairPair>) -> MultiFloorPathfinder {
        let repository = Arc::new(
            FloorGridRepository::new(Arc::new(source), GridSettings::default(), 0).unwrap(),
        );
        MultiFloorPathfinder::new(
            repository,
            pairs,
            AStarSettings::default(),
            SmoothingSettings::default(),
            RoutingSettings::default(),
        )
    }

    fn source_from_plans(floor1: FloorPlan, floor2: FloorPlan) -> StaticFloorSource {
        StaticFloorSource {
            metadata: BuildingMetadata {
                building_name: "test".into(),
                floors: vec![
                    FloorInfo {
                        id: FloorId::new("f1"),
                        floor_number: 1,
                        name: "First".into(),
                    },
                    FloorInfo {
                        id: FloorId::new("f2"),
                        floor_number: 2,
                        name: "Second".into(),
                    },
                ],
            },
            plans: vec![floor1, floor2],
        }
    }

    fn large_room_walls() -> Vec<Segment> {
        vec![
            wall(0.0, 0.0, 20.0, 0.0),
            wall(20.0, 0.0, 20.0, 20.0),
            wall(20.0, 20.0, 0.0, 20.0),
            wall(0.0, 20.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_same_floor_route() {
        let pf = pathfinder();
        let route = pf
            .find_multi_floor_path(
                &CampusPoint::new(2.0, 2.0),
                1,
                &CampusPoint::new(8.0, 2.0),
                1,
                None,
            )
            .unwrap();
        assert_eq!(route.segments.len(), 1);
        assert!(!route.crosses_floors());
        assert!(route.total_length >= 6.0);
    }

    #[test]
    fn test_cross_floor_route_via_stairwell() {
        let pf = pathfinder();
        let route = pf
            .find_multi_floor_path(
                &CampusPoint::new(2.0, 2.0),
                1,
                &CampusPoint::new(2.0, 2.0),
                2,
                None,
            )
            .unwrap();

        assert_eq!(route.segments.len(), 2);
        assert_eq!(route.segments[0].floor, 1);
        assert_eq!(route.segments[1].floor, 2);
        // First segment ends at the bottom stair entrance, second starts
        // near the top one
        let first_end = *route.segments[0].waypoints.last().unwrap();
        assert!(first_end.distance(&CampusPoint::new(8.0, 8.0)) < 0.5);
        let second_start = route.segments[1].waypoints[0];
        assert!(second_start.distance(&CampusPoint::new(8.2, 8.0)) < 0.5);
    }

    #[test]
    fn test_sealed_exit_falls_back_to_other_stairwell() {
        // Two stairwells join floors 1 and 2. The stairwell nearest the
        // start has its upper exit walled into a closet on floor 2, so
        // only the other one completes a route.
        let floor1 = FloorPlan {
            id: Some(FloorId::new("f1")),
            floor_number: 1,
            walls: large_room_walls(),
            entrances: vec![
                stair_entrance("f1-near-up", 5.0, 5.0, StairDirection::Up, 2),
                stair_entrance("f1-far-up", 16.0, 16.0, StairDirection::Up, 2),
            ],
            ..Default::default()
        };
        let mut floor2_walls = large_room_walls();
        floor2_walls.extend([
            wall(4.0, 4.0, 6.5, 4.0),
            wall(6.5, 4.0, 6.5, 6.0),
            wall(6.5, 6.0, 4.0, 6.0),
            wall(4.0, 6.0, 4.0, 4.0),
        ]);
        let floor2 = FloorPlan {
            id: Some(FloorId::new("f2")),
            floor_number: 2,
            walls: floor2_walls,
            entrances: vec![
                stair_entrance("f2-near-down", 5.2, 5.0, StairDirection::Down, 1),
                stair_entrance("f2-far-down", 16.3, 16.0, StairDirection::Down, 1),
            ],
            ..Default::default()
        };
        let pairs = vec![
            StairPair {
                bottom_position: CampusPoint::new(5.0, 5.0),
                top_position: CampusPoint::new(5.2, 5.0),
                bottom_floor: 1,
                top_floor: 2,
            },
            StairPair {
                bottom_position: CampusPoint::new(16.0, 16.0),
                top_position: CampusPoint::new(16.3, 16.0),
                bottom_floor: 1,
                top_floor: 2,
            },
        ];
        let pf = pathfinder_with(source_from_plans(floor1, floor2), pairs);

        let route = pf
            .find_multi_floor_path(
                &CampusPoint::new(4.0, 5.0),
                1,
                &CampusPoint::new(10.0, 10.0),
                2,
                None,
            )
            .unwrap();

        assert_eq!(route.segments.len(), 2);
        let hand_off = *route.segments[0].waypoints.last().unwrap();
        assert!(
            hand_off.distance(&CampusPoint::new(16.0, 16.0)) < 0.5,
            "route must cross via the open stairwell, got {hand_off:?}"
        );
    }

    #[test]
    fn test_picks_lowest_total_length_not_nearest_entry() {
        // A divider on floor 2 makes the route through the nearer
        // stairwell much longer overall than through the farther one.
        let floor1 = FloorPlan {
            id: Some(FloorId::new("f1")),
            floor_number: 1,
            walls: large_room_walls(),
            entrances: vec![
                stair_entrance("f1-west-up", 6.0, 4.0, StairDirection::Up, 2),
                stair_entrance("f1-east-up", 12.0, 4.0, StairDirection::Up, 2),
            ],
            ..Default::default()
        };
        let mut floor2_walls = large_room_walls();
        floor2_walls.push(wall(8.0, 0.0, 8.0, 16.0));
        let floor2 = FloorPlan {
            id: Some(FloorId::new("f2")),
            floor_number: 2,
            walls: floor2_walls,
            entrances: vec![
                stair_entrance("f2-west-down", 6.2, 4.0, StairDirection::Down, 1),
                stair_entrance("f2-east-down", 12.3, 4.0, StairDirection::Down, 1),
            ],
            ..Default::default()
        };
        let pairs = vec![
            StairPair {
                bottom_position: CampusPoint::new(6.0, 4.0),
                top_position: CampusPoint::new(6.2, 4.0),
                bottom_floor: 1,
                top_floor: 2,
            },
            StairPair {
                bottom_position: CampusPoint::new(12.0, 4.0),
                top_position: CampusPoint::new(12.3, 4.0),
                bottom_floor: 1,
                top_floor: 2,
            },
        ];
        let pf = pathfinder_with(source_from_plans(floor1, floor2), pairs);

        // Start 2m from the west stairwell; goal east of the divider
        let route = pf
            .find_multi_floor_path(
                &CampusPoint::new(4.0, 4.0),
                1,
                &CampusPoint::new(16.0, 4.0),
                2,
                None,
            )
            .unwrap();

        let hand_off = *route.segments[0].waypoints.last().unwrap();
        assert!(
            hand_off.distance(&CampusPoint::new(12.0, 4.0)) < 0.5,
            "east stairwell wins on total length, got {hand_off:?}"
        );
        // West stairwell total would detour around the divider (~30m)
        assert!(route.total_length < 20.0);
    }

    #[test]
    fn test_unreachable_floor_is_error() {
        let pf = pathfinder();
        let result = pf.find_multi_floor_path(
            &CampusPoint::new(2.0, 2.0),
            1,
            &CampusPoint::new(2.0, 2.0),
            5,
            None,
        );
        assert!(matches!(result, Err(NavError::NoStairRoute { .. })));
    }

    #[test]
    fn test_repository_caches_grids() {
        let repository = Arc::new(
            FloorGridRepository::new(
                Arc::new(two_floor_source()),
                GridSettings::default(),
                0,
            )
            .unwrap(),
        );
        let a = repository.grid_for(1).unwrap();
        let b = repository.grid_for(1).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        repository.invalidate();
        let c = repository.grid_for(1).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_unknown_floor_is_error() {
        let repository = FloorGridRepository::new(
            Arc::new(two_floor_source()),
            GridSettings::default(),
            0,
        )
        .unwrap();
        assert!(repository.grid_for(7).is_err());
    }
}
