//! Per-floor cost grid.
//!
//! Built once per floor from the campus-transformed walls and boundary
//! polygons, then shared read-only between searches. Cells carry a cost
//! multiplier derived from a brushfire distance field: hard-blocked at the
//! walls, expensive in a buffer band, moderate in a near-wall band, cheap
//! in open space.

use std::collections::VecDeque;

use log::debug;

use crate::config::GridSettings;
use crate::core::{CampusPoint, GridCoord, Segment};
use crate::floor::FloorPlan;

/// Cost grid for one floor in campus coordinates.
#[derive(Clone, Debug)]
pub struct FloorGrid {
    floor_number: i32,
    width: usize,
    height: usize,
    /// Cell size in meters
    resolution: f32,
    /// Campus coordinate of the grid's lower-left corner
    origin: CampusPoint,
    /// Hard-blocked cells (walls, out-of-boundary)
    blocked: Vec<bool>,
    /// Cost multiplier per cell; `INFINITY` where blocked
    cost: Vec<f32>,
    /// Distance to the nearest wall in meters
    distance_field: Vec<f32>,
    /// Clearance below which smoothing refuses to cut a corner
    buffer_zone_distance: f32,
}

impl FloorGrid {
    /// Build the grid for one floor.
    ///
    /// `is_ground_floor` disables boundary-polygon blocking so routes may
    /// leave the building outline at ground level.
    pub fn build(plan: &FloorPlan, settings: &GridSettings, is_ground_floor: bool) -> Self {
        let walls: Vec<Segment> = plan
            .walls
            .iter()
            .map(|w| Segment::new(plan.transform.apply(w.start), plan.transform.apply(w.end)))
            .collect();
        let boundaries: Vec<Vec<CampusPoint>> = plan
            .boundaries
            .iter()
            .map(|poly| poly.iter().map(|p| plan.transform.apply(*p)).collect())
            .collect();

        let (min, max) = bounding_box(&walls, &boundaries, settings.padding);
        let resolution = settings.resolution;
        let width = (((max.x - min.x) / resolution).ceil() as usize).max(1);
        let height = (((max.y - min.y) / resolution).ceil() as usize).max(1);
        let total = width * height;

        let mut grid = Self {
            floor_number: plan.floor_number,
            width,
            height,
            resolution,
            origin: min,
            blocked: vec![false; total],
            cost: vec![settings.base_cost; total],
            distance_field: vec![f32::MAX; total],
            buffer_zone_distance: settings.buffer_zone_distance,
        };

        grid.rasterize_walls(&walls);
        grid.compute_distance_field();
        if !is_ground_floor {
            grid.block_outside_boundaries(&boundaries);
        }
        grid.assign_costs(settings);

        debug!(
            "[FloorGrid] floor {} built {}x{} cells at {:.2}m ({} walls)",
            plan.floor_number,
            width,
            height,
            resolution,
            walls.len()
        );
        grid
    }

    /// Floor number this grid belongs to.
    #[inline]
    pub fn floor_number(&self) -> i32 {
        self.floor_number
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Campus position of a cell center.
    #[inline]
    pub fn to_world(&self, coord: &GridCoord) -> CampusPoint {
        CampusPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    /// Cell containing a campus position. May be out of bounds.
    #[inline]
    pub fn to_grid(&self, point: &CampusPoint) -> GridCoord {
        GridCoord::new(
            ((point.x - self.origin.x) / self.resolution).floor() as i32,
            ((point.y - self.origin.y) / self.resolution).floor() as i32,
        )
    }

    #[inline]
    pub fn in_bounds(&self, coord: &GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Can this cell be entered at all?
    #[inline]
    pub fn is_passable(&self, coord: &GridCoord) -> bool {
        self.in_bounds(coord) && !self.blocked[self.index(coord)]
    }

    /// Cost multiplier; `INFINITY` for blocked or out-of-bounds cells.
    #[inline]
    pub fn cost(&self, coord: &GridCoord) -> f32 {
        if self.in_bounds(coord) {
            self.cost[self.index(coord)]
        } else {
            f32::INFINITY
        }
    }

    /// Distance to the nearest wall in meters.
    #[inline]
    pub fn clearance(&self, coord: &GridCoord) -> f32 {
        if self.in_bounds(coord) {
            self.distance_field[self.index(coord)]
        } else {
            0.0
        }
    }

    /// Is this campus point safe for a smoothed path to pass through?
    ///
    /// Stricter than passability: the point must also clear the wall
    /// buffer band, so smoothing never trades a detour for a wall graze.
    pub fn clear_for_smoothing(&self, point: &CampusPoint) -> bool {
        let coord = self.to_grid(point);
        self.is_passable(&coord) && self.clearance(&coord) >= self.buffer_zone_distance
    }

    /// Nearest passable cell to `coord`, searched in expanding Chebyshev
    /// rings up to `max_radius` cells.
    pub fn snap_to_passable(&self, coord: &GridCoord, max_radius: i32) -> Option<GridCoord> {
        if self.is_passable(coord) {
            return Some(*coord);
        }

        for radius in 1..=max_radius {
            let mut best: Option<(GridCoord, f32)> = None;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue; // Interior already searched in earlier rings
                    }
                    let candidate = GridCoord::new(coord.x + dx, coord.y + dy);
                    if !self.is_passable(&candidate) {
                        continue;
                    }
                    let d = self.to_world(&candidate).distance_squared(&self.to_world(coord));
                    if best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((candidate, d));
                    }
                }
            }
            if let Some((found, _)) = best {
                return Some(found);
            }
        }
        None
    }

    #[inline]
    fn index(&self, coord: &GridCoord) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }

    /// Mark every cell a wall segment passes through.
    fn rasterize_walls(&mut self, walls: &[Segment]) {
        let sample_step = self.resolution * 0.5;
        for wall in walls {
            let length = wall.length();
            let samples = ((length / sample_step).ceil() as usize).max(1);
            for i in 0..=samples {
                let t = i as f32 / samples as f32;
                let point = wall.start.lerp(&wall.end, t);
                let coord = self.to_grid(&point);
                if self.in_bounds(&coord) {
                    let idx = self.index(&coord);
                    self.blocked[idx] = true;
                    self.distance_field[idx] = 0.0;
                }
            }
        }
    }

    /// Brushfire wavefront from the wall cells, relaxing 8-neighbors.
    fn compute_distance_field(&mut self) {
        let cardinal = self.resolution;
        let diagonal = self.resolution * std::f32::consts::SQRT_2;

        let mut queue: VecDeque<GridCoord> = VecDeque::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let coord = GridCoord::new(x, y);
                if self.distance_field[self.index(&coord)] == 0.0 {
                    queue.push_back(coord);
                }
            }
        }

        while let Some(coord) = queue.pop_front() {
            let here = self.distance_field[self.index(&coord)];
            for (i, neighbor) in coord.neighbors_8().into_iter().enumerate() {
                if !self.in_bounds(&neighbor) {
                    continue;
                }
                let step = if i < 4 { cardinal } else { diagonal };
                let candidate = here + step;
                let idx = self.index(&neighbor);
                if candidate < self.distance_field[idx] {
                    self.distance_field[idx] = candidate;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    /// Block cells that fall outside every supplied boundary polygon.
    ///
    /// A floor may carry several disjoint polygons (separate buildings on
    /// the campus); a cell inside any one of them counts as indoors.
    fn block_outside_boundaries(&mut self, boundaries: &[Vec<CampusPoint>]) {
        let polygons: Vec<&[CampusPoint]> = boundaries
            .iter()
            .filter(|b| b.len() >= 3)
            .map(Vec::as_slice)
            .collect();
        if polygons.is_empty() {
            return;
        }

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let coord = GridCoord::new(x, y);
                let center = self.to_world(&coord);
                if !polygons.iter().any(|p| point_in_polygon(&center, p)) {
                    let idx = self.index(&coord);
                    self.blocked[idx] = true;
                }
            }
        }
    }

    fn assign_costs(&mut self, settings: &GridSettings) {
        for idx in 0..self.blocked.len() {
            let distance = self.distance_field[idx];
            if self.blocked[idx] || distance < settings.block_distance {
                self.blocked[idx] = true;
                self.cost[idx] = f32::INFINITY;
            } else if distance < settings.buffer_zone_distance {
                self.cost[idx] = settings.buffer_zone_cost;
            } else if distance < settings.near_wall_distance {
                self.cost[idx] = settings.near_wall_cost;
            } else {
                self.cost[idx] = settings.base_cost;
            }
        }
    }
}

/// Bounding box over wall endpoints and boundary vertices, padded.
///
/// Falls back to a small area around the origin when the floor has no
/// geometry at all.
fn bounding_box(
    walls: &[Segment],
    boundaries: &[Vec<CampusPoint>],
    padding: f32,
) -> (CampusPoint, CampusPoint) {
    let points = walls
        .iter()
        .flat_map(|w| [w.start, w.end])
        .chain(boundaries.iter().flatten().copied());

    let mut min = CampusPoint::new(f32::MAX, f32::MAX);
    let mut max = CampusPoint::new(f32::MIN, f32::MIN);
    let mut any = false;
    for p in points {
        any = true;
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    if !any {
        min = CampusPoint::new(-5.0, -5.0);
        max = CampusPoint::new(5.0, 5.0);
    }

    (
        CampusPoint::new(min.x - padding, min.y - padding),
        CampusPoint::new(max.x + padding, max.y + padding),
    )
}

/// Ray-casting point-in-polygon test.
fn point_in_polygon(point: &CampusPoint, polygon: &[CampusPoint]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor::FloorPlan;

    fn wall(x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
        Segment::new(CampusPoint::new(x1, y1), CampusPoint::new(x2, y2))
    }

    /// 10x10m room with one interior wall from (5,0) to (5,6).
    fn room_plan() -> FloorPlan {
        FloorPlan {
            floor_number: 1,
            walls: vec![
                wall(0.0, 0.0, 10.0, 0.0),
                wall(10.0, 0.0, 10.0, 10.0),
                wall(10.0, 10.0, 0.0, 10.0),
                wall(0.0, 10.0, 0.0, 0.0),
                wall(5.0, 0.0, 5.0, 6.0),
            ],
            ..Default::default()
        }
    }

    fn grid() -> FloorGrid {
        FloorGrid::build(&room_plan(), &GridSettings::default(), true)
    }

    #[test]
    fn test_wall_cells_blocked() {
        let g = grid();
        let on_wall = g.to_grid(&CampusPoint::new(5.0, 3.0));
        assert!(!g.is_passable(&on_wall));
        assert!(g.cost(&on_wall).is_infinite());
    }

    #[test]
    fn test_open_space_base_cost() {
        let g = grid();
        let open = g.to_grid(&CampusPoint::new(2.5, 5.0));
        assert!(g.is_passable(&open));
        assert_eq!(g.cost(&open), GridSettings::default().base_cost);
    }

    #[test]
    fn test_cost_bands_ordered() {
        let g = grid();
        let settings = GridSettings::default();
        // 0.4m from the interior wall: buffer band
        let buffered = g.to_grid(&CampusPoint::new(5.4, 3.0));
        // 0.9m from the interior wall: near-wall band
        let near = g.to_grid(&CampusPoint::new(5.9, 3.0));
        assert_eq!(g.cost(&buffered), settings.buffer_zone_cost);
        assert_eq!(g.cost(&near), settings.near_wall_cost);
        assert!(g.cost(&buffered) > g.cost(&near));
    }

    #[test]
    fn test_distance_field_grows_away_from_wall() {
        let g = grid();
        let close = g.to_grid(&CampusPoint::new(5.5, 3.0));
        let far = g.to_grid(&CampusPoint::new(7.5, 3.0));
        assert!(g.clearance(&far) > g.clearance(&close));
    }

    #[test]
    fn test_snap_to_passable_ring_search() {
        let g = grid();
        let on_wall = g.to_grid(&CampusPoint::new(5.0, 3.0));
        let snapped = g.snap_to_passable(&on_wall, 20).expect("should snap");
        assert!(g.is_passable(&snapped));
        assert!(on_wall.chebyshev_distance(&snapped) <= 20);
    }

    #[test]
    fn test_boundary_blocks_exterior_on_upper_floor() {
        let mut plan = room_plan();
        plan.floor_number = 2;
        plan.boundaries = vec![vec![
            CampusPoint::new(0.0, 0.0),
            CampusPoint::new(10.0, 0.0),
            CampusPoint::new(10.0, 10.0),
            CampusPoint::new(0.0, 10.0),
        ]];
        let upper = FloorGrid::build(&plan, &GridSettings::default(), false);
        let outside = upper.to_grid(&CampusPoint::new(-1.5, 5.0));
        assert!(!upper.is_passable(&outside));

        // Same geometry at ground level: the exterior stays walkable
        let ground = FloorGrid::build(&plan, &GridSettings::default(), true);
        assert!(ground.is_passable(&ground.to_grid(&CampusPoint::new(-1.5, 5.0))));
    }

    #[test]
    fn test_disjoint_boundary_polygons_are_both_indoors() {
        // Two separate buildings share the floor; the gap between their
        // outlines is outdoors
        let mut plan = room_plan();
        plan.boundaries = vec![
            vec![
                CampusPoint::new(0.0, 0.0),
                CampusPoint::new(10.0, 0.0),
                CampusPoint::new(10.0, 10.0),
                CampusPoint::new(0.0, 10.0),
            ],
            vec![
                CampusPoint::new(20.0, 0.0),
                CampusPoint::new(30.0, 0.0),
                CampusPoint::new(30.0, 10.0),
                CampusPoint::new(20.0, 10.0),
            ],
        ];
        let g = FloorGrid::build(&plan, &GridSettings::default(), false);
        assert!(g.is_passable(&g.to_grid(&CampusPoint::new(25.0, 6.0))));
        assert!(g.is_passable(&g.to_grid(&CampusPoint::new(2.5, 5.0))));
        assert!(!g.is_passable(&g.to_grid(&CampusPoint::new(15.0, 5.0))));
    }

    #[test]
    fn test_world_grid_round_trip() {
        let g = grid();
        let p = CampusPoint::new(3.3, 4.7);
        let coord = g.to_grid(&p);
        let center = g.to_world(&coord);
        assert!(center.distance(&p) <= g.resolution() * std::f32::consts::SQRT_2);
    }
}
