//! Floor constraint provider: transformed geometry plus spatial queries.
//!
//! Holds the active floor's walls and entrances in campus coordinates and
//! answers radius- and heading-filtered queries for the correction pipeline
//! and the stairwell detector. Loading a floor replaces all cached geometry;
//! the provider is never additive across floors.

use log::debug;

use crate::core::{angle_diff, point_segment_distance, CampusPoint, Segment};

use super::types::{CampusEntrance, CampusWall, FloorId, FloorPlan, StairDirection};

/// Transformed geometry for the active floor.
#[derive(Clone, Debug, Default)]
pub struct FloorConstraintProvider {
    floor_id: Option<FloorId>,
    floor_number: i32,
    walls: Vec<CampusWall>,
    entrances: Vec<CampusEntrance>,
}

impl FloorConstraintProvider {
    /// Create an empty provider. All queries return nothing until a floor
    /// is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all cached geometry with the given floor plan, transformed
    /// into campus coordinates (scale, then rotate, then translate).
    pub fn load_floor(&mut self, plan: &FloorPlan) {
        let t = &plan.transform;

        self.walls = plan
            .walls
            .iter()
            .map(|w| CampusWall::new(Segment::new(t.apply(w.start), t.apply(w.end))))
            .collect();

        self.entrances = plan
            .entrances
            .iter()
            .map(|e| CampusEntrance {
                id: e.id.clone(),
                name: e.name.clone(),
                position: t.apply(e.position),
                stair_direction: e.stair_direction,
                connected_floor: e.connected_floor,
            })
            .collect();

        self.floor_id = plan.id.clone();
        self.floor_number = plan.floor_number;

        debug!(
            "[FloorProvider] loaded floor {} ({} walls, {} entrances)",
            plan.floor_number,
            self.walls.len(),
            self.entrances.len()
        );
    }

    /// Number of the currently loaded floor.
    pub fn floor_number(&self) -> i32 {
        self.floor_number
    }

    /// Identity of the currently loaded floor, if any.
    pub fn floor_id(&self) -> Option<&FloorId> {
        self.floor_id.as_ref()
    }

    /// All loaded walls.
    pub fn walls(&self) -> &[CampusWall] {
        &self.walls
    }

    /// All loaded entrances.
    pub fn entrances(&self) -> &[CampusEntrance] {
        &self.entrances
    }

    /// Walls within `radius` of `point`, by point-to-segment distance.
    pub fn walls_near(&self, point: &CampusPoint, radius: f32) -> Vec<&CampusWall> {
        self.walls
            .iter()
            .filter(|w| point_segment_distance(point, &w.segment) <= radius)
            .collect()
    }

    /// Entrances within `radius` of `point`.
    ///
    /// When `heading` is supplied, entrances whose bearing from `point`
    /// deviates from it by more than `tolerance` radians are filtered out.
    pub fn entrances_near(
        &self,
        point: &CampusPoint,
        radius: f32,
        heading: Option<f32>,
        tolerance: f32,
    ) -> Vec<&CampusEntrance> {
        self.entrances
            .iter()
            .filter(|e| e.position.distance(point) <= radius)
            .filter(|e| match heading {
                Some(h) => {
                    let bearing = point.angle_to(&e.position);
                    angle_diff(h, bearing).abs() <= tolerance
                }
                None => true,
            })
            .collect()
    }

    /// Stair entrances in the given direction within `radius` of `point`.
    pub fn stair_entrances_near(
        &self,
        point: &CampusPoint,
        radius: f32,
        direction: StairDirection,
    ) -> Vec<&CampusEntrance> {
        self.entrances
            .iter()
            .filter(|e| e.is_stair(direction))
            .filter(|e| e.position.distance(point) <= radius)
            .collect()
    }
}
