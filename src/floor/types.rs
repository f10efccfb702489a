//! Floor geometry types and the floor-to-campus placement transform.

use serde::{Deserialize, Serialize};

use crate::core::{deg_to_rad, CampusPoint, Segment};

/// Identity of a floor within the campus.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorId(pub String);

impl FloorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FloorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Vertical direction of a stair entrance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StairDirection {
    Up,
    Down,
}

impl StairDirection {
    /// The opposite direction
    #[inline]
    pub fn opposite(&self) -> StairDirection {
        match self {
            StairDirection::Up => StairDirection::Down,
            StairDirection::Down => StairDirection::Up,
        }
    }
}

/// Placement of a floor plan into campus coordinates.
///
/// Applied as scale, then rotation, then translation. The order is fixed;
/// the three operations do not commute.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorTransform {
    /// Uniform scale from floor-local units to meters
    pub scale: f32,
    /// Rotation in degrees, counter-clockwise
    pub rotation_degrees: f32,
    /// Translation along campus X (meters)
    pub offset_x: f32,
    /// Translation along campus Y (meters)
    pub offset_y: f32,
}

impl Default for FloorTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_degrees: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl FloorTransform {
    /// Transform a floor-local point into campus coordinates.
    pub fn apply(&self, local: CampusPoint) -> CampusPoint {
        let sx = local.x * self.scale;
        let sy = local.y * self.scale;

        let theta = deg_to_rad(self.rotation_degrees);
        let (sin, cos) = theta.sin_cos();
        let rx = sx * cos - sy * sin;
        let ry = sx * sin + sy * cos;

        CampusPoint::new(rx + self.offset_x, ry + self.offset_y)
    }
}

/// A wall segment in campus coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CampusWall {
    pub segment: Segment,
}

impl CampusWall {
    pub fn new(segment: Segment) -> Self {
        Self { segment }
    }
}

/// An entrance point in campus coordinates.
///
/// Stair entrances additionally carry a vertical direction and the floor
/// number they connect to.
#[derive(Clone, Debug, PartialEq)]
pub struct CampusEntrance {
    /// Stable identity across floor loads
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Position in campus coordinates
    pub position: CampusPoint,
    /// Stair direction, when this entrance belongs to a stairwell
    pub stair_direction: Option<StairDirection>,
    /// Floor number this stair connects to
    pub connected_floor: Option<i32>,
}

impl CampusEntrance {
    /// Is this a stair entrance in the given direction?
    #[inline]
    pub fn is_stair(&self, direction: StairDirection) -> bool {
        self.stair_direction == Some(direction)
    }
}

/// Floor-local geometry as delivered by a [`super::FloorDataSource`].
///
/// Coordinates are floor-local; [`FloorTransform::apply`] places them in
/// campus space.
#[derive(Clone, Debug, Default)]
pub struct FloorPlan {
    /// Floor identity
    pub id: Option<FloorId>,
    /// Floor number (signed: basements are negative)
    pub floor_number: i32,
    /// Wall segments, floor-local
    pub walls: Vec<Segment>,
    /// Entrance points, floor-local
    pub entrances: Vec<LocalEntrance>,
    /// Boundary outlines, one polygon per building footprint, floor-local
    pub boundaries: Vec<Vec<CampusPoint>>,
    /// Placement into campus coordinates
    pub transform: FloorTransform,
}

/// An entrance point in floor-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalEntrance {
    pub id: String,
    pub name: String,
    pub position: CampusPoint,
    pub stair_direction: Option<StairDirection>,
    pub connected_floor: Option<i32>,
}
