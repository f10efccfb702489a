//! Point and vector types for the shared campus coordinate space.
//!
//! Every position that crosses a component boundary is a [`CampusPoint`]:
//! floor-local coordinates exist only transiently inside the floor
//! transform. Units are meters, angles radians, counter-clockwise positive.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A position in campus coordinates (meters, f32).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CampusPoint {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl CampusPoint {
    /// Create a new campus point
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero point (campus origin)
    pub const ZERO: CampusPoint = CampusPoint { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &CampusPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Squared distance (faster, avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &CampusPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Angle from this point to another (radians, CCW from +X)
    #[inline]
    pub fn angle_to(&self, other: &CampusPoint) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Vector from this point to another
    #[inline]
    pub fn vector_to(&self, other: &CampusPoint) -> CampusVector {
        CampusVector::new(other.x - self.x, other.y - self.y)
    }

    /// Advance this point by `distance` along `heading`
    #[inline]
    pub fn advanced(&self, heading: f32, distance: f32) -> CampusPoint {
        CampusPoint::new(
            self.x + distance * heading.cos(),
            self.y + distance * heading.sin(),
        )
    }

    /// Linear interpolation toward another point, `t` in [0, 1]
    #[inline]
    pub fn lerp(&self, other: &CampusPoint, t: f32) -> CampusPoint {
        CampusPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Add<CampusVector> for CampusPoint {
    type Output = CampusPoint;

    #[inline]
    fn add(self, v: CampusVector) -> CampusPoint {
        CampusPoint::new(self.x + v.x, self.y + v.y)
    }
}

impl Sub for CampusPoint {
    type Output = CampusVector;

    #[inline]
    fn sub(self, other: CampusPoint) -> CampusVector {
        CampusVector::new(self.x - other.x, self.y - other.y)
    }
}

/// A displacement in campus coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CampusVector {
    pub x: f32,
    pub y: f32,
}

impl CampusVector {
    /// Create a new vector
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: CampusVector = CampusVector { x: 0.0, y: 0.0 };

    /// Unit vector along `heading`
    #[inline]
    pub fn from_heading(heading: f32) -> Self {
        Self::new(heading.cos(), heading.sin())
    }

    /// Vector length
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Squared length
    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Dot product
    #[inline]
    pub fn dot(&self, other: &CampusVector) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component)
    #[inline]
    pub fn cross(&self, other: &CampusVector) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Heading of this vector (radians, CCW from +X)
    #[inline]
    pub fn heading(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Normalized copy; zero vector stays zero
    #[inline]
    pub fn normalized(&self) -> CampusVector {
        let len = self.length();
        if len > f32::EPSILON {
            CampusVector::new(self.x / len, self.y / len)
        } else {
            CampusVector::ZERO
        }
    }
}

impl Add for CampusVector {
    type Output = CampusVector;

    #[inline]
    fn add(self, other: CampusVector) -> CampusVector {
        CampusVector::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for CampusVector {
    type Output = CampusVector;

    #[inline]
    fn sub(self, other: CampusVector) -> CampusVector {
        CampusVector::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for CampusVector {
    type Output = CampusVector;

    #[inline]
    fn mul(self, s: f32) -> CampusVector {
        CampusVector::new(self.x * s, self.y * s)
    }
}

/// Grid coordinates for the pathfinding grid (integer cell indices).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    /// Column index
    pub x: i32,
    /// Row index
    pub y: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (max of x and y distance) for 8-connected grids
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Get the 8 neighbors (cardinals first, then diagonals)
    #[inline]
    pub fn neighbors_8(&self) -> [GridCoord; 8] {
        [
            GridCoord::new(self.x, self.y + 1),
            GridCoord::new(self.x + 1, self.y),
            GridCoord::new(self.x, self.y - 1),
            GridCoord::new(self.x - 1, self.y),
            GridCoord::new(self.x + 1, self.y + 1),
            GridCoord::new(self.x + 1, self.y - 1),
            GridCoord::new(self.x - 1, self.y - 1),
            GridCoord::new(self.x - 1, self.y + 1),
        ]
    }
}
