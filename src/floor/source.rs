//! Floor data source abstraction.
//!
//! The engine never knows whether geometry comes from bundled assets or a
//! network backend; callers inject any implementation of
//! [`FloorDataSource`].

use crate::error::Result;

use super::types::{FloorId, FloorPlan};

/// Summary of one floor in the building metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorInfo {
    pub id: FloorId,
    pub floor_number: i32,
    pub name: String,
}

/// Building-level metadata: the floors available for loading.
#[derive(Clone, Debug, Default)]
pub struct BuildingMetadata {
    pub building_name: String,
    pub floors: Vec<FloorInfo>,
}

impl BuildingMetadata {
    /// Look up a floor by number.
    pub fn floor_by_number(&self, number: i32) -> Option<&FloorInfo> {
        self.floors.iter().find(|f| f.floor_number == number)
    }
}

/// Backend that supplies floor geometry.
///
/// `Send + Sync` so grids can be built from a background reroute thread.
pub trait FloorDataSource: Send + Sync {
    /// Load the floor plan (walls, entrances, boundaries, placement) for
    /// one floor.
    fn load_floor_plan(&self, floor: &FloorId) -> Result<FloorPlan>;

    /// Load the building metadata listing all floors.
    fn load_building_metadata(&self) -> Result<BuildingMetadata>;
}

/// In-memory data source, used by tests and for preloaded assets.
#[derive(Clone, Debug, Default)]
pub struct StaticFloorSource {
    pub metadata: BuildingMetadata,
    pub plans: Vec<FloorPlan>,
}

impl FloorDataSource for StaticFloorSource {
    fn load_floor_plan(&self, floor: &FloorId) -> Result<FloorPlan> {
        self.plans
            .iter()
            .find(|p| p.id.as_ref() == Some(floor))
            .cloned()
            .ok_or_else(|| crate::error::NavError::FloorData(format!("unknown floor {floor}")))
    }

    fn load_building_metadata(&self) -> Result<BuildingMetadata> {
        Ok(self.metadata.clone())
    }
}
