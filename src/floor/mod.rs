//! Floor geometry: campus-space types, placement transform, constraint
//! provider, and the data source abstraction.

mod provider;
mod source;
mod types;

pub use provider::FloorConstraintProvider;
pub use source::{BuildingMetadata, FloorDataSource, FloorInfo, StaticFloorSource};
pub use types::{
    CampusEntrance, CampusWall, FloorId, FloorPlan, FloorTransform, LocalEntrance, StairDirection,
};
