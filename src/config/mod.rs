//! Unified configuration loading for marga-nav.
//!
//! All tunables live in one [`NavConfig`], loadable from a single YAML file.
//! Every field has a serde default, so a partial file (or none at all)
//! yields a fully usable configuration.

mod correction;
mod defaults;
mod pathfinding;
mod stairs;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use correction::CorrectionConfig;
pub use pathfinding::{
    AStarSettings, GridSettings, PathfindingSection, RoutingSettings, SmoothingSettings,
};
pub use stairs::{StairAnimationConfig, StairDetectionConfig, StairsSection};

/// Top-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NavConfig {
    /// Correction pipeline tunables
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Stairwell detection and animation tunables
    #[serde(default)]
    pub stairs: StairsSection,

    /// Pathfinding tunables
    #[serde(default)]
    pub pathfinding: PathfindingSection,
}

impl NavConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NavConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
