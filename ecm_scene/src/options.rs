use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Factor applied to converted positions when `downscale` is set.
pub const DOWNSCALE_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Collapse duplicate material variants onto their base material.
    pub merge_materials: bool,
    /// Mark every produced object as non-selectable.
    pub lock_objects: bool,
    /// Request a smoothing pass on templates and mapzone entities.
    pub autosmooth: bool,
    pub trigger_visualizations: bool,
    pub import_triggers: bool,
    /// Vertex-alpha transparency rewrite. Accepted but not implemented.
    pub surface_blending: bool,
    pub downscale: bool,
    /// Extension of the converted model files next to the ECM file.
    pub asset_extension: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            merge_materials: true,
            lock_objects: false,
            autosmooth: false,
            trigger_visualizations: true,
            import_triggers: true,
            surface_blending: false,
            downscale: false,
            asset_extension: "gltf".to_string(),
        }
    }
}

impl ImportOptions {
    pub fn from_json(input: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(input)?)
    }

    pub fn position_scale(&self) -> f64 {
        if self.downscale {
            DOWNSCALE_FACTOR
        } else {
            1.0
        }
    }
}
