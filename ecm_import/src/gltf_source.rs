use std::path::Path;

use ecm_scene::{AssetSource, BlendMode, HostError, SourceMaterial};
use gltf::material::AlphaMode;

/// Name the editor gives materials that arrive without one.
const UNNAMED_MATERIAL: &str = "Material";

/// Reads the material table of converted glTF models from disk.
#[derive(Debug, Default)]
pub struct GltfAssetSource;

impl AssetSource for GltfAssetSource {
    fn open(&mut self, path: &Path) -> Result<Option<Vec<SourceMaterial>>, HostError> {
        if !path.is_file() {
            return Ok(None);
        }
        let gltf = gltf::Gltf::open(path)
            .map_err(|err| HostError::Backend(format!("reading {}: {err}", path.display())))?;
        Ok(Some(read_materials(&gltf)))
    }
}

fn blend_mode(mode: AlphaMode) -> BlendMode {
    match mode {
        AlphaMode::Opaque => BlendMode::Opaque,
        AlphaMode::Mask => BlendMode::AlphaClip,
        AlphaMode::Blend => BlendMode::AlphaBlend,
    }
}

pub fn read_materials(document: &gltf::Document) -> Vec<SourceMaterial> {
    document
        .materials()
        .map(|material| SourceMaterial {
            name: material.name().unwrap_or(UNNAMED_MATERIAL).to_string(),
            blend_mode: blend_mode(material.alpha_mode()),
            double_sided: material.double_sided(),
        })
        .collect()
}
