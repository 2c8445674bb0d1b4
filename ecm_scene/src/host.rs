//! Narrow contract between the import core and the 3D editor that owns the
//! real scene graph.
//!
//! Every operation that creates something returns an explicit handle; the
//! core never relies on an ambient "active object".

use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MaterialHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CollectionHandle(pub u32);

/// Linear RGBA, each channel in `0.0..=1.0`.
pub type Rgba = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Opaque,
    AlphaClip,
    AlphaBlend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialInfo {
    pub handle: MaterialHandle,
    pub name: String,
    pub blend_mode: BlendMode,
}

/// Primitive used for trigger markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    /// Transform-only object with no geometry.
    Empty,
    /// Flat unit quad in the local XY plane.
    Plane,
}

#[derive(Debug, Error)]
pub enum HostError {
    /// The asset file does not exist. Recoverable: the entry is skipped.
    #[error("asset {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("object handle {0:?} is not live")]
    StaleObject(ObjectHandle),
    #[error("material handle {0:?} is not live")]
    StaleMaterial(MaterialHandle),
    #[error("collection handle {0:?} is not live")]
    StaleCollection(CollectionHandle),
    #[error("material slot {slot} out of range for {object:?}")]
    SlotOutOfRange { object: ObjectHandle, slot: usize },
    #[error("{0}")]
    Backend(String),
}

pub trait SceneHost {
    fn create_collection(&mut self, name: &str) -> Result<CollectionHandle, HostError>;

    /// Load a model file and return its root object.
    fn load_asset(&mut self, path: &Path) -> Result<ObjectHandle, HostError>;

    /// Duplicate a loaded object. The copy shares material data with the
    /// original but has an independent lifetime.
    fn clone_asset(&mut self, handle: ObjectHandle) -> Result<ObjectHandle, HostError>;

    /// Unlink `handle` from every collection and link it to `collection` only.
    fn relink(
        &mut self,
        handle: ObjectHandle,
        collection: CollectionHandle,
    ) -> Result<(), HostError>;

    fn set_transform(&mut self, handle: ObjectHandle, transform: &Transform)
        -> Result<(), HostError>;

    fn apply_smoothing(&mut self, handle: ObjectHandle) -> Result<(), HostError>;

    fn set_selectable(&mut self, handle: ObjectHandle, selectable: bool)
        -> Result<(), HostError>;

    fn material_slots(&self, handle: ObjectHandle) -> Result<Vec<MaterialHandle>, HostError>;

    fn set_material_slot(
        &mut self,
        handle: ObjectHandle,
        slot: usize,
        material: MaterialHandle,
    ) -> Result<(), HostError>;

    fn set_material_backface_culling(
        &mut self,
        material: MaterialHandle,
        enabled: bool,
    ) -> Result<(), HostError>;

    /// Every material known to the host, in creation order.
    fn materials(&self) -> Vec<MaterialInfo>;

    /// Every object known to the host, in creation order.
    fn objects(&self) -> Vec<ObjectHandle>;

    fn create_marker_object(
        &mut self,
        name: &str,
        shape: MarkerShape,
        dimensions: DVec3,
        transform: &Transform,
    ) -> Result<ObjectHandle, HostError>;

    fn set_color(&mut self, handle: ObjectHandle, rgba: Rgba) -> Result<(), HostError>;

    fn set_parent(&mut self, child: ObjectHandle, parent: ObjectHandle) -> Result<(), HostError>;

    /// Reset the object's local translation to its parent's origin.
    fn clear_origin(&mut self, handle: ObjectHandle) -> Result<(), HostError>;

    fn set_property(&mut self, handle: ObjectHandle, key: &str, value: &str)
        -> Result<(), HostError>;
}
