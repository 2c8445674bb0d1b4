//! Translation core for ECM scene descriptions.
//!
//! An ECM file lists mesh placements, mapzone entities and triggers exported
//! from a game map. This crate parses it, converts transforms to a Z-up
//! editor convention, deduplicates repeated assets, and reconciles duplicate
//! materials, driving any editor through the [`SceneHost`] trait.

pub mod document;
pub mod error;
pub mod host;
pub mod materials;
pub mod memory;
pub mod options;
pub mod raw;
pub mod resolver;
pub mod session;
pub mod transform;
pub mod triggers;

pub use document::{MapzoneEntity, Placement, SceneDocument, Trigger};
pub use error::ImportError;
pub use host::{
    BlendMode, CollectionHandle, HostError, MarkerShape, MaterialHandle, MaterialInfo,
    ObjectHandle, Rgba, SceneHost,
};
pub use materials::{canonicalize_materials, DuplicateSuffixPolicy, FamilyKey, NamingPolicy};
pub use memory::{AssetSource, MemoryHost, SourceMaterial};
pub use options::ImportOptions;
pub use raw::decode_raw_float;
pub use resolver::{AssetInstance, InstanceCache, PlacementResolver};
pub use session::{ImportReport, ImportSession};
pub use transform::Transform;
pub use triggers::{visualization_for, VisualMarker, VisualizerRegistry};
