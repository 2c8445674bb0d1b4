//! Turns placements and mapzone entities into host objects.
//!
//! Placements share one loaded template per asset key and clone it for every
//! later occurrence. Mapzone entities are always loaded fresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::document::{MapzoneEntity, Placement};
use crate::host::{CollectionHandle, HostError, MaterialHandle, ObjectHandle, SceneHost};
use crate::options::ImportOptions;
use crate::transform::Transform;

/// Asset key of a placement: lowercase hex, no prefix, no padding.
pub fn placement_asset_key(object_ref: u32) -> String {
    format!("{object_ref:x}")
}

/// Asset key of a mapzone entity. The `ref_` prefix keeps it out of the
/// placement namespace.
pub fn mapzone_asset_key(entity_refptr: u32) -> String {
    format!("ref_{entity_refptr}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInstance {
    pub asset_key: String,
    pub handle: ObjectHandle,
    /// Only the first occurrence of a key receives shared-state fixups.
    pub is_template: bool,
    pub material_slots: Vec<MaterialHandle>,
}

/// First-loaded object per asset key. Append-only for one session.
#[derive(Debug, Default)]
pub struct InstanceCache {
    templates: HashMap<String, ObjectHandle>,
}

impl InstanceCache {
    pub fn get(&self, asset_key: &str) -> Option<ObjectHandle> {
        self.templates.get(asset_key).copied()
    }

    /// Record the template for `asset_key` unless one is already cached.
    pub fn insert(&mut self, asset_key: &str, handle: ObjectHandle) -> ObjectHandle {
        *self
            .templates
            .entry(asset_key.to_string())
            .or_insert(handle)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolverStats {
    pub templates_loaded: usize,
    pub instances_cloned: usize,
    pub mapzones_loaded: usize,
    pub skipped: usize,
}

pub struct PlacementResolver<'a> {
    asset_dir: &'a Path,
    options: &'a ImportOptions,
    collection: CollectionHandle,
    cache: InstanceCache,
    stats: ResolverStats,
}

impl<'a> PlacementResolver<'a> {
    pub fn new(asset_dir: &'a Path, options: &'a ImportOptions, collection: CollectionHandle) -> Self {
        Self {
            asset_dir,
            options,
            collection,
            cache: InstanceCache::default(),
            stats: ResolverStats::default(),
        }
    }

    pub fn cache(&self) -> &InstanceCache {
        &self.cache
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    fn asset_path(&self, asset_key: &str) -> PathBuf {
        self.asset_dir
            .join(format!("{asset_key}.{}", self.options.asset_extension))
    }

    /// Load `asset_key`, mapping a missing file to `None`. The caller logs the
    /// skip.
    fn load<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        asset_key: &str,
    ) -> Result<Option<ObjectHandle>, HostError> {
        match host.load_asset(&self.asset_path(asset_key)) {
            Ok(handle) => Ok(Some(handle)),
            Err(HostError::NotFound(_)) => {
                self.stats.skipped += 1;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve one placement. Returns `None` when its asset is missing.
    pub fn resolve_placement<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        placement: &Placement,
    ) -> Result<Option<AssetInstance>, HostError> {
        let asset_key = placement_asset_key(placement.object_ref);

        let (handle, is_template) = match self.cache.get(&asset_key) {
            Some(template) => {
                debug!("cache hit for {asset_key}");
                self.stats.instances_cloned += 1;
                (host.clone_asset(template)?, false)
            }
            None => {
                let Some(handle) = self.load(host, &asset_key)? else {
                    warn!(
                        "skipping placement {:x}/{:x}: couldn't find model {}",
                        placement.object_ref,
                        placement.hashcode,
                        self.asset_path(&asset_key).display()
                    );
                    return Ok(None);
                };
                self.cache.insert(&asset_key, handle);
                self.stats.templates_loaded += 1;
                (handle, true)
            }
        };

        let transform =
            Transform::from_source(placement.position, placement.rotation, placement.scale)
                .with_position_scale(self.options.position_scale());
        host.set_transform(handle, &transform)?;

        let material_slots = host.material_slots(handle)?;
        if is_template {
            for material in &material_slots {
                host.set_material_backface_culling(*material, false)?;
            }
            if self.options.autosmooth {
                host.apply_smoothing(handle)?;
            }
        }

        self.finish(host, handle)?;
        Ok(Some(AssetInstance {
            asset_key,
            handle,
            is_template,
            material_slots,
        }))
    }

    /// Resolve one mapzone entity. Never cached, culling is enabled on every
    /// load.
    pub fn resolve_mapzone<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        entity: &MapzoneEntity,
    ) -> Result<Option<AssetInstance>, HostError> {
        let asset_key = mapzone_asset_key(entity.entity_refptr);
        let Some(handle) = self.load(host, &asset_key)? else {
            warn!(
                "skipping mapzone entity {}: couldn't find model {}",
                asset_key,
                self.asset_path(&asset_key).display()
            );
            return Ok(None);
        };
        self.stats.mapzones_loaded += 1;

        if entity.position.is_some() || entity.rotation.is_some() || entity.scale.is_some() {
            let transform = Transform::from_source(
                entity.position.unwrap_or([0.0; 3]),
                entity.rotation.unwrap_or([0.0; 3]),
                entity.scale.unwrap_or([1.0; 3]),
            )
            .with_position_scale(self.options.position_scale());
            host.set_transform(handle, &transform)?;
        }

        let material_slots = host.material_slots(handle)?;
        for material in &material_slots {
            host.set_material_backface_culling(*material, true)?;
        }
        if self.options.autosmooth {
            host.apply_smoothing(handle)?;
        }

        self.finish(host, handle)?;
        Ok(Some(AssetInstance {
            asset_key,
            handle,
            is_template: true,
            material_slots,
        }))
    }

    fn finish<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        handle: ObjectHandle,
    ) -> Result<(), HostError> {
        host.relink(handle, self.collection)?;
        if self.options.lock_objects {
            host.set_selectable(handle, false)?;
        }
        Ok(())
    }
}
