//! One import: placements, then mapzones, then triggers, then a single
//! material reconciliation pass over everything the host now holds.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::document::SceneDocument;
use crate::error::Result;
use crate::host::{CollectionHandle, SceneHost};
use crate::materials::{canonicalize_materials, DuplicateSuffixPolicy, NamingPolicy};
use crate::options::ImportOptions;
use crate::resolver::PlacementResolver;
use crate::triggers::{import_trigger, VisualizerRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub collection: CollectionHandle,
    pub templates_loaded: usize,
    pub instances_cloned: usize,
    pub mapzones_loaded: usize,
    pub triggers_imported: usize,
    pub markers_created: usize,
    pub material_slots_rewritten: usize,
    /// Placements and mapzone entities whose asset was missing.
    pub skipped: usize,
}

impl ImportReport {
    pub fn warnings(&self) -> usize {
        self.skipped
    }
}

pub struct ImportSession {
    asset_dir: PathBuf,
    collection_name: String,
    options: ImportOptions,
    naming: Box<dyn NamingPolicy>,
    visualizers: VisualizerRegistry,
}

impl ImportSession {
    pub fn new(
        asset_dir: impl Into<PathBuf>,
        collection_name: impl Into<String>,
        options: ImportOptions,
    ) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            collection_name: collection_name.into(),
            options,
            naming: Box::new(DuplicateSuffixPolicy),
            visualizers: VisualizerRegistry::default(),
        }
    }

    /// Session whose assets sit next to `ecm_path` and whose collection is
    /// named after the file.
    pub fn for_file(ecm_path: &Path, options: ImportOptions) -> Self {
        let asset_dir = ecm_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let name = ecm_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ecm".to_string());
        Self::new(asset_dir, name, options)
    }

    pub fn with_naming_policy(mut self, policy: impl NamingPolicy + 'static) -> Self {
        self.naming = Box::new(policy);
        self
    }

    pub fn with_visualizers(mut self, registry: VisualizerRegistry) -> Self {
        self.visualizers = registry;
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Parse `ecm_path` and import it. A malformed file fails before the
    /// host is touched.
    pub fn import_file<H: SceneHost + ?Sized>(
        &self,
        ecm_path: &Path,
        host: &mut H,
    ) -> Result<ImportReport> {
        let document = SceneDocument::from_path(ecm_path)?;
        self.run(&document, host)
    }

    pub fn run<H: SceneHost + ?Sized>(
        &self,
        document: &SceneDocument,
        host: &mut H,
    ) -> Result<ImportReport> {
        if self.options.surface_blending {
            warn!("surface blending is not supported; ignoring");
        }

        let collection = host.create_collection(&self.collection_name)?;
        let mut resolver = PlacementResolver::new(&self.asset_dir, &self.options, collection);

        for placement in &document.placements {
            resolver.resolve_placement(host, placement)?;
        }
        for entity in &document.mapzone_entities {
            resolver.resolve_mapzone(host, entity)?;
        }

        let mut triggers_imported = 0;
        let mut markers_created = 0;
        if self.options.import_triggers {
            for (index, trigger) in document.triggers.iter().enumerate() {
                let objects = import_trigger(
                    host,
                    collection,
                    index,
                    trigger,
                    &self.options,
                    &self.visualizers,
                )?;
                triggers_imported += 1;
                if objects.marker.is_some() {
                    markers_created += 1;
                }
            }
        }

        let material_slots_rewritten = if self.options.merge_materials {
            canonicalize_materials(host, self.naming.as_ref())?
        } else {
            0
        };

        let stats = resolver.stats();
        let report = ImportReport {
            collection,
            templates_loaded: stats.templates_loaded,
            instances_cloned: stats.instances_cloned,
            mapzones_loaded: stats.mapzones_loaded,
            triggers_imported,
            markers_created,
            material_slots_rewritten,
            skipped: stats.skipped,
        };
        info!(
            "imported {}: {} templates, {} clones, {} mapzones, {} triggers, {} skipped",
            self.collection_name,
            report.templates_loaded,
            report.instances_cloned,
            report.mapzones_loaded,
            report.triggers_imported,
            report.skipped
        );
        Ok(report)
    }
}
