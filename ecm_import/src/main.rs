use anyhow::{Context, Result};
use clap::Parser;
use ecm_scene::{ImportSession, MemoryHost};

mod cli;
mod gltf_source;
mod manifest;

use cli::Args;
use gltf_source::GltfAssetSource;
use manifest::write_manifest;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    let options = args.import_options()?;
    let files = args.ecm_files()?;

    let mut warnings = 0;
    for ecm_path in &files {
        let session = ImportSession::for_file(ecm_path, options.clone());
        let mut host = MemoryHost::new(GltfAssetSource);
        let report = session
            .import_file(ecm_path, &mut host)
            .with_context(|| format!("importing {}", ecm_path.display()))?;

        let manifest_path = args.manifest_path(ecm_path);
        log::debug!("writing manifest {}", manifest_path.display());
        write_manifest(&manifest_path, ecm_path, &report, &host)?;

        println!(
            "{}: {} templates, {} clones, {} mapzones, {} triggers ({} markers), {} material slots merged, {} skipped -> {}",
            ecm_path.display(),
            report.templates_loaded,
            report.instances_cloned,
            report.mapzones_loaded,
            report.triggers_imported,
            report.markers_created,
            report.material_slots_rewritten,
            report.skipped,
            manifest_path.display()
        );
        warnings += report.warnings();
    }

    if warnings > 0 {
        eprintln!(
            "[ecm_import] warning: {warnings} placements/mapzones skipped (missing models); run with RUST_LOG=warn for details"
        );
    }
    Ok(())
}
