use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use ecm_scene::ImportOptions;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    about = "Import Eurochef ECM map exports and write the resulting scene graph as JSON",
    version
)]
pub struct Args {
    /// ECM file, or a directory searched recursively for *.ecm files
    pub input: PathBuf,

    /// JSON file with import options; flags below override its values
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Directory to write <map>.scene.json manifests into (default: next to each ECM file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Extension of the converted model files (default: gltf)
    #[arg(long)]
    pub asset_extension: Option<String>,

    /// Keep duplicate material variants instead of merging them
    #[arg(long)]
    pub no_merge_materials: bool,

    /// Make imported objects unselectable
    #[arg(long)]
    pub lock_objects: bool,

    /// Request smooth shading on loaded models
    #[arg(long)]
    pub autosmooth: bool,

    /// Skip trigger marker geometry
    #[arg(long)]
    pub no_trigger_visualizations: bool,

    /// Skip triggers entirely
    #[arg(long)]
    pub no_triggers: bool,

    /// Experimental vertex-alpha blending (currently ignored)
    #[arg(long)]
    pub surface_blending: bool,

    /// Scale map positions by 0.1
    #[arg(long)]
    pub downscale: bool,
}

impl Args {
    pub fn import_options(&self) -> Result<ImportOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let bytes = fs::read(path)
                    .with_context(|| format!("reading options file {}", path.display()))?;
                ImportOptions::from_json(&bytes)
                    .with_context(|| format!("parsing options file {}", path.display()))?
            }
            None => ImportOptions::default(),
        };

        if let Some(extension) = &self.asset_extension {
            options.asset_extension = extension.trim_start_matches('.').to_string();
        }
        if self.no_merge_materials {
            options.merge_materials = false;
        }
        if self.lock_objects {
            options.lock_objects = true;
        }
        if self.autosmooth {
            options.autosmooth = true;
        }
        if self.no_trigger_visualizations {
            options.trigger_visualizations = false;
        }
        if self.no_triggers {
            options.import_triggers = false;
        }
        if self.surface_blending {
            options.surface_blending = true;
        }
        if self.downscale {
            options.downscale = true;
        }
        Ok(options)
    }

    /// Every ECM file named by `input`, sorted.
    pub fn ecm_files(&self) -> Result<Vec<PathBuf>> {
        collect_ecm_files(&self.input)
    }

    /// Where the manifest for `ecm_path` goes. Under `--output`, files found by
    /// walking a directory keep their path relative to that directory so maps
    /// with the same stem in different folders don't overwrite each other.
    pub fn manifest_path(&self, ecm_path: &Path) -> PathBuf {
        let stem = ecm_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scene".to_string());
        let dir = match &self.output {
            Some(output) => {
                let nested = ecm_path
                    .strip_prefix(&self.input)
                    .ok()
                    .and_then(Path::parent)
                    .filter(|_| self.input.is_dir());
                match nested {
                    Some(relative) => output.join(relative),
                    None => output.clone(),
                }
            }
            None => ecm_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        dir.join(format!("{stem}.scene.json"))
    }
}

fn is_ecm(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("ecm"))
        .unwrap_or(false)
}

pub fn collect_ecm_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("{} does not exist", input.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input) {
        let entry = entry.with_context(|| format!("walking {}", input.display()))?;
        if entry.file_type().is_file() && is_ecm(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("no .ecm files found in {}", input.display());
    }
    Ok(files)
}
