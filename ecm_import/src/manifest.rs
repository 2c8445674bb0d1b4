use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ecm_scene::{ImportReport, MemoryHost};
use serde::Serialize;

/// JSON document written for each imported map.
#[derive(Serialize)]
#[serde(bound = "")]
pub struct SceneManifest<'a, S> {
    pub source: &'a Path,
    pub report: &'a ImportReport,
    pub scene: &'a MemoryHost<S>,
}

pub fn write_manifest<S>(
    path: &Path,
    source: &Path,
    report: &ImportReport,
    scene: &MemoryHost<S>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let manifest = SceneManifest {
        source,
        report,
        scene,
    };
    let json = serde_json::to_string_pretty(&manifest).context("serializing scene manifest")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
