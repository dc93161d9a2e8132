//! Project file discovery: one primary manifest plus zero-or-more sibling
//! overlays, ordered deterministically.

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::types::ProjectFiles;

pub const MAIN_FILE: &str = "Pulumi.yaml";

/// Enumerate the project files in `dir`. `Pulumi.yaml` is required; every
/// `Pulumi.*.yaml` sibling is an overlay, sorted lexicographically by file
/// name.
pub fn discover_project_files(dir: &Path) -> Result<ProjectFiles> {
    if !dir.is_dir() {
        bail!("project directory not found: {}", dir.display());
    }

    let main = dir.join(MAIN_FILE);
    if !main.is_file() {
        bail!(
            "missing primary manifest: no {} in {}",
            MAIN_FILE,
            dir.display()
        );
    }

    let mut overlays: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_overlay(p))
        .map(|p| p.display().to_string())
        .collect();
    overlays.sort_by(|a, b| file_name(a).cmp(file_name(b)));

    tracing::debug!(
        main = %main.display(),
        overlays = overlays.len(),
        "discovered project files"
    );

    let file_count = 1 + overlays.len();
    Ok(ProjectFiles {
        main_file: main.display().to_string(),
        additional_files: overlays,
        file_count,
    })
}

fn is_overlay(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => {
            name != MAIN_FILE && name.starts_with("Pulumi.") && name.ends_with(".yaml")
        }
        None => false,
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
