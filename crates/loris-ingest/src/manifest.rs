//! Project manifest loading.

use std::path::{Path, PathBuf};

use loris_model::{ManifestError, ProjectManifest};

/// File name of the per-project manifest.
pub const MANIFEST_FILE: &str = "project.json";

/// Manifest location for a project directory.
pub fn manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_FILE)
}

/// Read and parse `<project_dir>/project.json`.
pub fn load_manifest(project_dir: &Path) -> Result<ProjectManifest, ManifestError> {
    let path = manifest_path(project_dir);
    if !path.is_file() {
        return Err(ManifestError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| ManifestError::Parse {
        path,
        message: e.to_string(),
    })
}
