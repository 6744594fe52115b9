use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Modality key used for clinical instrument notifications.
pub const CLINICAL_MODALITY: &str = "clinical";

/// Subdirectory of a project mount holding clinical instrument files.
pub const CLINICAL_DATA_DIR: &str = "deidentified-lorisid/clinical";

/// Contents of a per-project `project.json` manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub name: String,
    pub mount_path: PathBuf,
    #[serde(default)]
    pub instruments: Vec<String>,
    /// Recipient lists keyed by modality (e.g. `clinical`).
    #[serde(default)]
    pub notifications: BTreeMap<String, RecipientLists>,
    /// Directory receiving the per-project journal.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

/// Notification recipients keyed by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientLists {
    #[serde(default)]
    pub on_success: Vec<String>,
    #[serde(default)]
    pub on_error: Vec<String>,
}

/// A project that passed discovery: manifest loaded and tagged with its origin.
#[derive(Debug, Clone)]
pub struct Project {
    pub collection: String,
    /// Directory that holds the manifest (`<collection base>/<project>`).
    pub path: PathBuf,
    pub manifest: ProjectManifest,
}

impl Project {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn instruments(&self) -> &[String] {
        &self.manifest.instruments
    }

    /// Directory that holds `<instrument>.csv` files.
    pub fn clinical_dir(&self) -> PathBuf {
        self.manifest.mount_path.join(CLINICAL_DATA_DIR)
    }

    /// Expected data file for an instrument.
    pub fn instrument_file(&self, instrument: &str) -> PathBuf {
        self.clinical_dir().join(format!("{instrument}.csv"))
    }

    /// Recipient lists for a modality; empty when the manifest has none.
    pub fn recipients(&self, modality: &str) -> RecipientLists {
        self.manifest
            .notifications
            .get(modality)
            .cloned()
            .unwrap_or_default()
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.manifest.log_path.as_deref()
    }
}
