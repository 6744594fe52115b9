//! Expands configured collections into the ordered list of projects to ingest.

use loris_model::{CollectionConfig, Project};
use tracing::{debug, warn};

use crate::manifest::load_manifest;

/// Optional name filters narrowing discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    pub collection: Option<String>,
    pub project: Option<String>,
}

impl DiscoveryFilter {
    /// No filtering: every enabled collection and project.
    pub fn all() -> Self {
        Self::default()
    }

    fn accepts_collection(&self, name: &str) -> bool {
        self.collection.as_deref().is_none_or(|wanted| wanted == name)
    }

    fn accepts_project(&self, name: &str) -> bool {
        self.project.as_deref().is_none_or(|wanted| wanted == name)
    }
}

/// Walk collections and projects in configuration order.
///
/// Disabled or filtered-out entries are skipped. A project whose manifest is
/// missing or unparsable is logged and excluded; it never fails discovery.
pub fn discover_projects(collections: &[CollectionConfig], filter: &DiscoveryFilter) -> Vec<Project> {
    let mut projects = Vec::new();
    for collection in collections {
        if !collection.enabled {
            debug!(collection = %collection.name, "collection disabled, skipping");
            continue;
        }
        if !filter.accepts_collection(&collection.name) {
            continue;
        }
        for entry in &collection.projects {
            if !entry.enabled {
                debug!(
                    collection = %collection.name,
                    project = %entry.name,
                    "project disabled, skipping"
                );
                continue;
            }
            if !filter.accepts_project(&entry.name) {
                continue;
            }
            let path = collection.base_path.join(&entry.name);
            match load_manifest(&path) {
                Ok(manifest) => {
                    debug!(
                        collection = %collection.name,
                        project = %entry.name,
                        instrument_count = manifest.instruments.len(),
                        "project discovered"
                    );
                    projects.push(Project {
                        collection: collection.name.clone(),
                        path,
                        manifest,
                    });
                }
                Err(error) => {
                    warn!(
                        collection = %collection.name,
                        project = %entry.name,
                        %error,
                        "skipping project with unusable manifest"
                    );
                }
            }
        }
    }
    projects
}
