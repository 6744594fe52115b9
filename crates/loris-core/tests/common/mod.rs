//! Shared fakes and fixtures for orchestration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use loris_core::{IngestService, Notifier};
use loris_model::{
    CollectionConfig, IdMapping, NotifyError, Project, ProjectEntry, RawUploadResponse,
    ServiceError, SessionMode, UploadMessage,
};

pub enum Reply {
    Response(RawUploadResponse),
    Fault(String),
}

#[derive(Default)]
pub struct FakeService {
    pub fail_auth: bool,
    /// Registration queries fail with a network fault.
    pub lookup_fault: bool,
    /// Instruments reported as registered; `None` means all of them.
    pub registered: Option<BTreeSet<String>>,
    pub replies: RefCell<BTreeMap<String, Reply>>,
    pub uploads: RefCell<Vec<(String, PathBuf, SessionMode)>>,
    pub auth_calls: RefCell<usize>,
}

impl FakeService {
    pub fn reply(self, instrument: &str, reply: Reply) -> Self {
        self.replies.borrow_mut().insert(instrument.to_string(), reply);
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.borrow().len()
    }
}

impl IngestService for FakeService {
    fn authenticate(&self) -> Result<(), ServiceError> {
        *self.auth_calls.borrow_mut() += 1;
        if self.fail_auth {
            return Err(ServiceError::Authentication("bad credentials".to_string()));
        }
        Ok(())
    }

    fn instrument_exists(&self, instrument: &str) -> Result<bool, ServiceError> {
        if self.lookup_fault {
            return Err(ServiceError::Network("lookup timed out".to_string()));
        }
        Ok(self
            .registered
            .as_ref()
            .is_none_or(|set| set.contains(instrument)))
    }

    fn upload_instrument(
        &self,
        instrument: &str,
        file: &Path,
        mode: SessionMode,
    ) -> Result<RawUploadResponse, ServiceError> {
        self.uploads
            .borrow_mut()
            .push((instrument.to_string(), file.to_path_buf(), mode));
        match self.replies.borrow().get(instrument) {
            Some(Reply::Response(response)) => Ok(response.clone()),
            Some(Reply::Fault(message)) => Err(ServiceError::Network(message.clone())),
            None => Ok(saved(0, 0)),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub failing: BTreeSet<String>,
    pub sent: RefCell<Vec<(String, String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing.contains(recipient) {
            return Err(NotifyError::InvalidRecipient(recipient.to_string()));
        }
        self.sent.borrow_mut().push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

pub fn saved(saved: u64, total: u64) -> RawUploadResponse {
    RawUploadResponse {
        success: true,
        message: UploadMessage::Text(format!("Saved {saved} out of {total}")),
        id_mapping: None,
    }
}

pub fn mapping(external: &str, internal: &str) -> IdMapping {
    IdMapping {
        external_id: external.to_string(),
        internal_id: internal.to_string(),
    }
}

/// CSV with the mandatory header and `rows` data rows.
pub fn instrument_csv(rows: usize) -> String {
    let mut contents = String::from("PSCID,Visit_label,score\n");
    for idx in 0..rows {
        contents.push_str(&format!("MTL{idx:03},V1,{idx}\n"));
    }
    contents
}

/// Lays out collection, manifest and mount directories under one root.
pub struct Fixture {
    pub root: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            root: tempfile::TempDir::new().expect("temp dir"),
        }
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.path().join("collections").join(collection)
    }

    pub fn mount(&self, project: &str) -> PathBuf {
        self.root.path().join("data").join(project)
    }

    pub fn write_project(
        &self,
        collection: &str,
        project: &str,
        instruments: &[&str],
        on_success: &[&str],
        on_error: &[&str],
    ) {
        self.write_manifest(
            collection,
            project,
            serde_json::json!({
                "name": project,
                "mount_path": self.mount(project),
                "instruments": instruments,
                "notifications": {
                    "clinical": {"on_success": on_success, "on_error": on_error}
                }
            }),
        );
    }

    pub fn write_manifest(&self, collection: &str, project: &str, manifest: serde_json::Value) {
        let dir = self.collection_dir(collection).join(project);
        fs::create_dir_all(&dir).expect("project dir");
        fs::write(dir.join("project.json"), manifest.to_string()).expect("manifest");
    }

    pub fn write_instrument(&self, project: &str, instrument: &str, contents: &str) -> PathBuf {
        let dir = self.mount(project).join("deidentified-lorisid/clinical");
        fs::create_dir_all(&dir).expect("clinical dir");
        let path = dir.join(format!("{instrument}.csv"));
        fs::write(&path, contents).expect("instrument file");
        path
    }

    pub fn collection(&self, name: &str, projects: &[&str]) -> CollectionConfig {
        CollectionConfig {
            name: name.to_string(),
            base_path: self.collection_dir(name),
            enabled: true,
            projects: projects
                .iter()
                .map(|project| ProjectEntry {
                    name: (*project).to_string(),
                    enabled: true,
                })
                .collect(),
        }
    }

    pub fn project(&self, collection: &str, project: &str) -> Project {
        let path = self.collection_dir(collection).join(project);
        Project {
            collection: collection.to_string(),
            manifest: loris_ingest::load_manifest(&path).expect("manifest loads"),
            path,
        }
    }
}
