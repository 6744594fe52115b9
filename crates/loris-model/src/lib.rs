//! Data model for clinical instrument ingestion runs.

pub mod config;
pub mod error;
pub mod notification;
pub mod project;
pub mod stats;
pub mod upload;

pub use config::{
    ApiConfig, CollectionConfig, IngestConfig, LoggingConfig, MailConfig, ProjectEntry,
};
pub use error::{ConfigError, ManifestError, NotifyError, ServiceError};
pub use notification::{NotificationDecision, NotificationKind};
pub use project::{CLINICAL_DATA_DIR, CLINICAL_MODALITY, Project, ProjectManifest, RecipientLists};
pub use stats::{ErrorEntry, IngestStats, Outcome};
pub use upload::{
    IdMapping, RawUploadResponse, RemoteErrorObject, SessionMode, UploadMessage, UploadResult,
};
