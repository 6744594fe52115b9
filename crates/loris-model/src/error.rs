//! Error types shared across the ingestion crates.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON config {path}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("failed to parse TOML config {path}: {message}")]
    Toml { path: PathBuf, message: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Errors raised while loading a project manifest.
///
/// These never abort a run: the project is excluded from discovery.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Faults talking to the remote ingestion service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read upload file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    /// Whether the fault means the credential is no longer valid.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }
}

/// Errors from the notification transport.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to launch mail transport {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mail transport exited with {status}: {stderr}")]
    Transport { status: String, stderr: String },

    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),
}
