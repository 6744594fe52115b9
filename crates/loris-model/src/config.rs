use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default lifetime of an API bearer token before it is refreshed.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Default HTTP request timeout applied by the service client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default number of rotated run logs kept in the log directory.
pub const DEFAULT_KEEP_LOG_FILES: usize = 10;

/// Top-level ingestion configuration, consumed once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

/// Connection parameters for the remote ingestion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_sendmail")]
    pub sendmail_path: PathBuf,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: default_from(),
            sendmail_path: default_sendmail(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving the rotated run log. Console only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_keep_files")]
    pub keep_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            keep_files: DEFAULT_KEEP_LOG_FILES,
        }
    }
}

/// A named group of projects sharing a storage root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    pub base_path: PathBuf,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

/// A project reference inside a collection; the details live in its manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn default_token_lifetime() -> u64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_from() -> String {
    "loris-ingest@localhost".to_string()
}

fn default_sendmail() -> PathBuf {
    PathBuf::from("/usr/sbin/sendmail")
}

fn default_keep_files() -> usize {
    DEFAULT_KEEP_LOG_FILES
}

fn enabled_by_default() -> bool {
    true
}
