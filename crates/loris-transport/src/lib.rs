//! Transports for the external collaborators of an ingestion run.
//!
//! - [`api::LorisClient`]: the LORIS REST API, implementing `IngestService`
//! - [`mail`]: sendmail-backed and log-only notifiers

pub mod api;
pub mod mail;

pub use api::LorisClient;
pub use mail::{
    LogNotifier, SendmailNotifier, compose_message, notifier_from_config, validate_recipient,
};
