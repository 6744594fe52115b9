//! Ingestion orchestration engine.
//!
//! - **Interpreter** (`interpret`): upload response → counts, identities, errors
//! - **Processor** (`processor`): one instrument → success, failed or skipped
//! - **Notification policy** (`notify`): project stats → recipients and message
//! - **Controller** (`controller`): the run state machine and its report
//!
//! The remote service and mail transport are reached only through the traits
//! in [`service`].

pub mod controller;
pub mod interpret;
pub mod journal;
pub mod notify;
pub mod processor;
pub mod service;

pub use controller::{
    NotificationReport, ProjectReport, RunController, RunError, RunOptions, RunReport, RunState,
};
pub use interpret::{interpret_upload, message_text, parse_saved_counts};
pub use journal::{JOURNAL_FILE, ProjectJournal};
pub use notify::{DispatchSummary, decide_notification, dispatch_notification};
pub use processor::{ERROR_PREVIEW_LIMIT, ProcessOptions, process_instrument};
pub use service::{IngestService, Notifier};
