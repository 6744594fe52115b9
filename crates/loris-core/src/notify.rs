//! Notification policy and dispatch.

use std::fmt::Write as _;

use loris_model::{
    CLINICAL_MODALITY, IngestStats, NotificationDecision, NotificationKind, Project,
};
use tracing::{info, warn};

use crate::service::Notifier;

/// Decide recipients, subject and body for a finished project.
///
/// Any failure selects the `on_error` list; otherwise `on_success` is used,
/// including for a project that had nothing to upload.
pub fn decide_notification(project: &Project, stats: &IngestStats) -> NotificationDecision {
    let lists = project.recipients(CLINICAL_MODALITY);
    let (kind, recipients) = if stats.has_failures() {
        (NotificationKind::Failed, lists.on_error)
    } else {
        (NotificationKind::Success, lists.on_success)
    };
    NotificationDecision {
        kind,
        recipients,
        subject: format!("{}: {} Clinical Ingestion", kind.label(), project.name()),
        body: render_body(project, stats, kind),
    }
}

fn render_body(project: &Project, stats: &IngestStats, kind: NotificationKind) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "Project: {}", project.name());
    let _ = writeln!(body, "Collection: {}", project.collection);
    let _ = writeln!(body, "Modality: {CLINICAL_MODALITY}");
    body.push('\n');
    let _ = writeln!(body, "Total files processed: {}", stats.total);
    let _ = writeln!(body, "Successful: {}", stats.success);
    let _ = writeln!(body, "Failed: {}", stats.failed);
    let _ = writeln!(body, "Skipped: {}", stats.skipped);
    let _ = writeln!(body, "Rows uploaded: {}", stats.rows_uploaded);
    let _ = writeln!(body, "Rows already present: {}", stats.rows_skipped);
    let _ = writeln!(body, "Candidates created: {}", stats.candidates_created);

    if !stats.errors.is_empty() {
        body.push_str("\nErrors:\n");
        for entry in &stats.errors {
            let _ = writeln!(body, "- {} ({})", entry.instrument, entry.file.display());
            for message in &entry.messages {
                let _ = writeln!(body, "    {message}");
            }
        }
    }

    body.push('\n');
    let closing = match kind {
        NotificationKind::Failed => {
            "One or more clinical instruments failed to ingest. Review the errors above and the run log."
        }
        NotificationKind::Success if stats.attempted() == 0 => {
            "No clinical instrument files were found to ingest."
        }
        NotificationKind::Success => "All clinical instruments were ingested successfully.",
    };
    body.push_str(closing);
    body.push('\n');
    body
}

/// Result of sending one decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: Vec<String>,
    /// Recipients whose delivery failed, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Send one message per recipient; a failed delivery does not stop the rest.
pub fn dispatch_notification<N>(notifier: &N, decision: &NotificationDecision) -> DispatchSummary
where
    N: Notifier + ?Sized,
{
    let mut summary = DispatchSummary::default();
    if !decision.should_send() {
        info!(subject = %decision.subject, "no recipients configured, notification not sent");
        return summary;
    }
    for recipient in &decision.recipients {
        match notifier.send(recipient, &decision.subject, &decision.body) {
            Ok(()) => {
                info!(recipient = %recipient, subject = %decision.subject, "notification sent");
                summary.sent.push(recipient.clone());
            }
            Err(err) => {
                warn!(recipient = %recipient, error = %err, "notification delivery failed");
                summary.failed.push((recipient.clone(), err.to_string()));
            }
        }
    }
    summary
}
