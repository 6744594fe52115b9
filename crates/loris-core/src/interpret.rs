//! Upload response interpretation.
//!
//! The remote service reports row counts only inside a free-text message such
//! as `Saved 7 out of 10`. Counts extracted here are best-effort telemetry;
//! orchestration decisions rely on the `success` flag alone.

use std::sync::LazyLock;

use loris_model::{RawUploadResponse, UploadMessage, UploadResult};
use regex::Regex;

static SAVED_ROWS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)saved\s+(\d+)\s+out\s+of\s+(\d+)").expect("Invalid saved-rows regex")
});

/// Message used when a rejection carries no text at all.
const EMPTY_REJECTION: &str = "upload rejected without an error message";

/// Extract `(saved, total)` from a `Saved N out of M` message.
pub fn parse_saved_counts(message: &str) -> Option<(u64, u64)> {
    let captures = SAVED_ROWS_REGEX.captures(message)?;
    let saved = captures.get(1)?.as_str().parse().ok()?;
    let total = captures.get(2)?.as_str().parse().ok()?;
    Some((saved, total))
}

/// Flatten the message into text for logging.
pub fn message_text(message: &UploadMessage) -> String {
    match message {
        UploadMessage::Text(text) => text.clone(),
        UploadMessage::Errors(errors) => errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// Normalize a rejection message into one entry per error.
fn error_messages(message: UploadMessage) -> Vec<String> {
    let messages: Vec<String> = match message {
        UploadMessage::Text(text) => vec![text],
        UploadMessage::Errors(errors) => errors.into_iter().map(|error| error.message).collect(),
    };
    let messages: Vec<String> = messages
        .into_iter()
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .collect();
    if messages.is_empty() {
        vec![EMPTY_REJECTION.to_string()]
    } else {
        messages
    }
}

/// Turn a raw upload response into counts, created identities and errors.
pub fn interpret_upload(raw: RawUploadResponse) -> UploadResult {
    let created = raw.id_mapping.unwrap_or_default();
    let message = message_text(&raw.message);
    if !raw.success {
        return UploadResult {
            success: false,
            created,
            errors: error_messages(raw.message),
            message,
            ..UploadResult::default()
        };
    }
    let (rows_saved, rows_skipped, counts_reported) = match parse_saved_counts(&message) {
        Some((saved, total)) => (saved, total.saturating_sub(saved), true),
        None => (0, 0, false),
    };
    UploadResult {
        success: true,
        rows_saved,
        rows_skipped,
        counts_reported,
        created,
        errors: Vec::new(),
        message,
    }
}
