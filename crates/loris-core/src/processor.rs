//! Per-instrument processing: inspect, upload, interpret, classify.

use std::path::Path;
use std::time::Instant;

use loris_ingest::{InspectError, validate_instrument_file};
use loris_model::{ErrorEntry, IngestStats, Outcome, Project, ServiceError, SessionMode};
use tracing::{debug, error, info, info_span, warn};

use crate::interpret::interpret_upload;
use crate::service::IngestService;

/// Number of remote error messages shown in the log before truncating.
pub const ERROR_PREVIEW_LIMIT: usize = 5;

/// Run-wide switches that affect instrument processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Validate everything but never call the upload endpoint.
    pub dry_run: bool,
    /// Log full diagnostic detail for remote faults.
    pub verbose: bool,
}

/// Process one instrument of a project and record its effects in `stats`.
///
/// Rows, created candidates and error entries are added to `stats`; the
/// returned outcome is left for the caller to count.
pub fn process_instrument<S>(
    service: &S,
    project: &Project,
    instrument: &str,
    options: ProcessOptions,
    stats: &mut IngestStats,
) -> Outcome
where
    S: IngestService + ?Sized,
{
    let file = project.instrument_file(instrument);
    let span = info_span!(
        "instrument",
        project = %project.name(),
        instrument = %instrument,
    );
    let _guard = span.enter();

    if !file.is_file() {
        debug!(file = %file.display(), "instrument file not present, skipping");
        return Outcome::Skipped;
    }

    let inspection = match validate_instrument_file(&file) {
        Ok(inspection) => inspection,
        Err(err) => {
            error!(file = %file.display(), error = %err, "instrument file failed validation");
            stats.push_error(ErrorEntry::new(instrument, &file).with_message(validation_message(&err)));
            return Outcome::Failed;
        }
    };
    info!(
        file = %file.display(),
        size_bytes = inspection.size_bytes,
        row_count = inspection.row_count,
        "instrument file ready"
    );

    match service.instrument_exists(instrument) {
        Ok(true) => {}
        Ok(false) => warn!("instrument is not registered on the remote service, uploading anyway"),
        Err(err) => warn!(error = %err, "could not check instrument registration, uploading anyway"),
    }

    if options.dry_run {
        info!(row_count = inspection.row_count, "dry run: upload skipped");
        return Outcome::Success;
    }

    upload(service, instrument, &file, options, stats)
}

fn upload<S>(
    service: &S,
    instrument: &str,
    file: &Path,
    options: ProcessOptions,
    stats: &mut IngestStats,
) -> Outcome
where
    S: IngestService + ?Sized,
{
    let start = Instant::now();
    let raw = match service.upload_instrument(instrument, file, SessionMode::CreateSessions) {
        Ok(raw) => raw,
        Err(err) => {
            record_fault(&err, instrument, file, options, stats);
            return Outcome::Failed;
        }
    };
    let duration_ms = start.elapsed().as_millis();
    let result = interpret_upload(raw);

    if !result.success {
        log_error_preview(&result.errors);
        error!(
            error_count = result.errors.len(),
            duration_ms,
            "upload rejected by remote service"
        );
        stats.push_error(ErrorEntry::new(instrument, file).with_messages(result.errors));
        return Outcome::Failed;
    }

    if result.counts_reported {
        info!(
            rows_saved = result.rows_saved,
            rows_skipped = result.rows_skipped,
            duration_ms,
            "upload complete"
        );
    } else {
        warn!(
            response = %result.message,
            duration_ms,
            "upload succeeded but row counts could not be read from the response"
        );
    }
    stats.add_rows(result.rows_saved, result.rows_skipped);

    // Mappings for new visits of existing subjects arrive without saved rows.
    if result.rows_saved > 0 && !result.created.is_empty() {
        debug!(created = result.created.len(), "new candidates created");
        stats.add_candidates(result.created.len() as u64);
    }
    Outcome::Success
}

fn record_fault(
    err: &ServiceError,
    instrument: &str,
    file: &Path,
    options: ProcessOptions,
    stats: &mut IngestStats,
) {
    if options.verbose {
        error!(error = ?err, "upload failed");
    } else {
        error!(error = %err, "upload failed");
    }
    stats.push_error(ErrorEntry::new(instrument, file).with_message(format!("upload failed: {err}")));
}

fn log_error_preview(errors: &[String]) {
    for line in error_preview(errors) {
        error!(detail = %line, "remote error");
    }
}

/// The first [`ERROR_PREVIEW_LIMIT`] messages, then a count of the rest.
fn error_preview(errors: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = errors.iter().take(ERROR_PREVIEW_LIMIT).cloned().collect();
    if errors.len() > ERROR_PREVIEW_LIMIT {
        lines.push(format!(
            "... and {} more error(s)",
            errors.len() - ERROR_PREVIEW_LIMIT
        ));
    }
    lines
}

fn validation_message(err: &InspectError) -> String {
    match err {
        InspectError::MissingColumns { columns, .. } => {
            format!("missing mandatory column(s): {}", columns.join(", "))
        }
        other => format!("file not readable: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(count: usize) -> Vec<String> {
        (1..=count).map(|row| format!("row {row}: unknown visit")).collect()
    }

    #[test]
    fn preview_truncates_after_limit() {
        let preview = error_preview(&messages(8));
        assert_eq!(preview.len(), ERROR_PREVIEW_LIMIT + 1);
        assert_eq!(preview[0], "row 1: unknown visit");
        assert_eq!(preview[4], "row 5: unknown visit");
        assert_eq!(preview[5], "... and 3 more error(s)");
    }

    #[test]
    fn preview_at_limit_has_no_tail() {
        let preview = error_preview(&messages(ERROR_PREVIEW_LIMIT));
        assert_eq!(preview, messages(ERROR_PREVIEW_LIMIT));
    }
}
