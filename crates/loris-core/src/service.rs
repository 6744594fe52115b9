//! Seams to the external collaborators: the ingestion service and the mail transport.

use std::path::Path;

use loris_model::{NotifyError, RawUploadResponse, ServiceError, SessionMode};

/// Remote clinical-data ingestion service.
///
/// Implementations own authentication state and any transport timeouts; the
/// orchestrator calls these sequentially and never concurrently for one project.
pub trait IngestService {
    /// Obtain or refresh the bearer credential.
    fn authenticate(&self) -> Result<(), ServiceError>;

    /// Whether the instrument schema is registered on the remote side.
    fn instrument_exists(&self, instrument: &str) -> Result<bool, ServiceError>;

    /// Upload one instrument file.
    fn upload_instrument(
        &self,
        instrument: &str,
        file: &Path,
        mode: SessionMode,
    ) -> Result<RawUploadResponse, ServiceError>;
}

/// Outbound notification transport.
pub trait Notifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}
