use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Classification of one instrument's processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error recorded against one instrument file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub instrument: String,
    pub file: PathBuf,
    pub messages: Vec<String>,
}

impl ErrorEntry {
    pub fn new(instrument: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            instrument: instrument.into(),
            file: file.into(),
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = String>) -> Self {
        self.messages.extend(messages);
        self
    }
}

/// Ingestion counters for one project or for a whole run.
///
/// Counters only grow; a project value is folded into the run value with
/// [`IngestStats::absorb`] once the project is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub skipped: u64,
    pub rows_uploaded: u64,
    pub rows_skipped: u64,
    pub candidates_created: u64,
    pub errors: Vec<ErrorEntry>,
}

impl IngestStats {
    /// Count one instrument outcome.
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Success => self.success += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn add_rows(&mut self, uploaded: u64, skipped: u64) {
        self.rows_uploaded += uploaded;
        self.rows_skipped += skipped;
    }

    pub fn add_candidates(&mut self, created: u64) {
        self.candidates_created += created;
    }

    pub fn push_error(&mut self, entry: ErrorEntry) {
        self.errors.push(entry);
    }

    /// Fold another stats value into this one.
    pub fn absorb(&mut self, other: &IngestStats) {
        self.total += other.total;
        self.success += other.success;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.rows_uploaded += other.rows_uploaded;
        self.rows_skipped += other.rows_skipped;
        self.candidates_created += other.candidates_created;
        self.errors.extend(other.errors.iter().cloned());
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Files that were actually attempted (everything but skips).
    pub fn attempted(&self) -> u64 {
        self.success + self.failed
    }
}
