//! Error types for instrument file inspection.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reasons an instrument file cannot be uploaded.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Failed to stat or open the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid delimited text.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// No header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header lacks one or more mandatory columns.
    #[error("missing mandatory column(s) {}: {path}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

impl InspectError {
    pub(crate) fn csv(path: &Path, error: &csv::Error) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Result type for inspection operations.
pub type Result<T> = std::result::Result<T, InspectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_display_names_every_column() {
        let err = InspectError::MissingColumns {
            path: PathBuf::from("/data/bmi.csv"),
            columns: vec!["PSCID".to_string(), "Visit_label".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing mandatory column(s) PSCID, Visit_label: /data/bmi.csv"
        );
    }
}
