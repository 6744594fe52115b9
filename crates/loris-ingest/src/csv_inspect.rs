//! Instrument file inspection: readability, mandatory columns, row count.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::error::{InspectError, Result};

/// Columns every instrument file must carry: subject code and visit label.
pub const MANDATORY_COLUMNS: [&str; 2] = ["PSCID", "Visit_label"];

/// What was learned about an instrument file without modifying it.
#[derive(Debug, Clone)]
pub struct CsvInspection {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub headers: Vec<String>,
    /// Data rows, header excluded.
    pub row_count: u64,
}

impl CsvInspection {
    /// Mandatory columns absent from the header, in declaration order.
    pub fn missing_columns(&self) -> Vec<String> {
        missing_mandatory_columns(&self.headers)
    }
}

fn normalize_header(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim()
        .trim_matches('\u{feff}')
        .to_string()
}

/// Read the header and count data rows.
///
/// Cell contents are never decoded, so files in a legacy encoding are
/// inspected like any other; the remote service judges the content.
pub fn inspect_csv(path: &Path) -> Result<CsvInspection> {
    let metadata = std::fs::metadata(path).map_err(|source| InspectError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| InspectError::csv(path, &e))?;
    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| InspectError::csv(path, &e))?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(InspectError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let mut row_count = 0u64;
    for record in reader.byte_records() {
        record.map_err(|e| InspectError::csv(path, &e))?;
        row_count += 1;
    }
    Ok(CsvInspection {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        headers,
        row_count,
    })
}

/// Count data rows (header excluded). Read-only and repeatable.
pub fn count_rows(path: &Path) -> Result<u64> {
    inspect_csv(path).map(|inspection| inspection.row_count)
}

/// Mandatory columns absent from `headers`.
pub fn missing_mandatory_columns(headers: &[String]) -> Vec<String> {
    MANDATORY_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .map(|column| (*column).to_string())
        .collect()
}

/// Inspect a file and require every mandatory column.
pub fn validate_instrument_file(path: &Path) -> Result<CsvInspection> {
    let inspection = inspect_csv(path)?;
    let missing = inspection.missing_columns();
    if !missing.is_empty() {
        return Err(InspectError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }
    Ok(inspection)
}
