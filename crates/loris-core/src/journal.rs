//! Per-project journal written to a manifest's `log_path`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use loris_model::{IngestStats, Outcome};

/// File name created inside the project's log directory.
pub const JOURNAL_FILE: &str = "clinical_ingest.log";

/// Append-only, line-per-event record of one project's processing.
#[derive(Debug)]
pub struct ProjectJournal {
    file: File,
}

impl ProjectJournal {
    /// Open (creating if needed) the journal inside `dir`.
    pub fn open(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(JOURNAL_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { file })
    }

    fn line(&mut self, level: &str, text: &str) -> io::Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.file, "{stamp} {level:<5} {text}")
    }

    pub fn start(&mut self, project: &str, dry_run: bool) -> io::Result<()> {
        let mode = if dry_run { " (dry run)" } else { "" };
        self.line("INFO", &format!("clinical ingestion started for {project}{mode}"))
    }

    pub fn record_outcome(&mut self, instrument: &str, outcome: Outcome) -> io::Result<()> {
        let level = match outcome {
            Outcome::Failed => "ERROR",
            Outcome::Success | Outcome::Skipped => "INFO",
        };
        self.line(level, &format!("{instrument}: {outcome}"))
    }

    pub fn finish(&mut self, stats: &IngestStats) -> io::Result<()> {
        self.line(
            "INFO",
            &format!(
                "finished: total={} success={} failed={} skipped={} rows_uploaded={} rows_skipped={} candidates_created={}",
                stats.total,
                stats.success,
                stats.failed,
                stats.skipped,
                stats.rows_uploaded,
                stats.rows_skipped,
                stats.candidates_created
            ),
        )?;
        self.file.flush()
    }
}
