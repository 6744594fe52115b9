//! CLI argument definitions for clinical ingestion.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "loris-ingest",
    version,
    about = "Ingest clinical instrument data files into LORIS",
    long_about = "Discover projects from the configured collections, validate each \
                  clinical instrument CSV and upload it to LORIS.\n\n\
                  One summary notification is sent per project. The exit status is \
                  non-zero when any instrument failed.",
    group(
        ArgGroup::new("scope")
            .required(true)
            .multiple(true)
            .args(["all", "collection", "project"])
    )
)]
pub struct Cli {
    /// Process every enabled collection and project.
    #[arg(long, conflicts_with_all = ["collection", "project"])]
    pub all: bool,

    /// Process only this collection.
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Process only this project.
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,

    /// Process only this instrument within each selected project.
    #[arg(long, value_name = "NAME")]
    pub instrument: Option<String>,

    /// Validate files and report without uploading or sending mail.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Configuration file (JSON or TOML; default: $LORIS_INGEST_CONFIG or config/loris.json).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for verbose detail, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Also write the run log to a timestamped file in this directory.
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Verbose mode: full error detail in the run log.
    pub fn verbose(&self) -> bool {
        self.verbosity.tracing_level_filter() >= LevelFilter::DEBUG
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
