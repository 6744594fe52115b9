//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Events always go to stderr. When a log directory is configured they are
//! duplicated to `loris_ingest_<YYYYMMDD_HHMMSS>.log` in that directory, and
//! only the newest `keep_files` run logs are kept.
//!
//! # Log Levels
//!
//! - `error`: fatal run faults, upload faults, rejected files
//! - `warn`: excluded projects, unregistered instruments, unread row counts
//! - `info`: run, project and instrument progress, summary counts
//! - `debug`: verbose mode; full fault detail, token refreshes
//! - `trace`: everything else

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// File name prefix of rotated run logs.
pub const LOG_FILE_PREFIX: &str = "loris_ingest_";

/// Crates whose events follow the configured level; everything else stays at warn.
const OWN_CRATES: [&str; 5] = [
    "loris_cli",
    "loris_core",
    "loris_ingest",
    "loris_model",
    "loris_transport",
];

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for the ingestion crates.
    pub level_filter: LevelFilter,
    /// Whether `RUST_LOG` may replace the configured filter.
    pub use_env_filter: bool,
    /// Whether to include timestamps in console output.
    pub with_timestamps: bool,
    /// Whether to include target (module path) in log output.
    pub with_target: bool,
    /// Whether to use ANSI colors on the console.
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Directory receiving a timestamped copy of the run log.
    pub log_dir: Option<PathBuf>,
    /// Number of run log files kept in `log_dir`.
    pub keep_files: usize,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_timestamps: true,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_dir: None,
            keep_files: loris_model::config::DEFAULT_KEEP_LOG_FILES,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns the run log file path when a log directory is configured.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created, or if a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<Option<PathBuf>> {
    let mut log_path = None;
    let mut file_writer = None;
    let mut removed = Vec::new();
    if let Some(dir) = &config.log_dir {
        let (path, file) = open_run_log(dir, Local::now())?;
        removed = prune_run_logs(dir, config.keep_files)?;
        log_path = Some(path);
        file_writer = Some(SharedFileWriter::new(file));
    }

    let console = fmt_layer(
        config.format,
        io::stderr,
        config.with_ansi,
        config.with_timestamps,
        config.with_target,
    );
    let file_layer = file_writer
        .map(|writer| fmt_layer(config.format, writer, false, true, config.with_target));

    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    for path in removed {
        tracing::debug!(path = %path.display(), "removed old run log");
    }
    Ok(log_path)
}

fn fmt_layer<S, W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
    timestamps: bool,
    target: bool,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(target);
    match (format, timestamps) {
        (LogFormat::Json, _) => layer.json().with_span_list(true).boxed(),
        (LogFormat::Compact, true) => layer.compact().boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
        (LogFormat::Pretty, true) => layer.boxed(),
        (LogFormat::Pretty, false) => layer.without_time().boxed(),
    }
}

/// File name of the run log started at `started`.
pub fn run_log_name(started: DateTime<Local>) -> String {
    format!("{LOG_FILE_PREFIX}{}.log", started.format("%Y%m%d_%H%M%S"))
}

fn open_run_log(dir: &Path, started: DateTime<Local>) -> io::Result<(PathBuf, File)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(run_log_name(started));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Delete all but the newest `keep` run logs in `dir`.
///
/// Run log names embed their start time, so name order is age order. Other
/// files in the directory are never touched. At least one log is kept.
pub fn prune_run_logs(dir: &Path, keep: usize) -> io::Result<Vec<PathBuf>> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_run_log(path))
        .collect();
    logs.sort();
    let excess = logs.len().saturating_sub(keep.max(1));
    let removed: Vec<PathBuf> = logs.into_iter().take(excess).collect();
    for path in &removed {
        fs::remove_file(path)?;
    }
    Ok(removed)
}

fn is_run_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log"))
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn new(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Build the event filter, letting `RUST_LOG` override it when allowed.
pub fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(default_directives(config.level_filter))
}

fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    let external = LevelFilter::WARN.to_string().to_lowercase();
    let own: Vec<String> = OWN_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect();
    format!("{external},{}", own.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_level_to_own_crates() {
        let directives = default_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("loris_core=debug"));
        assert!(directives.contains("loris_transport=debug"));
    }

    #[test]
    fn run_log_detection() {
        assert!(is_run_log(Path::new("/x/loris_ingest_20261019_090000.log")));
        assert!(!is_run_log(Path::new("/x/loris_ingest_20261019_090000.txt")));
        assert!(!is_run_log(Path::new("/x/clinical_ingest.log")));
    }
}
