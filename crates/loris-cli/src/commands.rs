use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::ColorChoice;
use tracing::info;
use tracing::level_filters::LevelFilter;

use loris_core::{RunController, RunOptions, RunReport};
use loris_ingest::{DiscoveryFilter, load_config, resolve_config_path};
use loris_model::{IngestConfig, LoggingConfig};
use loris_transport::{LorisClient, notifier_from_config};

use crate::cli::{Cli, LogFormatArg, LogLevelArg};
use crate::logging::{LogConfig, LogFormat};

/// Load the configuration named by `--config`, the environment, or the default path.
pub fn load_run_config(cli: &Cli) -> Result<IngestConfig> {
    let path = resolve_config_path(cli.config.as_deref());
    load_config(&path).with_context(|| format!("load configuration {}", path.display()))
}

/// Execute one ingestion run against the configured LORIS instance.
pub fn run_ingest(cli: &Cli, config: &IngestConfig) -> Result<RunReport> {
    let client = LorisClient::new(&config.api).context("build LORIS API client")?;
    let notifier = notifier_from_config(&config.mail);
    let options = run_options_from_cli(cli);
    info!(
        base_url = %config.api.base_url,
        collections = config.collections.len(),
        dry_run = options.dry_run,
        "starting clinical ingestion"
    );
    let mut controller =
        RunController::new(&client, notifier.as_ref(), &config.collections, options);
    let report = controller.run().context("ingestion run aborted")?;
    Ok(report)
}

/// Translate the selection flags into run options.
pub fn run_options_from_cli(cli: &Cli) -> RunOptions {
    let filter = if cli.all {
        DiscoveryFilter::all()
    } else {
        DiscoveryFilter {
            collection: cli.collection.clone(),
            project: cli.project.clone(),
        }
    };
    RunOptions {
        filter,
        instrument: cli.instrument.clone(),
        dry_run: cli.dry_run,
        verbose: cli.verbose(),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
///
/// `--log-level` beats `-v`/`-q`, which beat `RUST_LOG`. `--log-dir` beats
/// the configuration file's `logging.log_dir`.
pub fn log_config_from_cli(cli: &Cli, logging: &LoggingConfig) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        keep_files: logging.keep_files,
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_dir = cli.log_dir.clone().or_else(|| logging.log_dir.clone());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stderr().is_terminal(),
    };
    config
}
