//! LORIS clinical ingestion CLI.

use clap::Parser;
use tracing::error;

use loris_cli::cli::Cli;
use loris_cli::commands::{load_run_config, log_config_from_cli, run_ingest};
use loris_cli::logging::init_logging;
use loris_cli::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let config = match load_run_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: fatal: {error:#}");
            std::process::exit(1);
        }
    };
    let log_config = log_config_from_cli(&cli, &config.logging);
    let log_file = match init_logging(&log_config) {
        Ok(path) => path,
        Err(error) => {
            eprintln!("error: failed to initialize logging: {error}");
            std::process::exit(1);
        }
    };
    let exit_code = match run_ingest(&cli, &config) {
        Ok(report) => {
            print_summary(&report, log_file.as_deref());
            report.exit_code()
        }
        Err(error) => {
            error!(error = %format!("{error:#}"), "fatal error, run aborted");
            1
        }
    };
    std::process::exit(exit_code);
}
