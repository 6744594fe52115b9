//! CLI library components for clinical ingestion.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
