//! File logging.
//!
//! The program owns stdout and the terminal, so diagnostics go to a file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::error::{Error, Result};

pub const DEFAULT_LOG_PREFIX: &str = "tealeaf";
pub const LOG_FILTER_ENV: &str = "TEALEAF_LOG";

/// Append `tracing` output to `<prefix>.log`, filtered by `TEALEAF_LOG` (default `info`).
///
/// Fails if the file cannot be opened or a global subscriber is already installed.
pub fn init_file_logging(prefix: &str) -> Result<()> {
    let path = log_path(prefix);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| Error::Logging(format!("{path}: {err}")))?;

    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .without_time()
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}

/// Install file logging when `TEALEAF_LOG_FILE` names a prefix. Returns whether it did.
pub fn init_from_env(config: &EnvConfig) -> Result<bool> {
    match config.log_file.as_deref() {
        Some(prefix) => init_file_logging(prefix).map(|()| true),
        None => Ok(false),
    }
}

fn log_path(prefix: &str) -> String {
    let prefix = if prefix.trim().is_empty() {
        DEFAULT_LOG_PREFIX
    } else {
        prefix
    };
    format!("{prefix}.log")
}
