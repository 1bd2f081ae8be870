//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Log every diff-renderer decision (`TEALEAF_DEBUG_REDRAW=1`).
    pub debug_redraw: bool,
    /// File prefix for [`crate::logging::init_file_logging`] (`TEALEAF_LOG_FILE`).
    pub log_file: Option<String>,
    /// Keep the terminal line-buffered (`TEALEAF_NO_RAW=1`).
    pub no_raw: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug_redraw: env_flag("TEALEAF_DEBUG_REDRAW"),
            log_file: env_string_opt("TEALEAF_LOG_FILE"),
            no_raw: env_flag("TEALEAF_NO_RAW"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
