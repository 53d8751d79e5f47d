//! File logging
//!
//! Log lines go to `studylog.log` in the data directory so they never draw
//! over the TUI. `STUDYLOG_LOG` overrides the configured filter.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "studylog.log";
pub const LOG_ENV_VAR: &str = "STUDYLOG_LOG";

/// Install the global tracing subscriber. Returns the log file path.
pub fn init_logging(data_dir: &Path, default_filter: &str) -> Result<PathBuf> {
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(path)
}
