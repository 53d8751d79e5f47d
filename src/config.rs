use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

/// Application configuration, read from `config.toml` in the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// TUI refresh interval in milliseconds (default: 1000)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Chapters listed per subject in reports and the stats pane (default: 5)
    #[serde(default = "default_top_chapters_limit")]
    pub top_chapters_limit: usize,

    /// Log filter used when STUDYLOG_LOG is not set (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Days shown in the daily breakdown of reports (default: 14)
    #[serde(default = "default_report_days")]
    pub report_days: usize,
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_top_chapters_limit() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_report_days() -> usize {
    14
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            top_chapters_limit: default_top_chapters_limit(),
            log_level: default_log_level(),
            report_days: default_report_days(),
        }
    }
}

impl Config {
    /// Load configuration from the data directory, or return default if not found
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = config_file_path(data_dir);
        if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }
}

/// Get the path to the config file
pub fn config_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}
