use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lofi: LofiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the semester snapshot JSON.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

/// Timing knobs for the lofi player plumbing.  The defaults match the
/// behavior the feature was tuned against; they are exposed here rather than
/// hard-coded so a slow machine can stretch them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LofiConfig {
    /// Delay before the post-start jump to the selected playlist index.
    #[serde(default = "default_seek_delay_ms")]
    pub seek_delay_ms: u64,
    /// Interval between playback-confirmation polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polls issued before giving up on confirmation.
    #[serde(default = "default_poll_attempt_cap")]
    pub poll_attempt_cap: u32,
    /// Control-socket connect attempts (the player may still be starting).
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    /// Delay between connect attempts.
    #[serde(default = "default_connect_retry_delay_ms")]
    pub connect_retry_delay_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

impl Default for LofiConfig {
    fn default() -> Self {
        Self {
            seek_delay_ms: default_seek_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_attempt_cap: default_poll_attempt_cap(),
            connect_retries: default_connect_retries(),
            connect_retry_delay_ms: default_connect_retry_delay_ms(),
        }
    }
}

fn default_data_file() -> PathBuf {
    platform::data_dir().join("semester.json")
}

fn default_seek_delay_ms() -> u64 {
    200
}

fn default_poll_interval_ms() -> u64 {
    400
}

fn default_poll_attempt_cap() -> u32 {
    30
}

fn default_connect_retries() -> u32 {
    6
}

fn default_connect_retry_delay_ms() -> u64 {
    50
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
