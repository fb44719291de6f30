use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store files (default: XDG data dir)
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Key the task list is stored under
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            dir: None,
            key: default_key(),
        }
    }
}

fn default_key() -> String {
    "todos".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Sampling cadence in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_tick_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of error, warn, info, debug, trace
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Hex color overrides for the daytime palette
    #[serde(default)]
    pub day_colors: HashMap<String, String>,
    /// Hex color overrides for the night palette
    #[serde(default)]
    pub night_colors: HashMap<String, String>,
}
