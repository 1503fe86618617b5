//! Configuration module

use crate::error::{Result, TimerError};
use crate::measurement::DEFAULT_NAME;
use crate::sink::OutputTarget;
use crate::unit::TimeUnit;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "BLOCK_TIMER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/block-timer.json";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timer defaults
    pub timer: TimerConfig,

    /// Where reports go
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// One of `sec`, `milis`, `nano`
    pub default_unit: String,
    pub default_name: String,
    pub report_on_unwind: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub target: OutputTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_output: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_unit: TimeUnit::default().label().to_string(),
            default_name: DEFAULT_NAME.to_string(),
            report_on_unwind: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TimerConfig {
    /// Configured unit; a typo here is an error, not a silent fallback
    pub fn unit(&self) -> Result<TimeUnit> {
        self.default_unit
            .parse()
            .map_err(|_| TimerError::Config(format!("timer.default_unit: unknown unit `{}`", self.default_unit)))
    }
}

impl Config {
    /// Load config from environment
    pub fn from_env() -> Result<Self> {
        // Try to load from file first
        let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.timer.unit()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
