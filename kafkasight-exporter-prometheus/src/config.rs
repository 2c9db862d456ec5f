//! Configuration for the Prometheus bridge.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlusherConfig {
    /// Prometheus namespace for exported families (default: "kafka").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Prometheus subsystem for exported families (default: "client").
    #[serde(default = "default_subsystem")]
    pub subsystem: String,

    /// Seconds between flush cycles in periodic mode (default: 10).
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,

    /// Regular expression selecting which source metrics to export.
    ///
    /// The empty string disables all export; absence of an explicit pattern
    /// means "export nothing", not "export everything".
    #[serde(default)]
    pub filter_pattern: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_namespace() -> String {
    "kafka".to_string()
}

fn default_subsystem() -> String {
    "client".to_string()
}

fn default_flush_interval() -> u64 {
    10
}

impl Default for FlusherConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
            flush_interval_secs: default_flush_interval(),
            filter_pattern: String::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FlusherConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: FlusherConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: FlusherConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flush_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "flush_interval_secs must be > 0".to_string(),
            ));
        }

        if self.namespace.is_empty() {
            return Err(ConfigError::Validation(
                "namespace must not be empty".to_string(),
            ));
        }

        if self.subsystem.is_empty() {
            return Err(ConfigError::Validation(
                "subsystem must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
