//! Configuration module for Barrage
//!
//! Provides layered configuration loading from files, environment variables,
//! and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`BARRAGE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use barrage::config::BarrageConfig;
//!
//! // Load defaults
//! let config = BarrageConfig::default();
//! assert_eq!(config.load.bots, 1);
//!
//! // Parse from TOML
//! let toml = r#"
//! [load]
//! bots = 5
//! "#;
//! let config: BarrageConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.load.bots, 5);
//! ```

pub mod error;
pub mod logging;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Target endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TargetConfig {
    /// API endpoint URL for every dispatch.
    pub url: String,
}

/// Load-shape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of concurrent bots.
    pub bots: usize,
    /// Seconds between ticks per bot.
    pub interval_seconds: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            bots: 1,
            interval_seconds: 1,
        }
    }
}

/// Sample source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the sample file; `.json` selects JSON decoding, anything
    /// else is treated as CSV.
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.json"),
        }
    }
}

/// Journal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Entries kept for display.
    pub capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            capacity: crate::journal::DEFAULT_CAPACITY,
        }
    }
}

/// Response persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Append successful response bodies to the results log.
    pub save_responses: bool,
    /// Directory holding the response log, created if absent.
    pub directory: PathBuf,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            save_responses: false,
            directory: PathBuf::from("results"),
        }
    }
}

/// Unified configuration for a Barrage run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BarrageConfig {
    /// Target endpoint
    pub target: TargetConfig,
    /// Bot count and tick interval
    pub load: LoadConfig,
    /// Sample file source
    pub data: DataConfig,
    /// Operator journal
    pub journal: JournalConfig,
    /// Response persistence
    pub results: ResultsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl BarrageConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports BARRAGE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("BARRAGE_API") {
            self.target.url = url;
        }
        if let Ok(bots) = std::env::var("BARRAGE_BOTS") {
            if let Ok(b) = bots.parse() {
                self.load.bots = b;
            }
        }
        if let Ok(interval) = std::env::var("BARRAGE_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.load.interval_seconds = i;
            }
        }
        if let Ok(data) = std::env::var("BARRAGE_DATA") {
            self.data.path = PathBuf::from(data);
        }

        if let Ok(level) = std::env::var("BARRAGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("BARRAGE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(save) = std::env::var("BARRAGE_SAVE_RESPONSES") {
            self.results.save_responses = save.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.url.is_empty() {
            return Err(ConfigError::Validation {
                field: "target.url".to_string(),
                message: "API endpoint URL is required".to_string(),
            });
        }
        if self.load.bots == 0 {
            return Err(ConfigError::Validation {
                field: "load.bots".to_string(),
                message: "bot count must be non-zero".to_string(),
            });
        }
        if self.load.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "load.interval_seconds".to_string(),
                message: "tick interval must be non-zero".to_string(),
            });
        }
        if self.journal.capacity == 0 {
            return Err(ConfigError::Validation {
                field: "journal.capacity".to_string(),
                message: "journal capacity must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
