//! Bridge Configuration
//!
//! Startup configuration loaded from a JSON file. Connection settings are
//! validated when the configuration is loaded and again when a connector is
//! built from it, so a missing connection string fails at construction time.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("A connection string is required")]
    MissingConnectionString,

    #[error("{0} must be > 0")]
    NotPositive(&'static str),
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection string handed to the session connector (required)
    #[serde(default)]
    pub connection_string: String,

    /// Command timeout for procedure calls (default: 360000 seconds)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_command_timeout_secs() -> u64 {
    360_000
}

impl ConnectionConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.connection_string.trim().is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::NotPositive("command_timeout_secs"));
        }
        Ok(())
    }
}

/// Top-level bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub connection: ConnectionConfig,

    /// Include tokenizer details in "could not parse" responses.
    /// Leave off in production.
    #[serde(default)]
    pub diagnostics: bool,

    /// Maximum request body accepted by the extractor (default: 4 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

impl BridgeConfig {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            diagnostics: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }

    /// Enable diagnostic details in parse errors
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: BridgeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.connection.validate()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::NotPositive("max_body_bytes"));
        }
        Ok(())
    }
}
