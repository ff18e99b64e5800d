//! Configuration management for expenseweb
//!
//! This module handles loading, validation, and management of
//! expenseweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

/// Log levels accepted in `logging.level`
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Cross-origin settings for the browser client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// CORS settings
    #[serde(default)]
    pub cors: CorsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// The result is not validated: overrides from the environment and the
    /// command line are applied first, then the caller runs [`Config::validate`].
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            let path = path.to_string_lossy().to_string();
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound { path }
            } else {
                ConfigError::IoError { path }
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.host".to_string(),
                reason: "Host must not be empty".to_string(),
            });
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cors.allowed_origins".to_string(),
                reason: "At least one origin must be allowed".to_string(),
            });
        }

        for origin in &self.cors.allowed_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "cors.allowed_origins".to_string(),
                    reason: format!("Origin '{}' must start with http:// or https://", origin),
                });
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Apply overrides taken from the process environment (`PORT`)
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_port_override(std::env::var("PORT").ok())
    }

    /// Override the server port with a raw value, ignoring blanks
    pub fn apply_port_override(&mut self, raw: Option<String>) -> ConfigResult<()> {
        let Some(raw) = raw else {
            return Ok(());
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }

        self.server.port = raw.parse().map_err(|_| ConfigError::InvalidValue {
            field: "PORT".to_string(),
            reason: format!("'{}' is not a valid port number", raw),
        })?;
        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the server binds to, as `host:port`
    ///
    /// IPv6 hosts are bracketed (`[::1]:3000`).
    pub fn bind_address(&self) -> String {
        let host = self.server.host.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.server.port)
        } else {
            format!("{}:{}", host, self.server.port)
        }
    }
}
