//! Runtime configuration.
//!
//! Loaded from an optional TOML file, then overridden by the environment
//! (`PORT`) and CLI flags. All fields have defaults, so the service runs
//! with no config file at all — the only knob most deployments touch is
//! the port. Unknown keys are rejected so typos fail loudly at startup.
//!
//! ```toml
//! [server]
//! port = 9000
//!
//! [limits]
//! max_file_mib = 16
//! max_files = 20
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration.
///
/// User config files need only specify the values they want to override.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Bind address and logging.
    pub server: ServerConfig,
    /// Upload size and count bounds.
    pub limits: LimitsConfig,
    /// Session history bounds and expiry.
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind, `0.0.0.0` by default.
    pub host: String,
    /// Listening port. The `PORT` environment variable overrides this.
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Per-file upload bound in MiB. Oversize files fail individually
    /// without aborting their batch.
    pub max_file_mib: u64,
    /// Maximum files per conversion request.
    pub max_files: usize,
    /// Whole-request body bound in MiB, enforced by the framework before
    /// the handler runs.
    pub max_request_mib: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_mib: 16,
            max_files: 20,
            max_request_mib: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Records kept per session; oldest evicted first.
    pub capacity: usize,
    /// Seconds a session may idle before the sweeper drops it.
    pub ttl_secs: u64,
    /// Seconds between sweeper runs.
    pub sweep_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            ttl_secs: 3600,
            sweep_secs: 600,
        }
    }
}

impl Config {
    /// Load from a TOML file, or fall back to defaults when no path is
    /// given. The result is validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides (currently just `PORT`).
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let port = std::env::var("PORT").ok();
        self.apply_port(port.as_deref())
    }

    fn apply_port(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(value) = value {
            let port: u16 = value.parse().map_err(|_| {
                ConfigError::Validation(format!("PORT must be a number 1-65535, got {value:?}"))
            })?;
            if port == 0 {
                return Err(ConfigError::Validation("PORT must not be 0".into()));
            }
            self.server.port = port;
        }
        Ok(())
    }

    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must not be 0".into()));
        }
        if self.limits.max_file_mib == 0 {
            return Err(ConfigError::Validation(
                "limits.max_file_mib must be at least 1".into(),
            ));
        }
        if self.limits.max_files == 0 {
            return Err(ConfigError::Validation(
                "limits.max_files must be at least 1".into(),
            ));
        }
        if self.limits.max_request_mib < self.limits.max_file_mib {
            return Err(ConfigError::Validation(
                "limits.max_request_mib must be at least limits.max_file_mib".into(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Validation(
                "history.capacity must be at least 1".into(),
            ));
        }
        if self.history.sweep_secs == 0 {
            return Err(ConfigError::Validation(
                "history.sweep_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_file_bytes(&self) -> usize {
        (self.limits.max_file_mib as usize) * 1024 * 1024
    }

    pub fn max_request_bytes(&self) -> usize {
        (self.limits.max_request_mib as usize) * 1024 * 1024
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.history.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.history.sweep_secs)
    }
}
