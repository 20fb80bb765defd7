//! Configuration module for spdrive.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults. Credentials are never read
//! from the file itself; they come from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Top-level configuration for spdrive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transfer: TransferConfig,
    pub retry: RetryConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Transfer engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Maximum number of items in flight at once within a batch.
    pub concurrency: usize,
    /// Files above this size (in MiB) are uploaded through a session.
    pub threshold_mb: u64,
    /// Size of each upload chunk and download segment (in MiB).
    pub chunk_size_mb: u64,
}

impl TransferConfig {
    /// Upload threshold in bytes.
    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_mb * 1024 * 1024
    }

    /// Chunk size in bytes.
    pub fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_mb * 1024 * 1024
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            threshold_mb: 4,
            chunk_size_mb: 10,
        }
    }
}

/// Retry and backoff settings for remote requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per operation, including the first.
    pub max_attempts: u32,
    /// Base delay in milliseconds before the first retry.
    pub base_delay_ms: u64,
    /// Multiplier applied per additional failed attempt.
    pub multiplier: f64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Per-attempt request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl RetryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 60_000,
            request_timeout_secs: 120,
        }
    }
}

/// Azure AD application credentials for the client-credential flow.
///
/// Only the non-secret fields may appear in the configuration file; the
/// client secret is taken from the environment exclusively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Application (client) ID.
    pub client_id: Option<String>,
    /// Directory (tenant) ID.
    pub tenant_id: Option<String>,
}

impl AuthConfig {
    /// Resolved credentials: file values overridden by the environment.
    ///
    /// Reads `MICROSOFT_CLIENT_ID`, `MICROSOFT_CLIENT_SECRET`, and
    /// `MICROSOFT_TENANT_ID`.
    pub fn resolve(&self) -> Result<Credentials, DomainError> {
        let client_id = std::env::var("MICROSOFT_CLIENT_ID")
            .ok()
            .or_else(|| self.client_id.clone())
            .ok_or_else(|| {
                DomainError::InvalidConfiguration(
                    "client_id missing: set MICROSOFT_CLIENT_ID or auth.client_id".into(),
                )
            })?;
        let tenant_id = std::env::var("MICROSOFT_TENANT_ID")
            .ok()
            .or_else(|| self.tenant_id.clone())
            .ok_or_else(|| {
                DomainError::InvalidConfiguration(
                    "tenant_id missing: set MICROSOFT_TENANT_ID or auth.tenant_id".into(),
                )
            })?;
        let client_secret = std::env::var("MICROSOFT_CLIENT_SECRET").map_err(|_| {
            DomainError::InvalidConfiguration("MICROSOFT_CLIENT_SECRET is not set".into())
        })?;
        Ok(Credentials {
            client_id,
            client_secret,
            tenant_id,
        })
    }
}

/// Fully resolved application credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit structured JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/spdrive/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("spdrive")
            .join("config.yaml")
    }

    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.transfer.concurrency == 0 {
            errors.push(ValidationError {
                field: "transfer.concurrency".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.transfer.threshold_mb == 0 {
            errors.push(ValidationError {
                field: "transfer.threshold_mb".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.transfer.chunk_size_mb == 0 {
            errors.push(ValidationError {
                field: "transfer.chunk_size_mb".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.retry.max_attempts == 0 {
            errors.push(ValidationError {
                field: "retry.max_attempts".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.retry.base_delay_ms == 0 {
            errors.push(ValidationError {
                field: "retry.base_delay_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.retry.multiplier < 1.0 {
            errors.push(ValidationError {
                field: "retry.multiplier".into(),
                message: "must be at least 1.0".into(),
            });
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            errors.push(ValidationError {
                field: "retry.max_delay_ms".into(),
                message: format!(
                    "max_delay_ms ({}) must not be below base_delay_ms ({})",
                    self.retry.max_delay_ms, self.retry.base_delay_ms
                ),
            });
        }
        if self.retry.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "retry.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

/// A single configuration validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"retry.max_attempts"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
