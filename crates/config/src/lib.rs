#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for xpisign
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/xpisign/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
mod core;

pub use crate::core::{CredentialsConfig, DownloadConfig, NetworkConfig, PollConfig, ServiceConfig};

use constants::{
    APP_DIR, CONFIG_FILE, ENV_BASE_URL, ENV_JWT_ISSUER, ENV_JWT_SECRET, ENV_POLL_ATTEMPTS,
    ENV_POLL_DELAY, ENV_VERIFY_HASH, LOGS_DIR,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use xpisign_errors::{ConfigError, Error};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Directory that receives debug log files
    #[must_use]
    pub fn logs_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join(LOGS_DIR)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or holds values outside their allowed range.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            self.service.base_url = base_url;
        }

        if let Ok(issuer) = std::env::var(ENV_JWT_ISSUER) {
            self.credentials.issuer = Some(issuer);
        }

        if let Ok(secret) = std::env::var(ENV_JWT_SECRET) {
            self.credentials.secret = Some(secret);
        }

        if let Ok(attempts) = std::env::var(ENV_POLL_ATTEMPTS) {
            self.poll.max_attempts = attempts.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_POLL_ATTEMPTS.to_string(),
                value: attempts,
            })?;
        }

        if let Ok(delay) = std::env::var(ENV_POLL_DELAY) {
            self.poll.initial_delay_secs =
                delay.parse().map_err(|_| ConfigError::InvalidValue {
                    field: ENV_POLL_DELAY.to_string(),
                    value: delay,
                })?;
        }

        if let Ok(verify) = std::env::var(ENV_VERIFY_HASH) {
            self.download.verify_hash = match verify.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: ENV_VERIFY_HASH.to_string(),
                        value: verify,
                    }
                    .into())
                }
            };
        }

        self.validate()
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        let base_url = &self.service.base_url;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "service.base_url".to_string(),
                value: base_url.clone(),
            }
            .into());
        }

        if self.poll.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll.max_attempts".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if !(self.poll.backoff_multiplier >= 1.0 && self.poll.backoff_multiplier.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "poll.backoff_multiplier".to_string(),
                value: self.poll.backoff_multiplier.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// The API key pair, once all layers have been applied
    ///
    /// # Errors
    ///
    /// Returns an error if either half of the key pair is missing.
    pub fn credentials(&self) -> Result<(&str, &str), Error> {
        let issuer = self
            .credentials
            .issuer
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: "credentials.issuer".to_string(),
            })?;
        let secret = self
            .credentials
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: "credentials.secret".to_string(),
            })?;
        Ok((issuer, secret))
    }
}
