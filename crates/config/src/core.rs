//! Configuration sections and their defaults

use crate::constants::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Signing service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// API key pair used to mint JWTs
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub issuer: Option<String>,
    pub secret: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("issuer", &self.issuer)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How long to wait for the service to finish processing an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
    /// Overall cap on time spent waiting; unbounded when absent
    #[serde(default)]
    pub max_wait_secs: Option<u64>,
}

impl PollConfig {
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }

    #[must_use]
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 30,
            max_attempts: 1,
            backoff_multiplier: 2.0,
            max_delay_secs: 300, // 5 minutes
            max_wait_secs: None,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 300, // large packages upload slowly
            connect_timeout: 30,
            user_agent: None,
        }
    }
}

/// Artifact download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_verify_hash")]
    pub verify_hash: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            verify_hash: default_verify_hash(),
        }
    }
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_initial_delay() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay() -> u64 {
    300
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_verify_hash() -> bool {
    true
}
