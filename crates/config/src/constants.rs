//! Fixed names and defaults that are not worth a config knob

/// API root of the public add-ons signing service.
pub const DEFAULT_BASE_URL: &str = "https://addons.mozilla.org/api/v4";

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "xpisign";

pub const CONFIG_FILE: &str = "config.toml";

pub const LOGS_DIR: &str = "logs";

pub const ENV_BASE_URL: &str = "XPISIGN_BASE_URL";
pub const ENV_JWT_ISSUER: &str = "XPISIGN_JWT_ISSUER";
pub const ENV_JWT_SECRET: &str = "XPISIGN_JWT_SECRET";
pub const ENV_POLL_ATTEMPTS: &str = "XPISIGN_POLL_ATTEMPTS";
pub const ENV_POLL_DELAY: &str = "XPISIGN_POLL_DELAY";
pub const ENV_VERIFY_HASH: &str = "XPISIGN_VERIFY_HASH";
