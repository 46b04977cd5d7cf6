//! Integration tests for config

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use xpisign_config::constants::*;
    use xpisign_config::*;
    use xpisign_errors::{ConfigError, Error};

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            ENV_BASE_URL,
            ENV_JWT_ISSUER,
            ENV_JWT_SECRET,
            ENV_POLL_ATTEMPTS,
            ENV_POLL_DELAY,
            ENV_VERIFY_HASH,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_match_single_poll() {
        let config = Config::default();
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll.initial_delay(), Duration::from_secs(30));
        assert_eq!(config.poll.max_attempts, 1);
        assert!(config.poll.max_wait().is_none());
        assert!(config.download.verify_hash);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[service]
base_url = "https://addons.example.org/api/v4"

[credentials]
issuer = "user:1:2"
secret = "abc"

[poll]
initial_delay_secs = 5
max_attempts = 10
max_wait_secs = 600

[download]
verify_hash = false
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.service.base_url, "https://addons.example.org/api/v4");
        assert_eq!(config.credentials().unwrap(), ("user:1:2", "abc"));
        assert_eq!(config.poll.initial_delay(), Duration::from_secs(5));
        assert_eq!(config.poll.max_attempts, 10);
        assert_eq!(config.poll.max_wait(), Some(Duration::from_secs(600)));
        assert!((config.poll.backoff_multiplier - 2.0).abs() < f64::EPSILON);
        assert!(!config.download.verify_hash);
        assert_eq!(config.network.timeout, 300);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/xpisign.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[poll]\nmax_attempts = 0").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref field, .. }) if field == "poll.max_attempts"
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_JWT_ISSUER, "user:env");
        std::env::set_var(ENV_JWT_SECRET, "env-secret");
        std::env::set_var(ENV_POLL_ATTEMPTS, "4");
        std::env::set_var(ENV_VERIFY_HASH, "no");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.credentials().unwrap(), ("user:env", "env-secret"));
        assert_eq!(config.poll.max_attempts, 4);
        assert!(!config.download.verify_hash);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_POLL_DELAY, "soon");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));

        clear_env();
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::default();
        let err = config.credentials().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { ref field }) if field == "credentials.issuer"
        ));
        assert!(!format!("{:?}", CredentialsConfig {
            issuer: None,
            secret: Some("hidden".into()),
        })
        .contains("hidden"));
    }
}
