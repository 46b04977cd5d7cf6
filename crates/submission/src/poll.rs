//! Poll scheduling and backoff calculations

use std::time::Duration;
use xpisign_config::PollConfig;

/// When and how often the status URL is requested
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait before the first status request
    pub initial_delay: Duration,
    /// Status requests made at most; never less than one
    pub max_attempts: u32,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
    /// Upper bound on the summed waits, `None` for no bound
    pub max_wait: Option<Duration>,
    /// Fraction of a backoff delay randomised either way
    pub jitter_factor: f64,
}

impl Default for PollPolicy {
    /// One status request after 30 seconds.
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            max_attempts: 1,
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(300),
            max_wait: None,
            jitter_factor: 0.1,
        }
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            initial_delay: config.initial_delay(),
            max_attempts: config.max_attempts.max(1),
            backoff_multiplier: config.backoff_multiplier,
            max_delay: config.max_delay(),
            max_wait: config.max_wait(),
            ..Self::default()
        }
    }
}

impl PollPolicy {
    /// Exactly `attempts` polls spaced `delay` apart, no jitter
    #[must_use]
    pub fn fixed(delay: Duration, attempts: u32) -> Self {
        Self {
            initial_delay: delay,
            max_attempts: attempts.max(1),
            backoff_multiplier: 1.0,
            max_delay: delay,
            max_wait: None,
            jitter_factor: 0.0,
        }
    }

    /// Wait before the 1-based `attempt`.
    ///
    /// The first attempt always waits exactly `initial_delay`. Later attempts
    /// back off exponentially, capped at `max_delay`, with jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return self.initial_delay;
        }

        // Precision loss acceptable for backoff calculations
        #[allow(clippy::cast_precision_loss)]
        let base_delay = self.initial_delay.as_millis().min(u128::from(u64::MAX)) as f64;
        #[allow(clippy::cast_precision_loss)]
        let max_delay = self.max_delay.as_millis().min(u128::from(u64::MAX)) as f64;

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let delay = (base_delay * self.backoff_multiplier.powi(exponent)).min(max_delay);

        let jitter = delay * self.jitter_factor * (rand::random::<f64>() - 0.5);
        // Safe cast: max(0.0) ensures non-negative, round() handles fractional part
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let final_delay = (delay + jitter).max(0.0).round() as u64;

        Duration::from_millis(final_delay)
    }

    /// Whether another wait of `next` keeps the total within `max_wait`.
    #[must_use]
    pub fn within_budget(&self, waited: Duration, next: Duration) -> bool {
        self.max_wait
            .is_none_or(|limit| waited.saturating_add(next) <= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_thirty_second_wait() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_for(1), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = PollPolicy {
            initial_delay: Duration::from_secs(10),
            max_attempts: 10,
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            max_wait: None,
            jitter_factor: 0.0,
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for(2), Duration::from_secs(20));
        assert_eq!(policy.delay_for(3), Duration::from_secs(40));
        assert_eq!(policy.delay_for(4), Duration::from_secs(60));
        assert_eq!(policy.delay_for(9), Duration::from_secs(60));
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let policy = PollPolicy {
            initial_delay: Duration::from_secs(10),
            jitter_factor: 0.2,
            max_attempts: 5,
            ..PollPolicy::default()
        };
        for _ in 0..100 {
            let delay = policy.delay_for(2);
            assert!(delay >= Duration::from_secs(18) && delay <= Duration::from_secs(22));
        }
    }

    #[test]
    fn test_budget() {
        let mut policy = PollPolicy::fixed(Duration::from_secs(30), 5);
        assert!(policy.within_budget(Duration::from_secs(600), Duration::from_secs(30)));

        policy.max_wait = Some(Duration::from_secs(60));
        assert!(policy.within_budget(Duration::from_secs(30), Duration::from_secs(30)));
        assert!(!policy.within_budget(Duration::from_secs(60), Duration::from_secs(30)));
    }

    #[test]
    fn test_from_config_clamps_attempts() {
        let config = PollConfig {
            max_attempts: 0,
            ..PollConfig::default()
        };
        let policy = PollPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.initial_delay, Duration::from_secs(30));
    }
}
