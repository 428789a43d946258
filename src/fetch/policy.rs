//! Retry and pacing parameters for the bulk fetch loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::fetch as defaults;
use crate::error::AppError;

/// Parameters of the fetch loop, read from the `[fetch]` table of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchPolicy {
    /// Attempts per key, including the first one
    pub max_tries: u32,
    /// First backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_factor: f64,
    /// Upper bound of the random jitter added to each backoff wait, in milliseconds
    pub jitter_max_ms: u64,
    /// Cap on a single backoff delay (before jitter), in seconds
    pub max_delay_seconds: u64,
    /// Pacing window after every call, in milliseconds
    pub sleep_min_ms: u64,
    pub sleep_max_ms: u64,
    /// Cooldown after every N calls; 0 disables cooldowns
    pub cooldown_every: u64,
    pub cooldown_seconds: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_tries: defaults::MAX_TRIES,
            base_delay_ms: defaults::BASE_DELAY_MS,
            backoff_factor: defaults::BACKOFF_FACTOR,
            jitter_max_ms: defaults::JITTER_MAX_MS,
            max_delay_seconds: defaults::MAX_DELAY_SECONDS,
            sleep_min_ms: defaults::SLEEP_MIN_MS,
            sleep_max_ms: defaults::SLEEP_MAX_MS,
            cooldown_every: defaults::COOLDOWN_EVERY,
            cooldown_seconds: defaults::COOLDOWN_SECONDS,
        }
    }
}

impl FetchPolicy {
    /// A policy that never sleeps and tries each key once. Handy for tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            max_tries: 1,
            base_delay_ms: 0,
            backoff_factor: 1.0,
            jitter_max_ms: 0,
            max_delay_seconds: 0,
            sleep_min_ms: 0,
            sleep_max_ms: 0,
            cooldown_every: 0,
            cooldown_seconds: 0,
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_seconds)
    }

    pub fn jitter_max(&self) -> Duration {
        Duration::from_millis(self.jitter_max_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    /// Delay that follows `current` in the backoff schedule, capped at [`max_delay`](Self::max_delay).
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .unwrap_or(Duration::MAX)
            .min(self.max_delay())
    }

    /// Upper bound on the time one key can spend in backoff sleeps.
    pub fn max_backoff_per_key(&self) -> Duration {
        let waits = self.max_tries.saturating_sub(1);
        self.max_delay()
            .max(self.base_delay())
            .saturating_add(self.jitter_max())
            .saturating_mul(waits)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_tries == 0 {
            return Err(AppError::config_error("fetch.max_tries must be at least 1"));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(AppError::config_error(
                "fetch.backoff_factor must be a finite number >= 1.0",
            ));
        }
        if self.sleep_min_ms > self.sleep_max_ms {
            return Err(AppError::config_error(
                "fetch.sleep_min_ms must not exceed fetch.sleep_max_ms",
            ));
        }
        if self.max_delay_seconds > defaults::MAX_DELAY_LIMIT_SECONDS {
            return Err(AppError::config_error(format!(
                "fetch.max_delay_seconds must not exceed {}",
                defaults::MAX_DELAY_LIMIT_SECONDS
            )));
        }
        if self.jitter_max_ms > defaults::JITTER_LIMIT_MS {
            return Err(AppError::config_error(format!(
                "fetch.jitter_max_ms must not exceed {}",
                defaults::JITTER_LIMIT_MS
            )));
        }
        if self.cooldown_seconds > defaults::COOLDOWN_LIMIT_SECONDS {
            return Err(AppError::config_error(format!(
                "fetch.cooldown_seconds must not exceed {}",
                defaults::COOLDOWN_LIMIT_SECONDS
            )));
        }
        if self.base_delay_ms > self.max_delay_seconds.saturating_mul(1000) {
            return Err(AppError::config_error(
                "fetch.base_delay_ms must not exceed fetch.max_delay_seconds",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FetchPolicy::default().validate().is_ok());
        assert!(FetchPolicy::immediate().validate().is_ok());
    }

    #[test]
    fn test_backoff_schedule_grows_by_factor() {
        let policy = FetchPolicy {
            base_delay_ms: 2000,
            backoff_factor: 3.0,
            max_delay_seconds: 60,
            ..FetchPolicy::default()
        };

        let first = policy.base_delay();
        let second = policy.next_delay(first);
        let third = policy.next_delay(second);

        assert_eq!(first, Duration::from_secs(2));
        assert_eq!(second, Duration::from_secs(6));
        assert_eq!(third, Duration::from_secs(18));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = FetchPolicy {
            base_delay_ms: 2000,
            backoff_factor: 10.0,
            max_delay_seconds: 5,
            ..FetchPolicy::default()
        };
        assert_eq!(policy.next_delay(policy.base_delay()), Duration::from_secs(5));
    }

    #[test]
    fn test_max_backoff_per_key() {
        let policy = FetchPolicy {
            max_tries: 4,
            max_delay_seconds: 10,
            jitter_max_ms: 1000,
            ..FetchPolicy::default()
        };
        assert_eq!(policy.max_backoff_per_key(), Duration::from_secs(33));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_tries = FetchPolicy {
            max_tries: 0,
            ..FetchPolicy::default()
        };
        assert!(zero_tries.validate().is_err());

        let shrinking = FetchPolicy {
            backoff_factor: 0.5,
            ..FetchPolicy::default()
        };
        assert!(shrinking.validate().is_err());

        let inverted_window = FetchPolicy {
            sleep_min_ms: 2000,
            sleep_max_ms: 1000,
            ..FetchPolicy::default()
        };
        assert!(inverted_window.validate().is_err());
    }

    #[test]
    fn test_validation_caps_delays() {
        let huge_cap = FetchPolicy {
            max_delay_seconds: u64::MAX,
            backoff_factor: 10.0,
            ..FetchPolicy::default()
        };
        assert!(matches!(huge_cap.validate(), Err(AppError::Config(_))));

        let huge_jitter = FetchPolicy {
            jitter_max_ms: u64::MAX,
            ..FetchPolicy::default()
        };
        assert!(huge_jitter.validate().is_err());

        let huge_cooldown = FetchPolicy {
            cooldown_seconds: u64::MAX,
            ..FetchPolicy::default()
        };
        assert!(huge_cooldown.validate().is_err());

        let at_limit = FetchPolicy {
            max_delay_seconds: defaults::MAX_DELAY_LIMIT_SECONDS,
            jitter_max_ms: defaults::JITTER_LIMIT_MS,
            cooldown_seconds: defaults::COOLDOWN_LIMIT_SECONDS,
            ..FetchPolicy::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_unvalidated_extremes_saturate() {
        let policy = FetchPolicy {
            max_tries: u32::MAX,
            max_delay_seconds: u64::MAX,
            jitter_max_ms: u64::MAX,
            backoff_factor: 10.0,
            ..FetchPolicy::default()
        };

        assert_eq!(policy.next_delay(Duration::MAX), policy.max_delay());
        assert_eq!(policy.max_backoff_per_key(), Duration::MAX);

        let grown = policy.next_delay(Duration::from_secs(u64::MAX / 2));
        assert!(grown >= Duration::from_secs(u64::MAX / 2));
    }

    #[test]
    fn test_partial_toml_table_uses_defaults() {
        let policy: FetchPolicy = toml::from_str("max_tries = 6\nsleep_min_ms = 1100\nsleep_max_ms = 2500\n").unwrap();
        assert_eq!(policy.max_tries, 6);
        assert_eq!(policy.sleep_min_ms, 1100);
        assert_eq!(policy.cooldown_every, defaults::COOLDOWN_EVERY);
    }
}
