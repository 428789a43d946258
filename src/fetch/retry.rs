//! Single-key fetch with exponential backoff.

use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use super::key::FetchKey;
use super::policy::FetchPolicy;
use super::sleeper::{SleepReason, Sleeper};
use crate::source::DataSource;
use crate::table::Table;

/// Attempt counter and current backoff delay for one key. Lives only while that key is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub delay: Duration,
}

impl RetryState {
    pub fn new(policy: &FetchPolicy) -> Self {
        Self {
            attempt: 1,
            delay: policy.base_delay(),
        }
    }

    fn advance(&mut self, policy: &FetchPolicy) {
        self.attempt += 1;
        self.delay = policy.next_delay(self.delay);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The source answered; the table may still be empty
    Success { attempts: u32 },
    /// Every allowed attempt failed with a transient error
    Exhausted { attempts: u32 },
    /// A non-transient error ended the key without retrying
    Fatal { attempts: u32 },
}

/// Rows for one key plus how they were obtained. Failures carry an empty table.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub table: Table,
    pub status: FetchStatus,
}

impl FetchResult {
    pub fn is_failure(&self) -> bool {
        !matches!(self.status, FetchStatus::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self.status {
            FetchStatus::Success { attempts }
            | FetchStatus::Exhausted { attempts }
            | FetchStatus::Fatal { attempts } => attempts,
        }
    }
}

/// Fetches one key, retrying transient failures.
///
/// Never returns an error: exhaustion and fatal failures are logged and degrade to an empty
/// table so the rest of the grid keeps going. Each backoff wait is the current delay plus a
/// uniform jitter in `[0, jitter_max]`; the delay then grows by `backoff_factor`.
pub async fn fetch_with_retry<D, S, R>(
    source: &D,
    key: &FetchKey,
    policy: &FetchPolicy,
    sleeper: &S,
    rng: &mut R,
) -> FetchResult
where
    D: DataSource,
    S: Sleeper,
    R: Rng,
{
    let max_tries = policy.max_tries.max(1);
    let mut state = RetryState::new(policy);

    loop {
        match source.query(key).await {
            Ok(table) => {
                return FetchResult {
                    table,
                    status: FetchStatus::Success {
                        attempts: state.attempt,
                    },
                };
            }
            Err(e) if e.is_transient() => {
                if state.attempt >= max_tries {
                    error!("Failed after {max_tries} attempts: {key} ({e})");
                    return FetchResult {
                        table: Table::default(),
                        status: FetchStatus::Exhausted {
                            attempts: state.attempt,
                        },
                    };
                }

                let jitter = Duration::from_millis(rng.random_range(0..=policy.jitter_max_ms));
                let wait = state.delay.saturating_add(jitter);
                warn!(
                    "Retry {}/{} for {key}: {e}. Waiting {:.1}s",
                    state.attempt,
                    max_tries,
                    wait.as_secs_f64()
                );
                sleeper.sleep(wait, SleepReason::Backoff).await;
                state.advance(policy);
            }
            Err(e) => {
                error!("Unexpected error for {key}: {e}");
                return FetchResult {
                    table: Table::default(),
                    status: FetchStatus::Fatal {
                        attempts: state.attempt,
                    },
                };
            }
        }
    }
}
