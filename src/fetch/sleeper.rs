//! Waiting between requests.
//!
//! All sleeping in the fetch loop goes through [`Sleeper`] so the schedule can be observed
//! in tests without actually waiting.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SleepReason {
    /// Wait before retrying a key after a transient failure
    Backoff,
    /// Spacing after every call
    Pacing,
    /// Longer pause after every N calls
    Cooldown,
}

impl fmt::Display for SleepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepReason::Backoff => f.write_str("backoff"),
            SleepReason::Pacing => f.write_str("pacing"),
            SleepReason::Cooldown => f.write_str("cooldown"),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration, reason: SleepReason);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration, _reason: SleepReason) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
