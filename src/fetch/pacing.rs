//! Fixed request pacing: a random pause after every call plus a periodic cooldown.
//!
//! The schedule is deliberately not adaptive. It ignores whatever the upstream says
//! about rate limits and keeps the aggregate call rate low by construction.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use super::policy::FetchPolicy;
use super::sleeper::{SleepReason, Sleeper};

#[derive(Debug, Clone)]
pub struct Pacer {
    sleep_min_ms: u64,
    sleep_max_ms: u64,
    cooldown_every: u64,
    cooldown: Duration,
    calls: u64,
}

impl Pacer {
    pub fn new(policy: &FetchPolicy) -> Self {
        Self {
            sleep_min_ms: policy.sleep_min_ms,
            sleep_max_ms: policy.sleep_max_ms.max(policy.sleep_min_ms),
            cooldown_every: policy.cooldown_every,
            cooldown: policy.cooldown(),
            calls: 0,
        }
    }

    /// Calls recorded so far
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Draws one pacing pause uniformly from the configured window.
    pub fn pacing_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.random_range(self.sleep_min_ms..=self.sleep_max_ms))
    }

    /// Records one call and sleeps accordingly. Called after every call, whatever its outcome.
    pub async fn after_call<S: Sleeper, R: Rng>(&mut self, sleeper: &S, rng: &mut R) {
        self.calls += 1;

        let pause = self.pacing_delay(rng);
        debug!("Pacing {:.2}s after call {}", pause.as_secs_f64(), self.calls);
        sleeper.sleep(pause, SleepReason::Pacing).await;

        if self.cooldown_every > 0 && self.calls % self.cooldown_every == 0 {
            info!("Cooldown... ({}s)", self.cooldown.as_secs());
            sleeper.sleep(self.cooldown, SleepReason::Cooldown).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing_utils::RecordingSleeper;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn policy(cooldown_every: u64) -> FetchPolicy {
        FetchPolicy {
            sleep_min_ms: 600,
            sleep_max_ms: 1000,
            cooldown_every,
            cooldown_seconds: 25,
            ..FetchPolicy::default()
        }
    }

    #[test]
    fn test_pacing_delay_stays_in_window() {
        let pacer = Pacer::new(&policy(0));
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let delay = pacer.pacing_delay(&mut rng);
            assert!(delay >= Duration::from_millis(600));
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_fixed_window_gives_fixed_delay() {
        let fixed = FetchPolicy {
            sleep_min_ms: 1100,
            sleep_max_ms: 1100,
            ..FetchPolicy::default()
        };
        let pacer = Pacer::new(&fixed);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(pacer.pacing_delay(&mut rng), Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn test_cooldown_every_n_calls() {
        let mut pacer = Pacer::new(&policy(40));
        let sleeper = RecordingSleeper::new();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..100 {
            pacer.after_call(&sleeper, &mut rng).await;
        }

        assert_eq!(pacer.calls(), 100);
        assert_eq!(sleeper.count(SleepReason::Pacing), 100);
        assert_eq!(sleeper.count(SleepReason::Cooldown), 2);
        assert!(
            sleeper
                .durations(SleepReason::Cooldown)
                .iter()
                .all(|d| *d == Duration::from_secs(25))
        );

        // Cooldowns land right after calls 40 and 80
        let reasons = sleeper.reasons();
        let cooldown_positions: Vec<usize> = reasons
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == SleepReason::Cooldown)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(cooldown_positions, vec![40, 81]);
    }

    #[tokio::test]
    async fn test_zero_disables_cooldown() {
        let mut pacer = Pacer::new(&policy(0));
        let sleeper = RecordingSleeper::new();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..10 {
            pacer.after_call(&sleeper, &mut rng).await;
        }

        assert_eq!(sleeper.count(SleepReason::Cooldown), 0);
        assert_eq!(sleeper.count(SleepReason::Pacing), 10);
    }
}
