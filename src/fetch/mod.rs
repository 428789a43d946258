//! Resilient bulk fetching: key enumeration, retry with backoff, pacing and the run loop.

pub mod key;
pub mod pacing;
pub mod policy;
pub mod retry;
pub mod runner;
pub mod sleeper;

pub use key::{FetchKey, KeyGrid, Season, SeasonType};
pub use pacing::Pacer;
pub use policy::FetchPolicy;
pub use retry::{FetchResult, FetchStatus, RetryState, fetch_with_retry};
pub use runner::{BulkFetcher, RunSummary, run_until_interrupted};
pub use sleeper::{SleepReason, Sleeper, TokioSleeper};
