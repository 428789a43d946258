//! In-memory stand-ins for the fetch loop's collaborators, shared by unit and integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::AppError;
use crate::fetch::key::FetchKey;
use crate::fetch::sleeper::{SleepReason, Sleeper};
use crate::sink::Sink;
use crate::source::DataSource;
use crate::table::Table;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
enum Step {
    Fail(fn() -> AppError),
    Rows(Table),
}

/// Scripted data source. Each key answers from its own queue of steps; the last step repeats
/// forever and keys without a script answer with an empty table.
#[derive(Debug, Default)]
pub struct StubSource {
    scripts: Mutex<HashMap<FetchKey, VecDeque<Step>>>,
    calls: Mutex<HashMap<FetchKey, usize>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `times` failures for `key`
    pub fn fail_times(&self, key: FetchKey, times: usize, error: fn() -> AppError) {
        let mut scripts = lock(&self.scripts);
        let queue = scripts.entry(key).or_default();
        queue.extend(std::iter::repeat_n(Step::Fail(error), times));
    }

    /// Queues a successful answer for `key`
    pub fn respond(&self, key: FetchKey, table: Table) {
        let mut scripts = lock(&self.scripts);
        scripts.entry(key).or_default().push_back(Step::Rows(table));
    }

    pub fn calls_for(&self, key: &FetchKey) -> usize {
        lock(&self.calls).get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    fn next_step(&self, key: &FetchKey) -> Option<Step> {
        let mut scripts = lock(&self.scripts);
        let queue = scripts.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl DataSource for StubSource {
    async fn query(&self, key: &FetchKey) -> Result<Table, AppError> {
        *lock(&self.calls).entry(*key).or_default() += 1;
        match self.next_step(key) {
            Some(Step::Fail(error)) => Err(error()),
            Some(Step::Rows(table)) => Ok(table),
            None => Ok(Table::default()),
        }
    }
}

/// Records every requested sleep instead of waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<(Duration, SleepReason)>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, reason: SleepReason) -> usize {
        lock(&self.sleeps)
            .iter()
            .filter(|(_, r)| *r == reason)
            .count()
    }

    pub fn durations(&self, reason: SleepReason) -> Vec<Duration> {
        lock(&self.sleeps)
            .iter()
            .filter(|(_, r)| *r == reason)
            .map(|(d, _)| *d)
            .collect()
    }

    /// Reasons in the order the sleeps were requested
    pub fn reasons(&self) -> Vec<SleepReason> {
        lock(&self.sleeps).iter().map(|(_, r)| *r).collect()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.sleeps).is_empty()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration, reason: SleepReason) {
        lock(&self.sleeps).push((duration, reason));
    }
}

/// Keeps persisted units in memory. Files named with [`MemorySink::fail_on`] refuse to persist.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<HashMap<String, Table>>,
    failing: Mutex<HashSet<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretends `file` was written by an earlier run
    pub fn preload(&self, file: &str, table: Table) {
        lock(&self.files).insert(file.to_string(), table);
    }

    pub fn fail_on(&self, file: &str) {
        lock(&self.failing).insert(file.to_string());
    }

    pub fn get(&self, file: &str) -> Option<Table> {
        lock(&self.files).get(file).cloned()
    }

    /// Names of all stored files, sorted
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.files).keys().cloned().collect();
        names.sort();
        names
    }
}

impl Sink for MemorySink {
    async fn exists(&self, file: &str) -> bool {
        lock(&self.files).contains_key(file)
    }

    async fn persist(&self, file: &str, table: &Table) -> Result<(), AppError> {
        if lock(&self.failing).contains(file) {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("refusing to write {file}"),
            )));
        }
        lock(&self.files).insert(file.to_string(), table.clone());
        Ok(())
    }
}

/// Builds a small game table with `GAME_ID`, `GAME_DATE`, `MATCHUP` and `PTS` columns.
pub fn sample_game_rows(games: &[(&str, &str)]) -> Table {
    let mut table = Table::new(
        ["GAME_ID", "GAME_DATE", "MATCHUP", "PTS"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    );
    for (i, (game_id, date)) in games.iter().enumerate() {
        table.push_row(vec![
            game_id.to_string(),
            date.to_string(),
            "PHX vs. DEN".to_string(),
            (100 + i).to_string(),
        ]);
    }
    table
}
