//! The bulk fetch loop: units in order, keys in grid order, one call in flight at a time.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info, warn};

use super::key::{KeyGrid, Season};
use super::pacing::Pacer;
use super::policy::FetchPolicy;
use super::retry::fetch_with_retry;
use super::sleeper::Sleeper;
use crate::error::AppError;
use crate::sink::Sink;
use crate::source::DataSource;
use crate::table::{Table, dedup_by_key, sort_chronologically};
use crate::units::Entity;

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub units_total: usize,
    pub units_skipped: usize,
    /// Units whose file an earlier unit of the same run already claimed
    pub units_repeated: usize,
    pub units_written: usize,
    /// Units where every key came back empty; nothing was written for them
    pub units_empty: usize,
    pub keys_attempted: usize,
    pub keys_failed: usize,
    pub rows_written: usize,
    pub duplicates_dropped: usize,
    /// Files that could not be persisted
    pub persist_failures: Vec<String>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.persist_failures.is_empty()
    }

    fn log(&self) {
        info!(
            "Done. Total keys attempted: {} ({} failed). Units: {} total, {} written, {} skipped, {} repeated, {} empty. Rows written: {}, duplicates dropped: {}",
            self.keys_attempted,
            self.keys_failed,
            self.units_total,
            self.units_written,
            self.units_skipped,
            self.units_repeated,
            self.units_empty,
            self.rows_written,
            self.duplicates_dropped
        );
        for file in &self.persist_failures {
            error!("Not persisted: {file}");
        }
    }
}

/// Runs `work` until it finishes or `interrupt` resolves, whichever comes first. An interrupt
/// becomes [`AppError::Interrupted`]; unit files completed before it stay in place.
pub async fn run_until_interrupted<W, I, T>(work: W, interrupt: I) -> Result<(), AppError>
where
    W: Future<Output = Result<(), AppError>>,
    I: Future<Output = T>,
{
    tokio::select! {
        result = work => result,
        _ = interrupt => {
            warn!("Interrupted. Run the same command again to resume.");
            Err(AppError::Interrupted)
        }
    }
}

/// Drives a [`DataSource`] over a [`KeyGrid`] for a list of units, persisting each unit to a
/// [`Sink`] once all of its keys are done.
pub struct BulkFetcher<D, K, S> {
    source: D,
    sink: K,
    sleeper: S,
    policy: FetchPolicy,
    grid: KeyGrid,
    rng: SmallRng,
    pacer: Pacer,
    force: bool,
}

impl<D, K, S> BulkFetcher<D, K, S>
where
    D: DataSource,
    K: Sink,
    S: Sleeper,
{
    pub fn new(source: D, sink: K, sleeper: S, policy: FetchPolicy, grid: KeyGrid) -> Self {
        let pacer = Pacer::new(&policy);
        Self {
            source,
            sink,
            sleeper,
            policy,
            grid,
            rng: SmallRng::from_os_rng(),
            pacer,
            force: false,
        }
    }

    /// Replaces the jitter and pacing randomness, e.g. with a seeded generator.
    pub fn with_rng(mut self, rng: SmallRng) -> Self {
        self.rng = rng;
        self
    }

    /// Re-pull units even when their file already exists.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Calls made so far, across all units
    pub fn calls(&self) -> u64 {
        self.pacer.calls()
    }

    fn season_bounds(&self) -> Result<(Season, Season), AppError> {
        match (self.grid.seasons().first(), self.grid.seasons().last()) {
            (Some(&first), Some(&last)) => Ok((first, last)),
            _ => Err(AppError::config_error("Season range is empty")),
        }
    }

    /// Whether the sink already holds this unit's file.
    pub async fn is_complete(&self, unit: &Entity) -> Result<bool, AppError> {
        let (first, last) = self.season_bounds()?;
        Ok(self.sink.exists(&unit.file_name(first, last)).await)
    }

    /// Processes every unit in order. Key failures and persistence failures are counted in
    /// the summary; only an unusable grid is returned as an error.
    pub async fn run(&mut self, units: &[Entity]) -> Result<RunSummary, AppError> {
        let (first, last) = self.season_bounds()?;
        let mut summary = RunSummary {
            units_total: units.len(),
            ..RunSummary::default()
        };

        info!(
            "Fetching {} units, {} keys each ({first} to {last})",
            units.len(),
            self.grid.keys_per_unit()
        );

        let mut claimed = HashSet::new();
        for (i, unit) in units.iter().enumerate() {
            let file = unit.file_name(first, last);
            let progress = format!("[{}/{}]", i + 1, units.len());

            if !claimed.insert(file.clone()) {
                warn!("{progress} {} maps to {file}, already handled in this run", unit.label());
                summary.units_repeated += 1;
                continue;
            }

            if self.force {
                if self.sink.exists(&file).await {
                    info!("{progress} Re-pulling {} ({file} will be replaced)", unit.label());
                }
            } else if self.sink.exists(&file).await {
                info!("{progress} Skipping {} ({file} exists)", unit.label());
                summary.units_skipped += 1;
                continue;
            }

            info!("{progress} Fetching {} {}", unit.kind(), unit.label());
            let tables = self.fetch_unit(unit, &mut summary).await;

            if tables.is_empty() {
                warn!("{progress} No rows for {}; nothing written", unit.label());
                summary.units_empty += 1;
                continue;
            }

            let (table, dropped) = dedup_by_key(Table::concat(tables), &unit.kind().natural_key());
            let table = sort_chronologically(table);
            summary.duplicates_dropped += dropped;

            match self.sink.persist(&file, &table).await {
                Ok(()) => {
                    info!("{progress} Saved {} rows to {file}", table.len());
                    summary.units_written += 1;
                    summary.rows_written += table.len();
                }
                Err(e) => {
                    error!("{progress} Failed to persist {file}: {e}");
                    summary.persist_failures.push(file);
                }
            }
        }

        summary.log();
        Ok(summary)
    }

    /// Fetches every key of one unit and returns the tagged, non-empty tables in grid order.
    async fn fetch_unit(&mut self, unit: &Entity, summary: &mut RunSummary) -> Vec<Table> {
        let mut tables = Vec::new();

        for key in self.grid.keys_for(unit) {
            let mut result =
                fetch_with_retry(&self.source, &key, &self.policy, &self.sleeper, &mut self.rng)
                    .await;
            summary.keys_attempted += 1;

            if result.is_failure() {
                summary.keys_failed += 1;
                warn!("{key}: no data after {} attempt(s)", result.attempts());
            } else if result.table.is_empty() {
                info!("{key}: 0 rows");
            } else {
                unit.tag(&key, &mut result.table);
                info!("{key}: {} rows", result.table.len());
                tables.push(result.table);
            }

            self.pacer.after_call(&self.sleeper, &mut self.rng).await;
        }

        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::columns;
    use crate::fetch::key::{FetchKey, SeasonType};
    use crate::fetch::sleeper::SleepReason;
    use crate::testing_utils::{MemorySink, RecordingSleeper, StubSource, sample_game_rows};

    fn grid() -> KeyGrid {
        KeyGrid::new(
            vec![Season(2022), Season(2023)],
            vec![SeasonType::RegularSeason],
        )
    }

    fn suns() -> Entity {
        Entity::team("PHX").unwrap()
    }

    fn nuggets() -> Entity {
        Entity::team("DEN").unwrap()
    }

    fn key(unit: &Entity, season: u16) -> FetchKey {
        FetchKey {
            kind: unit.kind(),
            entity_id: unit.id(),
            season: Season(season),
            season_type: SeasonType::RegularSeason,
        }
    }

    fn policy() -> FetchPolicy {
        FetchPolicy {
            max_tries: 3,
            jitter_max_ms: 0,
            cooldown_every: 0,
            ..FetchPolicy::default()
        }
    }

    fn fetcher(
        source: StubSource,
        sink: MemorySink,
    ) -> BulkFetcher<StubSource, MemorySink, RecordingSleeper> {
        BulkFetcher::new(source, sink, RecordingSleeper::new(), policy(), grid())
            .with_rng(SmallRng::seed_from_u64(3))
    }

    #[tokio::test]
    async fn test_unit_rows_are_tagged_sorted_and_saved() {
        let source = StubSource::new();
        source.respond(
            key(&suns(), 2023),
            sample_game_rows(&[("0022300002", "2023-10-26"), ("0022300001", "2023-10-24")]),
        );
        source.respond(
            key(&suns(), 2022),
            sample_game_rows(&[("0022200001", "2022-10-19")]),
        );
        let mut fetcher = fetcher(source, MemorySink::new());

        let summary = fetcher.run(&[suns()]).await.unwrap();

        assert_eq!(summary.units_written, 1);
        assert_eq!(summary.rows_written, 3);
        let saved = fetcher.sink().get("phx_games_2022_2024.csv").unwrap();
        let ids: Vec<&str> = (0..3).map(|i| saved.get(i, columns::GAME_ID).unwrap()).collect();
        assert_eq!(ids, ["0022200001", "0022300001", "0022300002"]);
        assert_eq!(saved.get(0, columns::TEAM_ABBR), Some("PHX"));
        assert_eq!(saved.get(0, columns::SEASON), Some("2022-23"));
        assert_eq!(saved.get(2, columns::SEASON_TYPE), Some("Regular Season"));
    }

    #[tokio::test]
    async fn test_existing_unit_costs_no_calls_and_no_sleeps() {
        let sink = MemorySink::new();
        sink.preload("phx_games_2022_2024.csv", sample_game_rows(&[("1", "2022-10-19")]));
        let source = StubSource::new();
        let mut fetcher = fetcher(source, sink);

        assert!(fetcher.is_complete(&suns()).await.unwrap());
        let summary = fetcher.run(&[suns()]).await.unwrap();

        assert_eq!(summary.units_skipped, 1);
        assert_eq!(summary.keys_attempted, 0);
        assert_eq!(fetcher.source().total_calls(), 0);
        assert_eq!(fetcher.calls(), 0);
        assert!(fetcher.sleeper.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_unit_is_pulled_once() {
        let source = StubSource::new();
        source.respond(key(&suns(), 2022), sample_game_rows(&[("0022200001", "2022-10-19")]));
        let mut fetcher = fetcher(source, MemorySink::new()).force(true);

        let summary = fetcher.run(&[suns(), nuggets(), suns()]).await.unwrap();

        assert_eq!(summary.units_total, 3);
        assert_eq!(summary.units_repeated, 1);
        assert_eq!(summary.keys_attempted, 4);
        assert_eq!(fetcher.source().calls_for(&key(&suns(), 2022)), 1);
        assert_eq!(fetcher.sink().get("phx_games_2022_2024.csv").map(|t| t.len()), Some(1));
    }

    #[tokio::test]
    async fn test_players_sharing_a_display_name_share_one_file() {
        let first = Entity::player(1, Some("Same Name".to_string()));
        let second = Entity::player(2, Some("Same Name".to_string()));
        let mut fetcher = fetcher(StubSource::new(), MemorySink::new());

        let summary = fetcher.run(&[first, second.clone()]).await.unwrap();

        assert_eq!(summary.units_repeated, 1);
        assert_eq!(
            fetcher.source().calls_for(&FetchKey {
                kind: second.kind(),
                entity_id: second.id(),
                season: Season(2022),
                season_type: SeasonType::RegularSeason,
            }),
            0
        );
    }

    #[tokio::test]
    async fn test_interrupt_ends_run_with_error() {
        let result = run_until_interrupted(std::future::pending::<Result<(), AppError>>(), async {}).await;
        assert!(matches!(result, Err(AppError::Interrupted)));

        let finished = run_until_interrupted(async { Ok(()) }, std::future::pending::<()>()).await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn test_force_re_pulls_existing_unit() {
        let sink = MemorySink::new();
        sink.preload("phx_games_2022_2024.csv", sample_game_rows(&[("1", "2022-10-19")]));
        let source = StubSource::new();
        source.respond(
            key(&suns(), 2022),
            sample_game_rows(&[("1", "2022-10-19"), ("2", "2022-10-21")]),
        );
        let mut fetcher = fetcher(source, sink).force(true);

        let summary = fetcher.run(&[suns()]).await.unwrap();

        assert_eq!(summary.units_skipped, 0);
        assert_eq!(fetcher.source().total_calls(), 2);
        assert_eq!(fetcher.sink().get("phx_games_2022_2024.csv").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_unit_is_not_written() {
        let mut fetcher = fetcher(StubSource::new(), MemorySink::new());

        let summary = fetcher.run(&[suns()]).await.unwrap();

        assert_eq!(summary.units_empty, 1);
        assert_eq!(summary.units_written, 0);
        assert!(fetcher.sink().files().is_empty());
    }

    #[tokio::test]
    async fn test_failed_key_does_not_stop_the_unit() {
        let source = StubSource::new();
        source.fail_times(key(&suns(), 2022), 10, || {
            AppError::network_timeout("https://stats.example")
        });
        source.respond(
            key(&suns(), 2023),
            sample_game_rows(&[("0022300001", "2023-10-24")]),
        );
        let mut fetcher = fetcher(source, MemorySink::new());

        let summary = fetcher.run(&[suns()]).await.unwrap();

        assert_eq!(summary.keys_attempted, 2);
        assert_eq!(summary.keys_failed, 1);
        assert_eq!(summary.rows_written, 1);
        assert_eq!(fetcher.source().calls_for(&key(&suns(), 2022)), 3);
        assert_eq!(fetcher.sleeper.count(SleepReason::Backoff), 2);
    }

    #[tokio::test]
    async fn test_duplicates_across_keys_are_dropped() {
        let source = StubSource::new();
        let shared = sample_game_rows(&[("0022300001", "2023-10-24")]);
        source.respond(key(&suns(), 2022), shared.clone());
        source.respond(key(&suns(), 2023), shared);
        let mut fetcher = fetcher(source, MemorySink::new());

        let summary = fetcher.run(&[suns()]).await.unwrap();

        assert_eq!(summary.duplicates_dropped, 1);
        let saved = fetcher.sink().get("phx_games_2022_2024.csv").unwrap();
        assert_eq!(saved.len(), 1);
        // First seen wins
        assert_eq!(saved.get(0, columns::SEASON), Some("2022-23"));
    }

    #[tokio::test]
    async fn test_persist_failure_is_recorded_and_run_continues() {
        let source = StubSource::new();
        source.respond(key(&suns(), 2022), sample_game_rows(&[("1", "2022-10-19")]));
        source.respond(key(&nuggets(), 2022), sample_game_rows(&[("2", "2022-10-19")]));
        let sink = MemorySink::new();
        sink.fail_on("phx_games_2022_2024.csv");
        let mut fetcher = fetcher(source, sink);

        let summary = fetcher.run(&[suns(), nuggets()]).await.unwrap();

        assert!(!summary.is_clean());
        assert_eq!(summary.persist_failures, ["phx_games_2022_2024.csv"]);
        assert_eq!(summary.units_written, 1);
        assert_eq!(fetcher.sink().files(), ["den_games_2022_2024.csv"]);
    }

    #[tokio::test]
    async fn test_pacing_after_every_key_and_cooldown_across_units() {
        let policy = FetchPolicy {
            cooldown_every: 3,
            ..policy()
        };
        let mut fetcher = BulkFetcher::new(
            StubSource::new(),
            MemorySink::new(),
            RecordingSleeper::new(),
            policy,
            grid(),
        )
        .with_rng(SmallRng::seed_from_u64(3));

        fetcher.run(&[suns(), nuggets()]).await.unwrap();

        assert_eq!(fetcher.calls(), 4);
        assert_eq!(fetcher.sleeper.count(SleepReason::Pacing), 4);
        assert_eq!(fetcher.sleeper.count(SleepReason::Cooldown), 1);
        assert_eq!(
            fetcher.sleeper.reasons(),
            [
                SleepReason::Pacing,
                SleepReason::Pacing,
                SleepReason::Pacing,
                SleepReason::Cooldown,
                SleepReason::Pacing,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_season_range_is_an_error() {
        let mut fetcher = BulkFetcher::new(
            StubSource::new(),
            MemorySink::new(),
            RecordingSleeper::new(),
            policy(),
            KeyGrid::new(vec![], vec![SeasonType::Playoffs]),
        );
        assert!(matches!(
            fetcher.run(&[suns()]).await,
            Err(AppError::Config(_))
        ));
    }
}
