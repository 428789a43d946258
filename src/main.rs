use std::path::Path;

use clap::{CommandFactory, Parser};
use nba_warehouse::cli::{Args, Command, RunArgs, player_units, team_units};
use nba_warehouse::config::Config;
use nba_warehouse::constants::paths::{PLAYER_WAREHOUSE_FILE, TEAM_WAREHOUSE_FILE};
use nba_warehouse::error::AppError;
use nba_warehouse::fetch::{BulkFetcher, KeyGrid, TokioSleeper, run_until_interrupted};
use nba_warehouse::logging::setup_logging;
use nba_warehouse::sink::CsvDirSink;
use nba_warehouse::source::{StatsApiSource, create_http_client_with_timeout};
use nba_warehouse::units::Entity;
use nba_warehouse::warehouse::{WarehouseKind, build_warehouse};
use tracing::info;

// One request in flight at a time, so a single-threaded runtime is all we need
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).await?;
    if let Some(log_file) = &args.log_file {
        config.log_file_path = Some(log_file.clone());
    }

    if args.list_config {
        config.display(args.config.as_deref());
        return Ok(());
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let (log_file_path, _guard) = setup_logging(&config.log_file(), args.debug).await?;
    info!("Logs are being written to: {}", log_file_path.display());

    // Completed unit files are already renamed into place; the unit in progress is dropped
    run_until_interrupted(run_command(command, config), tokio::signal::ctrl_c()).await
}

async fn run_command(command: Command, mut config: Config) -> Result<(), AppError> {
    match command {
        Command::Teams { run, teams } => {
            run.apply(&mut config)?;
            let units = team_units(&teams)?;
            let grid = config.team_grid();
            let dir = config.games_dir.clone();
            pull(&config, &run, &units, grid, &dir).await
        }
        Command::Players { run, players } => {
            run.apply(&mut config)?;
            let units = player_units(&players, &config)?;
            if units.is_empty() {
                return Err(AppError::config_error(
                    "No players to pull. Add [[players]] entries to the config file or pass --player ID[=NAME]",
                ));
            }
            let grid = config.player_grid();
            let dir = config.players_dir.clone();
            pull(&config, &run, &units, grid, &dir).await
        }
        Command::Warehouse { kind } => {
            let kind = WarehouseKind::from(kind);
            let (input, file) = match kind {
                WarehouseKind::Team => (&config.games_dir, TEAM_WAREHOUSE_FILE),
                WarehouseKind::Player => (&config.players_dir, PLAYER_WAREHOUSE_FILE),
            };
            let output = config.warehouse_dir.join(file);
            let report = build_warehouse(input, &output, kind).await?;
            info!(
                "Saved: {} ({} rows from {} files, {} duplicates dropped)",
                report.output.display(),
                report.rows_written,
                report.files_read,
                report.duplicates_dropped
            );
            Ok(())
        }
    }
}

async fn pull(
    config: &Config,
    run: &RunArgs,
    units: &[Entity],
    grid: KeyGrid,
    dir: &Path,
) -> Result<(), AppError> {
    let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
    let source = StatsApiSource::new(client, config.api_base_url());
    let sink = CsvDirSink::new(dir);

    let mut fetcher = BulkFetcher::new(source, sink, TokioSleeper, config.fetch.clone(), grid)
        .force(run.force);
    let summary = fetcher.run(units).await?;

    if summary.is_clean() {
        Ok(())
    } else {
        Err(AppError::Persist(summary.persist_failures))
    }
}
