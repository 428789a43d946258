//! NBA game warehouse library
//!
//! Pulls per-game team and player rows from the NBA stats API with a slow, resumable
//! fetch loop and consolidates the resulting CSV files into flat fact tables.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nba_warehouse::fetch::{BulkFetcher, FetchPolicy, KeyGrid, Season, SeasonType, TokioSleeper};
//! use nba_warehouse::sink::CsvDirSink;
//! use nba_warehouse::source::{StatsApiSource, create_http_client_with_timeout};
//! use nba_warehouse::units::Entity;
//! use nba_warehouse::error::AppError;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), AppError> {
//!     let client = create_http_client_with_timeout(60)?;
//!     let source = StatsApiSource::new(client, "https://stats.nba.com");
//!     let grid = KeyGrid::new(
//!         Season::range(2022, 2024),
//!         vec![SeasonType::RegularSeason, SeasonType::Playoffs],
//!     );
//!
//!     let mut fetcher = BulkFetcher::new(
//!         source,
//!         CsvDirSink::new("to_games_csvs"),
//!         TokioSleeper,
//!         FetchPolicy::default(),
//!         grid,
//!     );
//!     let summary = fetcher.run(&[Entity::team("PHX")?]).await?;
//!     println!("{} rows written", summary.rows_written);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod sink;
pub mod source;
pub mod table;
pub mod teams;
pub mod testing_utils;
pub mod units;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::AppError;
pub use fetch::{BulkFetcher, FetchPolicy, RunSummary};
pub use table::Table;
pub use warehouse::{WarehouseKind, build_warehouse};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
