//! Application-wide constants and configuration defaults
//!
//! Defaults here are the conservative values the full-league team pull runs with.
//! Everything in `fetch` can be overridden from the config file.

/// Default stats API origin
pub const DEFAULT_API_DOMAIN: &str = "https://stats.nba.com";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 60;

/// Maximum number of idle connections per host in the HTTP client pool.
/// Requests are strictly sequential, so one is enough.
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 1;

/// League identifier the stats API expects for the NBA
pub const NBA_LEAGUE_ID: &str = "00";

/// Default season bounds (start years, inclusive). 2025 means 2025-26.
pub const DEFAULT_START_SEASON: u16 = 2015;
pub const DEFAULT_END_SEASON: u16 = 2025;

/// Accepted season start years. 1946-47 is the league's first season.
pub const MIN_SEASON: u16 = 1946;
pub const MAX_SEASON: u16 = 2100;

/// Default output locations, relative to the working directory
pub mod paths {
    pub const GAMES_DIR: &str = "to_games_csvs";
    pub const PLAYERS_DIR: &str = "to_csvs";
    pub const WAREHOUSE_DIR: &str = "warehouse";
    pub const TEAM_WAREHOUSE_FILE: &str = "fact_team_game.csv";
    pub const PLAYER_WAREHOUSE_FILE: &str = "fact_player_game.csv";
    /// Suffix for files being written; renamed into place once complete
    pub const PARTIAL_SUFFIX: &str = ".partial";
    pub const LOG_FILE_NAME: &str = "nba_warehouse.log";
}

/// Retry and pacing defaults for the bulk fetch loop
pub mod fetch {
    /// Attempts per key, including the first one
    pub const MAX_TRIES: u32 = 4;

    /// First backoff delay (milliseconds)
    pub const BASE_DELAY_MS: u64 = 800;

    /// Multiplier applied to the backoff delay after every failed attempt
    pub const BACKOFF_FACTOR: f64 = 2.2;

    /// Upper bound of the uniform jitter added to each backoff wait (milliseconds)
    pub const JITTER_MAX_MS: u64 = 1500;

    /// Cap on a single backoff delay before jitter (seconds)
    pub const MAX_DELAY_SECONDS: u64 = 60;

    /// Per-call pacing window (milliseconds)
    pub const SLEEP_MIN_MS: u64 = 600;
    pub const SLEEP_MAX_MS: u64 = 1000;

    /// Insert a cooldown after this many calls. Zero disables cooldowns.
    pub const COOLDOWN_EVERY: u64 = 120;

    /// Length of the cooldown pause (seconds)
    pub const COOLDOWN_SECONDS: u64 = 25;

    /// Largest accepted `max_delay_seconds`, `jitter_max_ms` and `cooldown_seconds` values
    pub const MAX_DELAY_LIMIT_SECONDS: u64 = 3600;
    pub const JITTER_LIMIT_MS: u64 = 60_000;
    pub const COOLDOWN_LIMIT_SECONDS: u64 = 3600;
}

/// Column names shared by the fetch loop and the warehouse
pub mod columns {
    pub const GAME_ID: &str = "GAME_ID";
    pub const GAME_DATE: &str = "GAME_DATE";
    pub const SEASON: &str = "SEASON";
    pub const SEASON_TYPE: &str = "SEASON_TYPE";
    pub const TEAM_ID: &str = "TEAM_ID";
    pub const TEAM_ABBR: &str = "TEAM_ABBR";
    pub const TEAM_NAME: &str = "TEAM_NAME";
    pub const PLAYER_ID: &str = "PLAYER_ID";
    pub const PLAYER_NAME: &str = "PLAYER_NAME";
}

/// Season type labels, spelled the way the stats API expects them
pub mod season_types {
    pub const REGULAR_SEASON: &str = "Regular Season";
    pub const PLAYOFFS: &str = "Playoffs";
}

/// Request headers the stats API wants to see before it answers
pub mod headers {
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    pub const REFERER: &str = "https://www.nba.com/";
    pub const ORIGIN: &str = "https://www.nba.com";
    pub const ACCEPT: &str = "application/json, text/plain, */*";
}

/// Environment variable names
pub mod env_vars {
    /// Environment variable for API domain override
    pub const API_DOMAIN: &str = "NBA_WAREHOUSE_API_DOMAIN";

    /// Environment variable for log file path override
    pub const LOG_FILE: &str = "NBA_WAREHOUSE_LOG_FILE";

    /// Environment variable for HTTP timeout override in seconds
    pub const HTTP_TIMEOUT: &str = "NBA_WAREHOUSE_HTTP_TIMEOUT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_bounds_are_ordered() {
        let start = DEFAULT_START_SEASON;
        let end = DEFAULT_END_SEASON;
        assert!(start <= end);
    }

    #[test]
    fn test_fetch_constants_are_reasonable() {
        let max_tries = fetch::MAX_TRIES;
        let factor = fetch::BACKOFF_FACTOR;
        let sleep_min = fetch::SLEEP_MIN_MS;
        let sleep_max = fetch::SLEEP_MAX_MS;
        let base = fetch::BASE_DELAY_MS;
        let cap = fetch::MAX_DELAY_SECONDS;

        assert!(max_tries > 0);
        assert!(factor >= 1.0);
        assert!(sleep_min <= sleep_max);
        assert!(base <= cap * 1000);

        // Cooldown should be noticeably longer than normal pacing
        assert!(fetch::COOLDOWN_SECONDS * 1000 > sleep_max);
    }

    #[test]
    fn test_env_var_names_are_not_empty() {
        let api_domain = env_vars::API_DOMAIN;
        let log_file = env_vars::LOG_FILE;
        let timeout = env_vars::HTTP_TIMEOUT;

        assert!(!api_domain.is_empty());
        assert!(!log_file.is_empty());
        assert!(!timeout.is_empty());
    }
}
