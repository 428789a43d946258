use crate::constants::{self, env_vars, paths as default_paths};
use crate::error::AppError;
use crate::fetch::key::{KeyGrid, Season, SeasonType};
use crate::fetch::policy::FetchPolicy;
use crate::units::Entity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// A player to pull game logs for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub id: u64,
    pub name: String,
}

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Stats API origin. A bare host name is treated as https.
    pub api_domain: String,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for a single API request
    pub http_timeout_seconds: u64,
    /// First season to pull, as its start year (2015 means 2015-16)
    pub start_season: u16,
    /// Last season to pull, inclusive
    pub end_season: u16,
    /// Per-team unit files
    pub games_dir: PathBuf,
    /// Per-player unit files
    pub players_dir: PathBuf,
    pub warehouse_dir: PathBuf,
    pub team_season_types: Vec<SeasonType>,
    pub player_season_types: Vec<SeasonType>,
    /// Retry and pacing parameters
    pub fetch: FetchPolicy,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<PlayerEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_domain: constants::DEFAULT_API_DOMAIN.to_string(),
            log_file_path: None,
            http_timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
            start_season: constants::DEFAULT_START_SEASON,
            end_season: constants::DEFAULT_END_SEASON,
            games_dir: PathBuf::from(default_paths::GAMES_DIR),
            players_dir: PathBuf::from(default_paths::PLAYERS_DIR),
            warehouse_dir: PathBuf::from(default_paths::WAREHOUSE_DIR),
            team_season_types: vec![SeasonType::RegularSeason, SeasonType::Playoffs],
            player_season_types: vec![SeasonType::RegularSeason],
            fetch: FetchPolicy::default(),
            players: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default location when `path` is `None`.
    /// Environment variables override file values, and the result is validated.
    ///
    /// # Environment Variables
    /// - `NBA_WAREHOUSE_API_DOMAIN` - Override API domain
    /// - `NBA_WAREHOUSE_LOG_FILE` - Override log file path
    /// - `NBA_WAREHOUSE_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    ///
    /// # Notes
    /// - A missing file at the default location means built-in defaults
    /// - A missing file given explicitly is an error
    pub async fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::config_error(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from_path(path).await?
            }
            None => {
                let default_path = get_config_path();
                if default_path.exists() {
                    Self::load_from_path(&default_path).await?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file without applying overrides or validation.
    pub async fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Applies environment variable overrides. Unparseable timeouts are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_domain) = std::env::var(env_vars::API_DOMAIN) {
            self.api_domain = api_domain;
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// API origin with a scheme, ready for URL building.
    pub fn api_base_url(&self) -> String {
        if self.api_domain.starts_with("http://") || self.api_domain.starts_with("https://") {
            self.api_domain.clone()
        } else {
            format!("https://{}", self.api_domain)
        }
    }

    pub fn seasons(&self) -> Vec<Season> {
        Season::range(self.start_season, self.end_season)
    }

    pub fn team_grid(&self) -> KeyGrid {
        KeyGrid::new(self.seasons(), self.team_season_types.clone())
    }

    pub fn player_grid(&self) -> KeyGrid {
        KeyGrid::new(self.seasons(), self.player_season_types.clone())
    }

    /// Player units listed in the `[[players]]` tables
    pub fn player_units(&self) -> Vec<Entity> {
        self.players
            .iter()
            .map(|p| Entity::player(p.id, Some(p.name.clone())))
            .collect()
    }

    /// Log file location: the configured path, or the platform log directory.
    pub fn log_file(&self) -> PathBuf {
        match &self.log_file_path {
            Some(path) => PathBuf::from(path),
            None => get_log_dir_path().join(default_paths::LOG_FILE_NAME),
        }
    }

    /// Saves configuration to a file path, creating the parent directory if needed.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &Path) -> Result<(), AppError> {
        let config_dir = path.parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{}' has no parent directory", path.display()))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(&Config {
            api_domain: self.api_base_url(),
            ..self.clone()
        })?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Prints the effective configuration to stdout.
    pub fn display(&self, source: Option<&Path>) {
        let config_path = source.map(Path::to_path_buf).unwrap_or_else(get_config_path);
        let separator = "────────────────────────────────────";

        println!("\nCurrent Configuration");
        println!("{separator}");
        println!("Config Location:");
        if config_path.exists() {
            println!("{}", config_path.display());
        } else {
            println!("{} (not found, using defaults)", config_path.display());
        }
        println!("{separator}");
        println!("API Domain:");
        println!("{}", self.api_base_url());
        println!("HTTP Timeout:");
        println!("{} seconds", self.http_timeout_seconds);
        println!("{separator}");
        println!("Seasons:");
        match (self.seasons().first(), self.seasons().last()) {
            (Some(first), Some(last)) => println!("{first} to {last}"),
            _ => println!("(none)"),
        }
        println!(
            "Team season types: {}",
            join(self.team_season_types.iter().map(|t| t.as_str()))
        );
        println!(
            "Player season types: {}",
            join(self.player_season_types.iter().map(|t| t.as_str()))
        );
        println!("{separator}");
        println!("Output:");
        println!("Teams:     {}", self.games_dir.display());
        println!("Players:   {}", self.players_dir.display());
        println!("Warehouse: {}", self.warehouse_dir.display());
        println!("{separator}");
        println!("Fetch:");
        let f = &self.fetch;
        println!(
            "{} tries, backoff {}ms x{} (cap {}s, jitter up to {}ms)",
            f.max_tries, f.base_delay_ms, f.backoff_factor, f.max_delay_seconds, f.jitter_max_ms
        );
        println!(
            "pause {}-{}ms after each call, {}s cooldown every {} calls",
            f.sleep_min_ms, f.sleep_max_ms, f.cooldown_seconds, f.cooldown_every
        );
        println!("{separator}");
        println!("Players:");
        if self.players.is_empty() {
            println!("(none configured)");
        }
        for player in &self.players {
            println!("{} {}", player.id, player.name);
        }
        println!("{separator}");
        println!("Log File Location:");
        println!("{}", self.log_file().display());
        if self.log_file_path.is_none() {
            println!("(Default location)");
        }
    }
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
