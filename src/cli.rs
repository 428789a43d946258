use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::AppError;
use crate::fetch::key::Season;
use crate::units::{Entity, parse_player_arg};
use crate::warehouse::WarehouseKind;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// NBA game warehouse builder
///
/// Pulls per-game team and player rows from the NBA stats API into one CSV file per team
/// or player, then consolidates those files into flat fact tables.
///
/// Pulls are slow on purpose: every request is followed by a pause and every few
/// minutes by a longer cooldown. Units whose file already exists are skipped, so an
/// interrupted pull can simply be started again.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
#[command(styles = get_styles())]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Read configuration from this file instead of the default location
    #[arg(
        long = "config",
        global = true,
        value_name = "PATH",
        help_heading = "Configuration"
    )]
    pub config: Option<PathBuf>,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Enable debug level logging for this crate.
    #[arg(long = "debug", global = true, help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", global = true, help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pull every team's games, one file per team
    Teams {
        #[command(flatten)]
        run: RunArgs,

        /// Only pull this team (abbreviation, e.g. PHX). Repeatable.
        #[arg(long = "team", value_name = "ABBR", help_heading = "Selection")]
        teams: Vec<String>,
    },

    /// Pull game logs for the configured players, one file per player
    Players {
        #[command(flatten)]
        run: RunArgs,

        /// Pull this player instead of the configured list. Repeatable.
        #[arg(long = "player", value_name = "ID[=NAME]", help_heading = "Selection")]
        players: Vec<String>,
    },

    /// Consolidate unit files into one fact table
    Warehouse {
        #[arg(value_enum)]
        kind: WarehouseTarget,
    },
}

/// Options shared by the pull commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// First season, e.g. 2015 or 2015-16
    #[arg(long = "start-season", value_name = "SEASON", help_heading = "Seasons")]
    pub start_season: Option<Season>,

    /// Last season (inclusive)
    #[arg(long = "end-season", value_name = "SEASON", help_heading = "Seasons")]
    pub end_season: Option<Season>,

    /// Re-pull units even if their file already exists
    #[arg(long = "force", short = 'f')]
    pub force: bool,
}

impl RunArgs {
    /// Applies season overrides to `config` and re-validates it.
    pub fn apply(&self, config: &mut Config) -> Result<(), AppError> {
        if let Some(season) = self.start_season {
            config.start_season = season.start_year();
        }
        if let Some(season) = self.end_season {
            config.end_season = season.start_year();
        }
        config.validate()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseTarget {
    /// fact_team_game.csv from the team files
    Team,
    /// fact_player_game.csv from the player files
    Player,
}

impl From<WarehouseTarget> for WarehouseKind {
    fn from(target: WarehouseTarget) -> Self {
        match target {
            WarehouseTarget::Team => WarehouseKind::Team,
            WarehouseTarget::Player => WarehouseKind::Player,
        }
    }
}

/// Resolves `--team` arguments, or every franchise when none were given.
pub fn team_units(teams: &[String]) -> Result<Vec<Entity>, AppError> {
    if teams.is_empty() {
        return Ok(Entity::all_teams());
    }
    teams.iter().map(|abbr| Entity::team(abbr)).collect()
}

/// Resolves `--player` arguments, or the configured players when none were given.
pub fn player_units(players: &[String], config: &Config) -> Result<Vec<Entity>, AppError> {
    if players.is_empty() {
        return Ok(config.player_units());
    }
    players.iter().map(|arg| parse_player_arg(arg)).collect()
}
