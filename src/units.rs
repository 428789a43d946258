//! Units of persistence: one team's or one player's full history, one CSV file each.

use std::fmt;

use crate::constants::columns;
use crate::error::AppError;
use crate::fetch::key::{FetchKey, Season};
use crate::table::Table;
use crate::teams::{self, Franchise};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Team,
    Player,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Team => f.write_str("team"),
            EntityKind::Player => f.write_str("player"),
        }
    }
}

impl EntityKind {
    /// Columns that identify one row per (game, entity)
    pub fn natural_key(self) -> [&'static str; 2] {
        match self {
            EntityKind::Team => [columns::GAME_ID, columns::TEAM_ID],
            EntityKind::Player => [columns::GAME_ID, columns::PLAYER_ID],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Team {
        id: u64,
        abbreviation: String,
        name: String,
    },
    Player {
        id: u64,
        name: String,
    },
}

impl From<&Franchise> for Entity {
    fn from(f: &Franchise) -> Self {
        Entity::Team {
            id: f.id,
            abbreviation: f.abbreviation.to_string(),
            name: f.full_name.to_string(),
        }
    }
}

impl Entity {
    /// Resolves a team unit from its abbreviation using the static franchise table.
    pub fn team(abbreviation: &str) -> Result<Self, AppError> {
        teams::find_by_abbreviation(abbreviation).map(Entity::from)
    }

    /// Every franchise, in team id order
    pub fn all_teams() -> Vec<Self> {
        teams::FRANCHISES.iter().map(Entity::from).collect()
    }

    /// A player unit. Without a known name the unit is labelled `player_{id}`.
    pub fn player(id: u64, name: Option<String>) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("player_{id}"));
        Entity::Player { id, name }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Team { .. } => EntityKind::Team,
            Entity::Player { .. } => EntityKind::Player,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Entity::Team { id, .. } | Entity::Player { id, .. } => *id,
        }
    }

    /// Short label for log lines
    pub fn label(&self) -> &str {
        match self {
            Entity::Team { abbreviation, .. } => abbreviation,
            Entity::Player { name, .. } => name,
        }
    }

    /// File name of the unit's CSV. The range end is the calendar year the last season ends in.
    pub fn file_name(&self, first: Season, last: Season) -> String {
        let (from, to) = (first.start_year(), last.end_year());
        match self {
            Entity::Team { abbreviation, .. } => {
                format!("{}_games_{from}_{to}.csv", abbreviation.to_lowercase())
            }
            Entity::Player { name, .. } => {
                format!("{}_gamelogs_{from}_{to}.csv", safe_file_stem(name))
            }
        }
    }

    /// Appends the key's dimensions to every row of a fetched table.
    pub fn tag(&self, key: &FetchKey, table: &mut Table) {
        table.set_column(columns::SEASON, &key.season.to_string());
        table.set_column(columns::SEASON_TYPE, key.season_type.as_str());
        match self {
            Entity::Team {
                id,
                abbreviation,
                name,
            } => {
                table.set_column(columns::TEAM_ABBR, abbreviation);
                table.set_column(columns::TEAM_ID, &id.to_string());
                table.set_column(columns::TEAM_NAME, name);
            }
            Entity::Player { id, name } => {
                table.set_column(columns::PLAYER_ID, &id.to_string());
                table.set_column(columns::PLAYER_NAME, name);
            }
        }
    }
}

/// Lowercases a display name and keeps it filesystem friendly: `"Devin Booker"` → `devin_booker`.
fn safe_file_stem(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}

/// Parses a `--player` argument: `ID` or `ID=Display Name`.
pub fn parse_player_arg(arg: &str) -> Result<Entity, AppError> {
    let (id, name) = match arg.split_once('=') {
        Some((id, name)) => (id, Some(name.to_string())),
        None => (arg, None),
    };
    let id: u64 = id
        .trim()
        .parse()
        .map_err(|_| AppError::config_error(format!("Invalid player id in '{arg}'")))?;
    Ok(Entity::player(id, name))
}
