//! Fetch keys and the season grid they are enumerated from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SEASON, MIN_SEASON, season_types};
use crate::error::AppError;
use crate::units::{Entity, EntityKind};

/// A season identified by the calendar year it starts in. `Season(2015)` is "2015-16".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season(pub u16);

impl Season {
    pub fn start_year(self) -> u16 {
        self.0
    }

    /// Calendar year the season ends in
    pub fn end_year(self) -> u32 {
        u32::from(self.0) + 1
    }

    /// Fails unless the start year lies in `MIN_SEASON..=MAX_SEASON`.
    pub fn check_bounds(self) -> Result<Self, AppError> {
        if (MIN_SEASON..=MAX_SEASON).contains(&self.0) {
            Ok(self)
        } else {
            Err(AppError::config_error(format!(
                "Season {} is outside {MIN_SEASON}..={MAX_SEASON}",
                self.0
            )))
        }
    }

    /// All seasons from `first` to `last`, inclusive. Empty when `first > last`.
    pub fn range(first: u16, last: u16) -> Vec<Season> {
        (first..=last).map(Season).collect()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.0, self.end_year() % 100)
    }
}

impl FromStr for Season {
    type Err = AppError;

    /// Accepts `2015` or `2015-16`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, suffix) = match s.split_once('-') {
            Some((year, suffix)) => (year, Some(suffix)),
            None => (s, None),
        };
        let year: u16 = year
            .parse()
            .map_err(|_| AppError::config_error(format!("Invalid season '{s}'")))?;
        let season = Season(year).check_bounds()?;
        if let Some(suffix) = suffix
            && suffix != format!("{:02}", season.end_year() % 100)
        {
            return Err(AppError::config_error(format!(
                "Invalid season '{s}', expected {season}"
            )));
        }
        Ok(season)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonType {
    #[serde(rename = "Pre Season")]
    PreSeason,
    #[serde(rename = "Regular Season")]
    RegularSeason,
    #[serde(rename = "PlayIn")]
    PlayIn,
    #[serde(rename = "Playoffs")]
    Playoffs,
}

impl SeasonType {
    /// The label the stats API uses for the `SeasonType` parameter
    pub fn as_str(self) -> &'static str {
        match self {
            SeasonType::PreSeason => "Pre Season",
            SeasonType::RegularSeason => season_types::REGULAR_SEASON,
            SeasonType::PlayIn => "PlayIn",
            SeasonType::Playoffs => season_types::PLAYOFFS,
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of remote work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub kind: EntityKind,
    pub entity_id: u64,
    pub season: Season,
    pub season_type: SeasonType,
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} {} {}",
            self.kind, self.entity_id, self.season, self.season_type
        )
    }
}

/// Season × season-type grid applied to every unit of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGrid {
    seasons: Vec<Season>,
    season_types: Vec<SeasonType>,
}

impl KeyGrid {
    pub fn new(seasons: Vec<Season>, season_types: Vec<SeasonType>) -> Self {
        Self {
            seasons,
            season_types,
        }
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// Number of keys each unit expands to
    pub fn keys_per_unit(&self) -> usize {
        self.seasons.len() * self.season_types.len()
    }

    /// Keys for one unit: season-major, then season types in configured order.
    pub fn keys_for(&self, entity: &Entity) -> Vec<FetchKey> {
        self.seasons
            .iter()
            .flat_map(|&season| {
                self.season_types.iter().map(move |&season_type| FetchKey {
                    kind: entity.kind(),
                    entity_id: entity.id(),
                    season,
                    season_type,
                })
            })
            .collect()
    }
}
