//! Static NBA franchise table.
//!
//! The team list changes rarely enough that looking it up over the network is not worth a
//! request against the rate limit. Ids are the stats API `TEAM_ID` values.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Franchise {
    pub id: u64,
    pub abbreviation: &'static str,
    pub full_name: &'static str,
}

const fn franchise(id: u64, abbreviation: &'static str, full_name: &'static str) -> Franchise {
    Franchise {
        id,
        abbreviation,
        full_name,
    }
}

/// All 30 franchises ordered by team id
pub static FRANCHISES: [Franchise; 30] = [
    franchise(1610612737, "ATL", "Atlanta Hawks"),
    franchise(1610612738, "BOS", "Boston Celtics"),
    franchise(1610612739, "CLE", "Cleveland Cavaliers"),
    franchise(1610612740, "NOP", "New Orleans Pelicans"),
    franchise(1610612741, "CHI", "Chicago Bulls"),
    franchise(1610612742, "DAL", "Dallas Mavericks"),
    franchise(1610612743, "DEN", "Denver Nuggets"),
    franchise(1610612744, "GSW", "Golden State Warriors"),
    franchise(1610612745, "HOU", "Houston Rockets"),
    franchise(1610612746, "LAC", "LA Clippers"),
    franchise(1610612747, "LAL", "Los Angeles Lakers"),
    franchise(1610612748, "MIA", "Miami Heat"),
    franchise(1610612749, "MIL", "Milwaukee Bucks"),
    franchise(1610612750, "MIN", "Minnesota Timberwolves"),
    franchise(1610612751, "BKN", "Brooklyn Nets"),
    franchise(1610612752, "NYK", "New York Knicks"),
    franchise(1610612753, "ORL", "Orlando Magic"),
    franchise(1610612754, "IND", "Indiana Pacers"),
    franchise(1610612755, "PHI", "Philadelphia 76ers"),
    franchise(1610612756, "PHX", "Phoenix Suns"),
    franchise(1610612757, "POR", "Portland Trail Blazers"),
    franchise(1610612758, "SAC", "Sacramento Kings"),
    franchise(1610612759, "SAS", "San Antonio Spurs"),
    franchise(1610612760, "OKC", "Oklahoma City Thunder"),
    franchise(1610612761, "TOR", "Toronto Raptors"),
    franchise(1610612762, "UTA", "Utah Jazz"),
    franchise(1610612763, "MEM", "Memphis Grizzlies"),
    franchise(1610612764, "WAS", "Washington Wizards"),
    franchise(1610612765, "DET", "Detroit Pistons"),
    franchise(1610612766, "CHA", "Charlotte Hornets"),
];

static BY_ABBREVIATION: LazyLock<HashMap<&'static str, &'static Franchise>> =
    LazyLock::new(|| FRANCHISES.iter().map(|f| (f.abbreviation, f)).collect());

/// Looks up a franchise by abbreviation, case-insensitively.
pub fn find_by_abbreviation(abbreviation: &str) -> Result<&'static Franchise, AppError> {
    let upper = abbreviation.trim().to_ascii_uppercase();
    BY_ABBREVIATION
        .get(upper.as_str())
        .copied()
        .ok_or_else(|| AppError::UnknownTeam(abbreviation.to_string()))
}
