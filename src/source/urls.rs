//! URL building utilities for stats API endpoints

use reqwest::Url;

use crate::constants::NBA_LEAGUE_ID;
use crate::error::AppError;
use crate::fetch::key::{Season, SeasonType};

fn build_url(api_domain: &str, endpoint: &str, params: &[(&str, String)]) -> Result<Url, AppError> {
    let base = format!("{}/stats/{endpoint}", api_domain.trim_end_matches('/'));
    Url::parse_with_params(&base, params)
        .map_err(|e| AppError::config_error(format!("Invalid API URL '{base}': {e}")))
}

/// Builds the game finder URL that lists one team's games for a season and season type.
///
/// # Example
/// ```
/// use nba_warehouse::fetch::key::{Season, SeasonType};
/// use nba_warehouse::source::urls::build_league_game_finder_url;
///
/// let url = build_league_game_finder_url(
///     "https://stats.nba.com",
///     1610612756,
///     Season(2023),
///     SeasonType::RegularSeason,
/// )
/// .unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://stats.nba.com/stats/leaguegamefinder?PlayerOrTeam=T&TeamID=1610612756&Season=2023-24&SeasonType=Regular+Season&LeagueID=00"
/// );
/// ```
pub fn build_league_game_finder_url(
    api_domain: &str,
    team_id: u64,
    season: Season,
    season_type: SeasonType,
) -> Result<Url, AppError> {
    build_url(
        api_domain,
        "leaguegamefinder",
        &[
            ("PlayerOrTeam", "T".to_string()),
            ("TeamID", team_id.to_string()),
            ("Season", season.to_string()),
            ("SeasonType", season_type.as_str().to_string()),
            ("LeagueID", NBA_LEAGUE_ID.to_string()),
        ],
    )
}

/// Builds the game log URL for one player's season.
pub fn build_player_game_log_url(
    api_domain: &str,
    player_id: u64,
    season: Season,
    season_type: SeasonType,
) -> Result<Url, AppError> {
    build_url(
        api_domain,
        "playergamelog",
        &[
            ("PlayerID", player_id.to_string()),
            ("Season", season.to_string()),
            ("SeasonType", season_type.as_str().to_string()),
            ("LeagueID", NBA_LEAGUE_ID.to_string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_game_log_url() {
        let url = build_player_game_log_url(
            "https://stats.nba.com/",
            1626164,
            Season(2015),
            SeasonType::Playoffs,
        )
        .unwrap();

        assert_eq!(url.path(), "/stats/playergamelog");
        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(params.contains(&("PlayerID".to_string(), "1626164".to_string())));
        assert!(params.contains(&("Season".to_string(), "2015-16".to_string())));
        assert!(params.contains(&("SeasonType".to_string(), "Playoffs".to_string())));
    }

    #[test]
    fn test_invalid_domain_is_a_config_error() {
        let result = build_league_game_finder_url(
            "not a domain",
            1,
            Season(2015),
            SeasonType::RegularSeason,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
