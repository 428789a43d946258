use crate::error::AppError;
use crate::fetch::key::Season;
use std::path::Path;

use super::Config;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API domain cannot be empty and must be a valid URL or domain name
/// - If log file path is provided, it cannot be empty and its directory must be creatable
/// - HTTP timeout must be positive
/// - Seasons must lie in `MIN_SEASON..=MAX_SEASON` and the range must not be inverted
/// - Both season type lists must be non-empty
/// - The `[fetch]` table must describe a usable retry and pacing schedule
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    validate_api_domain(&config.api_domain)?;
    validate_log_file_path(&config.log_file_path)?;

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "http_timeout_seconds must be greater than zero",
        ));
    }

    Season(config.start_season).check_bounds()?;
    Season(config.end_season).check_bounds()?;
    if config.start_season > config.end_season {
        return Err(AppError::config_error(format!(
            "start_season ({}) is after end_season ({})",
            config.start_season, config.end_season
        )));
    }

    if config.team_season_types.is_empty() {
        return Err(AppError::config_error("team_season_types cannot be empty"));
    }
    if config.player_season_types.is_empty() {
        return Err(AppError::config_error(
            "player_season_types cannot be empty",
        ));
    }

    config.fetch.validate()
}

fn validate_api_domain(api_domain: &str) -> Result<(), AppError> {
    if api_domain.is_empty() {
        return Err(AppError::config_error("API domain cannot be empty"));
    }

    // Without a scheme it should at least look like a host name
    if !api_domain.starts_with("http://")
        && !api_domain.starts_with("https://")
        && !api_domain.contains('.')
        && !api_domain.starts_with("localhost")
    {
        return Err(AppError::config_error(
            "API domain must be a valid URL or domain name",
        ));
    }
    Ok(())
}

fn validate_log_file_path(log_file_path: &Option<String>) -> Result<(), AppError> {
    let Some(log_path) = log_file_path else {
        return Ok(());
    };

    if log_path.is_empty() {
        return Err(AppError::config_error("Log file path cannot be empty"));
    }

    if let Some(parent) = Path::new(log_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::config_error(format!(
                "Cannot create log directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}
