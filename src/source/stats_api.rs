use reqwest::Client;
use tracing::{debug, error, info};

use super::DataSource;
use super::models::StatsResponse;
use super::urls::{build_league_game_finder_url, build_player_game_log_url};
use crate::error::AppError;
use crate::fetch::key::FetchKey;
use crate::table::Table;
use crate::units::EntityKind;

/// Stats API backed data source. Team keys hit the game finder, player keys the game log.
#[derive(Debug, Clone)]
pub struct StatsApiSource {
    client: Client,
    api_domain: String,
}

impl StatsApiSource {
    pub fn new(client: Client, api_domain: impl Into<String>) -> Self {
        Self {
            client,
            api_domain: api_domain.into(),
        }
    }

    pub fn api_domain(&self) -> &str {
        &self.api_domain
    }

    fn url_for(&self, key: &FetchKey) -> Result<String, AppError> {
        let url = match key.kind {
            EntityKind::Team => build_league_game_finder_url(
                &self.api_domain,
                key.entity_id,
                key.season,
                key.season_type,
            )?,
            EntityKind::Player => build_player_game_log_url(
                &self.api_domain,
                key.entity_id,
                key.season,
                key.season_type,
            )?,
        };
        Ok(url.to_string())
    }
}

impl DataSource for StatsApiSource {
    async fn query(&self, key: &FetchKey) -> Result<Table, AppError> {
        let url = self.url_for(key)?;
        let response: StatsResponse = fetch(&self.client, &url).await?;
        let table = response.into_table(&url)?;
        debug!("{key}: {} rows", table.len());
        Ok(table)
    }
}

/// Performs a single GET and deserializes the body, mapping every failure to an [`AppError`]
/// whose [`AppError::is_transient`] tells the caller whether another attempt makes sense.
async fn fetch<T: serde::de::DeserializeOwned>(client: &Client, url: &str) -> Result<T, AppError> {
    info!("Fetching data from URL: {url}");

    let response = client.get(url).send().await.map_err(|e| {
        error!("Request failed for URL {url}: {e}");
        if e.is_timeout() {
            AppError::network_timeout(url)
        } else if e.is_connect() {
            AppError::network_connection(url, e.to_string())
        } else {
            AppError::ApiFetch(e)
        }
    })?;

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {status_code} - {reason} (URL: {url})");

        return Err(match status_code {
            404 => AppError::api_not_found(url),
            429 => AppError::api_rate_limit(reason, url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let response_text = response.text().await.map_err(|e| {
        error!("Failed to read response text from URL {url}: {e}");
        if e.is_timeout() {
            AppError::network_timeout(url)
        } else {
            AppError::ApiFetch(e)
        }
    })?;

    debug!("Response length: {} bytes", response_text.len());

    serde_json::from_str::<T>(&response_text).map_err(|e| {
        error!("Failed to parse API response: {e} (URL: {url})");
        debug!(
            "Response text (first 200 chars): {}",
            response_text.chars().take(200).collect::<String>()
        );

        let trimmed = response_text.trim_start();
        if trimmed.is_empty() {
            AppError::api_no_data("Response body is empty", url)
        } else if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            AppError::api_malformed_json("Response is not valid JSON", url)
        } else if e.is_syntax() || e.is_eof() {
            // Cut off mid-stream by the upstream
            AppError::api_malformed_json(e.to_string(), url)
        } else {
            AppError::api_unexpected_structure(e.to_string(), url)
        }
    })
}
