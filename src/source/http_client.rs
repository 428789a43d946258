//! HTTP client creation and configuration utilities

use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::constants::headers;

/// Creates the HTTP client used for every stats API request.
///
/// The timeout applies to the whole request; a request that runs over it surfaces as a
/// timeout error and is retried by the fetch loop. The stats API drops requests that do
/// not look like they come from a browser on nba.com, hence the default headers.
pub fn create_http_client_with_timeout(timeout_seconds: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .default_headers(default_headers())
        .build()
}

fn default_headers() -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::USER_AGENT, HeaderValue::from_static(headers::USER_AGENT));
    map.insert(header::REFERER, HeaderValue::from_static(headers::REFERER));
    map.insert(header::ORIGIN, HeaderValue::from_static(headers::ORIGIN));
    map.insert(header::ACCEPT, HeaderValue::from_static(headers::ACCEPT));
    map.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    map.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    map
}

/// Creates an HTTP client for testing with a short timeout
#[cfg(test)]
pub fn create_test_http_client() -> Client {
    create_http_client_with_timeout(5).expect("Failed to create test HTTP client")
}
