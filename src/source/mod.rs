//! The remote data source the fetch loop pulls from.

pub mod http_client;
pub mod models;
pub mod stats_api;
pub mod urls;

pub use http_client::create_http_client_with_timeout;
pub use stats_api::StatsApiSource;

use crate::error::AppError;
use crate::fetch::key::FetchKey;
use crate::table::Table;

/// One request per call, no retries. Failures are classified with [`AppError::is_transient`].
#[allow(async_fn_in_trait)]
pub trait DataSource {
    async fn query(&self, key: &FetchKey) -> Result<Table, AppError>;
}
