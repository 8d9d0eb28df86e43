//! External API integrations

pub mod yr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::ForecastDocument;

use crate::error::AppResult;

pub use yr::YrClient;

/// Freshness headers of an upstream response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Freshness {
    pub last_modified: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
}

/// Outcome of a (conditional) upstream fetch
#[derive(Debug, Clone)]
pub enum UpstreamResponse {
    /// New data (HTTP 200)
    Modified {
        document: ForecastDocument,
        freshness: Freshness,
    },
    /// Unchanged since `If-Modified-Since` (HTTP 304)
    NotModified { freshness: Freshness },
}

/// Retrieves the forecast document for one configured location
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    /// Fetch the document, conditionally when `if_modified_since` is set.
    ///
    /// Transport failures, timeouts and non-success statuses other than
    /// 304 are reported as `AppError::Upstream`.
    async fn fetch(&self, if_modified_since: Option<DateTime<Utc>>) -> AppResult<UpstreamResponse>;
}
