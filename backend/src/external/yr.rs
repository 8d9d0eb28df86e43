//! met.no Locationforecast client
//!
//! Fetches the raw time series for the configured point and reports the
//! `Last-Modified` / `Expires` headers used by the forecast cache.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, EXPIRES, IF_MODIFIED_SINCE, LAST_MODIFIED, USER_AGENT};
use reqwest::{Client, StatusCode};
use shared::{ForecastDocument, GpsCoordinates};

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use crate::external::{ForecastFetcher, Freshness, UpstreamResponse};

/// Locationforecast API client bound to one point
#[derive(Clone)]
pub struct YrClient {
    client: Client,
    base_url: String,
    user_agent: String,
    coordinates: GpsCoordinates,
}

impl YrClient {
    /// Create a new YrClient
    pub fn new(config: &UpstreamConfig, coordinates: GpsCoordinates) -> AppResult<Self> {
        Self::with_base_url(
            config.base_url.clone(),
            config.user_agent.clone(),
            Duration::from_secs(config.timeout_secs),
            coordinates,
        )
    }

    /// Create a new YrClient with custom base URL (for testing)
    pub fn with_base_url(
        base_url: String,
        user_agent: String,
        timeout: Duration,
        coordinates: GpsCoordinates,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            user_agent,
            coordinates,
        })
    }

    /// Request URL; the provider accepts at most 4 decimals
    pub fn forecast_url(&self) -> String {
        format!(
            "{}?lat={:.4}&lon={:.4}",
            self.base_url, self.coordinates.latitude, self.coordinates.longitude
        )
    }

    fn request_headers(&self, if_modified_since: Option<DateTime<Utc>>) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| AppError::Configuration(format!("Invalid User-Agent: {}", e)))?,
        );

        if let Some(since) = if_modified_since {
            if let Ok(value) = HeaderValue::from_str(&format_http_date(since)) {
                headers.insert(IF_MODIFIED_SINCE, value);
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl ForecastFetcher for YrClient {
    async fn fetch(&self, if_modified_since: Option<DateTime<Utc>>) -> AppResult<UpstreamResponse> {
        let url = self.forecast_url();
        let headers = self.request_headers(if_modified_since)?;

        tracing::debug!(%url, conditional = if_modified_since.is_some(), "Requesting forecast");

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::upstream(format!("Forecast request timed out: {}", e))
                } else {
                    AppError::upstream(format!("Forecast request failed: {}", e))
                }
            })?;

        let freshness = freshness_from_headers(response.headers());

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(UpstreamResponse::NotModified { freshness });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream_status(
                status.as_u16(),
                format!("Forecast API error: {} - {}", status, body),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to read forecast response: {}", e)))?;

        let document = ForecastDocument::from_slice(&body)?;

        Ok(UpstreamResponse::Modified {
            document,
            freshness,
        })
    }
}

/// Read `Last-Modified` and `Expires`, ignoring values that do not parse
pub fn freshness_from_headers(headers: &HeaderMap) -> Freshness {
    let read = |name: &str, value: Option<&HeaderValue>| -> Option<DateTime<Utc>> {
        let raw = value?.to_str().ok()?;
        let parsed = parse_http_date(raw);
        if parsed.is_none() {
            tracing::warn!("Ignoring unparseable {} header '{}'", name, raw);
        }
        parsed
    };

    Freshness {
        last_modified: read("Last-Modified", headers.get(LAST_MODIFIED)),
        expires: read("Expires", headers.get(EXPIRES)),
    }
}

/// Parse an HTTP-date (IMF-fixdate, RFC 850, asctime) or RFC 2822 date
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: [&str; 3] = [
        "%a, %d %b %Y %H:%M:%S GMT",
        "%A, %d-%b-%y %H:%M:%S GMT",
        "%a %b %e %H:%M:%S %Y",
    ];

    FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
    })
}

/// Format an instant as IMF-fixdate, e.g. "Sun, 06 Nov 1994 08:49:37 GMT"
pub fn format_http_date(value: DateTime<Utc>) -> String {
    value.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
