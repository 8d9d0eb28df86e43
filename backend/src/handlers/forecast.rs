//! HTTP handlers for the fog forecast

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::render;
use crate::AppState;

/// Query parameters accepted by the forecast page
#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

/// Representation requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Html,
}

impl ResponseFormat {
    /// JSON when `Accept` mentions application/json or `?format=json`, HTML otherwise
    pub fn negotiate(headers: &HeaderMap, query: &FormatQuery) -> Self {
        let wants_json_query = query
            .format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"));

        let wants_json_header = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.to_ascii_lowercase().contains("application/json"));

        if wants_json_query || wants_json_header {
            ResponseFormat::Json
        } else {
            ResponseFormat::Html
        }
    }
}

/// `GET /` - forecast as JSON or HTML depending on the request
pub async fn get_forecast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FormatQuery>,
) -> Response {
    let format = ResponseFormat::negotiate(&headers, &query);

    match (format, state.forecast.current_forecast().await) {
        (ResponseFormat::Json, Ok(snapshot)) => Json(snapshot.as_ref()).into_response(),
        (ResponseFormat::Html, Ok(snapshot)) => Html(render::forecast_page(&snapshot)).into_response(),
        (ResponseFormat::Json, Err(e)) => e.into_response(),
        (ResponseFormat::Html, Err(e)) => {
            tracing::error!("Error: {:?}", e);
            let page = render::error_page(&e.detail());
            (e.status_code(), Html(page)).into_response()
        }
    }
}

/// `GET /api` - forecast as JSON
pub async fn get_forecast_json(State(state): State<AppState>) -> AppResult<Response> {
    let snapshot = state.forecast.current_forecast().await?;
    Ok(Json(snapshot.as_ref()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn query(format: Option<&str>) -> FormatQuery {
        FormatQuery {
            format: format.map(str::to_string),
        }
    }

    #[test]
    fn test_negotiate_defaults_to_html() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,*/*;q=0.8"));
        assert_eq!(ResponseFormat::negotiate(&headers, &query(None)), ResponseFormat::Html);
        assert_eq!(
            ResponseFormat::negotiate(&HeaderMap::new(), &query(Some("html"))),
            ResponseFormat::Html
        );
    }

    #[test]
    fn test_negotiate_accept_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert_eq!(ResponseFormat::negotiate(&headers, &query(None)), ResponseFormat::Json);
    }

    #[test]
    fn test_negotiate_query() {
        assert_eq!(
            ResponseFormat::negotiate(&HeaderMap::new(), &query(Some("json"))),
            ResponseFormat::Json
        );
    }
}
