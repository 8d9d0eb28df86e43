//! Integration tests for YrClient using wiremock.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use fogcast_backend::external::{ForecastFetcher, UpstreamResponse, YrClient};
use fogcast_backend::AppError;
use shared::GpsCoordinates;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "fogcast-test/1.0 (tests@example.com)";

fn client(server: &MockServer) -> YrClient {
    YrClient::with_base_url(
        format!("{}/compact", server.uri()),
        USER_AGENT.to_string(),
        Duration::from_secs(5),
        GpsCoordinates::new(37.807341, -122.474779),
    )
    .unwrap()
}

fn test_document() -> serde_json::Value {
    serde_json::json!({
        "type": "Feature",
        "properties": {
            "meta": { "updated_at": "2024-01-01T11:30:00Z", "units": {} },
            "timeseries": [
                {
                    "time": "2024-01-01T12:00:00Z",
                    "data": {
                        "instant": { "details": {
                            "fog_area_fraction": 62.5,
                            "relative_humidity": 97.1,
                            "cloud_area_fraction": 100.0
                        } },
                        "next_1_hours": { "summary": { "symbol_code": "fog" } }
                    }
                }
            ]
        }
    })
}

#[tokio::test]
async fn test_fetch_parses_document_and_freshness() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compact"))
        .and(query_param("lat", "37.8073"))
        .and(query_param("lon", "-122.4748"))
        .and(header("User-Agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(test_document())
                .insert_header("Last-Modified", "Mon, 01 Jan 2024 11:45:00 GMT")
                .insert_header("Expires", "Mon, 01 Jan 2024 12:30:00 GMT"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client(&mock_server).fetch(None).await.unwrap();

    match response {
        UpstreamResponse::Modified {
            document,
            freshness,
        } => {
            let series = document.timeseries().unwrap();
            assert_eq!(series.len(), 1);
            assert_eq!(
                series[0].data.instant.details.fog_area_fraction,
                Some(62.5)
            );
            assert_eq!(
                document.model_run_at(),
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 11, 30, 0).unwrap())
            );
            assert_eq!(
                freshness.last_modified,
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 11, 45, 0).unwrap())
            );
            assert_eq!(
                freshness.expires,
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap())
            );
        }
        other => panic!("expected modified response, got {:?}", other),
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("If-Modified-Since").is_none());
}

#[tokio::test]
async fn test_conditional_fetch_not_modified() {
    let mock_server = MockServer::start().await;

    // header() splits values on commas, so HTTP-dates are checked on the recorded request
    Mock::given(method("GET"))
        .and(path("/compact"))
        .respond_with(
            ResponseTemplate::new(304).insert_header("Expires", "Mon, 01 Jan 2024 13:30:00 GMT"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let since = Utc.with_ymd_and_hms(2024, 1, 1, 11, 45, 0).unwrap();
    let response = client(&mock_server).fetch(Some(since)).await.unwrap();

    match response {
        UpstreamResponse::NotModified { freshness } => {
            assert_eq!(freshness.last_modified, None);
            assert_eq!(
                freshness.expires,
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 13, 30, 0).unwrap())
            );
        }
        other => panic!("expected not modified, got {:?}", other),
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("If-Modified-Since").unwrap(),
        "Mon, 01 Jan 2024 11:45:00 GMT"
    );
}

#[tokio::test]
async fn test_server_error_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compact"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).fetch(None).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: Some(503), .. }));
}

#[tokio::test]
async fn test_throttled_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compact"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).fetch(None).await.unwrap_err();
    assert_eq!(err.code(), "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_structural_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compact"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).fetch(None).await.unwrap_err();
    assert_eq!(err.code(), "STRUCTURAL_ERROR");
}

#[tokio::test]
async fn test_unparseable_headers_are_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compact"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(test_document())
                .insert_header("Last-Modified", "yesterday")
                .insert_header("Expires", "-1"),
        )
        .mount(&mock_server)
        .await;

    match client(&mock_server).fetch(None).await.unwrap() {
        UpstreamResponse::Modified { freshness, .. } => {
            assert!(freshness.last_modified.is_none());
            assert!(freshness.expires.is_none());
        }
        other => panic!("expected modified response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compact"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(test_document())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = YrClient::with_base_url(
        format!("{}/compact", mock_server.uri()),
        USER_AGENT.to_string(),
        Duration::from_millis(50),
        GpsCoordinates::new(37.8073, -122.4748),
    )
    .unwrap();

    let err = client.fetch(None).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: None, .. }));
}
