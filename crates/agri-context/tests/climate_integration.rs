//! Integration tests for the NASA POWER climate client using wiremock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use agri_context::{ClimateError, Coordinates, NasaPowerClient};
use agri_core::{ClimateConfig, HttpConfig, NetworkError};
use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, days: u32) -> NasaPowerClient {
    let config = ClimateConfig {
        base_url: server.uri(),
        days,
    };
    NasaPowerClient::new(&config, &HttpConfig::default()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_fetch_recent_returns_parameter_block() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/temporal/daily/point"))
        .and(query_param("community", "AG"))
        .and(query_param("latitude", "-1.2921"))
        .and(query_param("longitude", "36.8219"))
        .and(query_param("start", "20240303"))
        .and(query_param("end", "20240309"))
        .and(query_param("format", "JSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [36.8219, -1.2921, 1700.0] },
            "properties": {
                "parameter": {
                    "T2M": { "20240303": 20.1, "20240309": 21.4 },
                    "PRECTOTCORR": { "20240303": 0.0, "20240309": 4.7 }
                }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = client(&mock_server, 7)
        .fetch_recent(Coordinates::new(-1.2921, 36.8219), date(2024, 3, 10))
        .await
        .unwrap();

    assert_eq!(ctx.as_value()["T2M"]["20240309"], serde_json::json!(21.4));
    assert!(ctx.as_value().get("properties").is_none());
}

#[tokio::test]
async fn test_fetch_without_parameter_block_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/temporal/daily/point"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messages": ["no data"]
        })))
        .mount(&mock_server)
        .await;

    let ctx = client(&mock_server, 1)
        .fetch_daily(
            Coordinates::new(0.0, 0.0),
            date(2024, 1, 1),
            date(2024, 1, 1),
        )
        .await
        .unwrap();

    assert_eq!(ctx.to_prompt_string(), r#"{"messages":["no data"]}"#);
}

#[tokio::test]
async fn test_fetch_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/temporal/daily/point"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad parameters"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server, 7)
        .fetch_recent(Coordinates::new(0.0, 0.0), date(2024, 1, 10))
        .await;

    assert!(matches!(
        result,
        Err(ClimateError::Network(NetworkError::ServerError { status: 422, .. }))
    ));
}

#[tokio::test]
async fn test_fetch_rejects_inverted_range_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server, 7)
        .fetch_daily(
            Coordinates::new(0.0, 0.0),
            date(2024, 2, 1),
            date(2024, 1, 1),
        )
        .await;

    assert!(matches!(result, Err(ClimateError::InvalidRange(_))));
}
