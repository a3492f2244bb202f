//! Integration tests for the statistics service client

use chrono::{Duration, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use afisha::config::Settings;
use afisha::services::stats::StatsClient;

fn client_for(server: &MockServer) -> StatsClient {
    let mut settings = Settings::default();
    settings.stats.base_url = server.uri();
    settings.stats.timeout_seconds = 2;
    StatsClient::new(&settings).expect("client builds")
}

#[tokio::test]
async fn record_hit_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.record_hit("/events/5", "10.0.0.7").await;
    // expectation verified on server drop
}

#[tokio::test]
async fn record_hit_swallows_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    // must not panic or propagate
    client.record_hit("/events/5", "10.0.0.7").await;
}

#[tokio::test]
async fn fetch_stats_parses_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(query_param("unique", "true"))
        .and(query_param("uris", "/events/5,/events/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"app": "afisha-main", "uri": "/events/5", "hits": 12},
            {"app": "afisha-main", "uri": "/events/9", "hits": 3}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let end = Utc::now();
    let start = end - Duration::days(30);
    let stats = client
        .fetch_stats(
            start,
            end,
            &["/events/5".to_string(), "/events/9".to_string()],
            true,
        )
        .await
        .expect("stats fetched");

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].uri, "/events/5");
    assert_eq!(stats[0].hits, 12);
    assert_eq!(stats[1].hits, 3);
}

#[tokio::test]
async fn fetch_stats_omits_uris_param_when_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let end = Utc::now();
    let stats = client
        .fetch_stats(end - Duration::hours(1), end, &[], false)
        .await
        .expect("stats fetched");
    assert!(stats.is_empty());

    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "uris"));
}

#[tokio::test]
async fn fetch_stats_propagates_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let end = Utc::now();
    let result = client
        .fetch_stats(end - Duration::hours(1), end, &[], true)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn record_hit_sends_boundary_date_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.record_hit("/events", "192.168.1.20").await;

    let requests = server.received_requests().await.expect("requests recorded");
    let body: serde_json::Value =
        serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["app"], "afisha-main");
    assert_eq!(body["uri"], "/events");
    assert_eq!(body["ip"], "192.168.1.20");
    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    // yyyy-MM-dd HH:mm:ss
    assert_eq!(timestamp.len(), 19);
    assert_eq!(&timestamp[4..5], "-");
    assert_eq!(&timestamp[10..11], " ");
    assert_eq!(&timestamp[13..14], ":");
}
