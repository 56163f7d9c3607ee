//! Integration tests for the fetch retry loop

use rasid::fetch::{
    FetchError, FetchErrorKind, FetchPolicy, Fetcher, ProxyPool, RequestSpec, TransportConfig,
};
use rasid::CancelFlag;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_fetcher(max_attempts: u32) -> Fetcher {
    Fetcher::new(
        TransportConfig::new(5, false),
        ProxyPool::empty(),
        max_attempts,
        Duration::from_millis(1),
        Duration::from_millis(5),
        CancelFlag::new(),
    )
}

#[tokio::test]
async fn test_exhausts_retry_ceiling_exactly() {
    let server = MockServer::start().await;

    // With a ceiling of 20 retries the request is tried 21 times, never 22
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(21)
        .mount(&server)
        .await;

    let fetcher = fast_fetcher(20);
    let spec = RequestSpec::get(format!("{}/flaky", server.uri()));

    let result = fetcher.fetch(&spec, FetchPolicy::ProxiedOnly).await;
    match result {
        Err(FetchError::ExhaustedRetries {
            attempts, last, ..
        }) => {
            assert_eq!(attempts, 21);
            assert_eq!(last, FetchErrorKind::Status(500));
        }
        other => panic!("expected exhausted retries, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_recovers_when_a_retry_succeeds() {
    let server = MockServer::start().await;

    // Two failures, then success
    Mock::given(method("GET"))
        .and(path("/eventually"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/eventually"))
        .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fast_fetcher(5);
    let spec = RequestSpec::get(format!("{}/eventually", server.uri()));

    let body = fetcher.fetch(&spec, FetchPolicy::ProxiedOnly).await.unwrap();
    assert_eq!(body, "payload");
}

#[tokio::test]
async fn test_post_json_body_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(wiremock::matchers::body_json(serde_json::json!({
            "keyword": "غزة",
            "page": 2,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fast_fetcher(0);
    let spec = RequestSpec::post(format!("{}/api", server.uri())).with_json(serde_json::json!({
        "keyword": "غزة",
        "page": 2,
    }));

    let body = fetcher.fetch(&spec, FetchPolicy::ProxiedOnly).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_non_success_status_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fast_fetcher(0);
    let spec = RequestSpec::get(format!("{}/missing", server.uri()));

    match fetcher.fetch(&spec, FetchPolicy::ProxiedOnly).await {
        Err(FetchError::ExhaustedRetries { last, .. }) => {
            assert_eq!(last, FetchErrorKind::Status(404));
        }
        other => panic!("expected status classification, got {:?}", other.map(|_| ())),
    }
}
