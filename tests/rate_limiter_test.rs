//! Rate limiter tests
//!
//! Tests the HTTP client rate limiting implementation with RateLimitClient.

use animaid_lib::modules::resolution::infrastructure::http_client::{RateLimitClient, RetryPolicy};
use animaid_lib::ResolverConfig;
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_rate_limit_client_creation() {
    let client = RateLimitClient::for_scraper_proxy(&ResolverConfig::default()).unwrap();
    assert_eq!(client.name(), "ScraperProxy");
    assert!(client.can_make_request_now());
}

#[tokio::test]
async fn test_requests_beyond_burst_are_paced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(3)
        .mount(&server)
        .await;

    // 10 req/s with a burst of 1: three requests need at least ~200ms
    let client = RateLimitClient::new(
        "Paced",
        RetryPolicy::none(),
        10.0,
        1,
        Duration::from_secs(2),
        "animaid-tests",
    )
    .unwrap();

    let started = Instant::now();
    for _ in 0..3 {
        client.get_text(&server.uri()).await.unwrap();
    }
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_rate_limited_response_honours_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
        .mount(&server)
        .await;

    let client = RateLimitClient::new(
        "Retrying",
        RetryPolicy::scraper_proxy(1),
        100.0,
        10,
        Duration::from_secs(2),
        "animaid-tests",
    )
    .unwrap();

    let started = Instant::now();
    let body: serde_json::Value = client.get(&server.uri()).await.unwrap();
    assert_eq!(body["ok"], true);
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_rate_limit_exhaustion_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = RateLimitClient::new(
        "Exhausted",
        RetryPolicy::none(),
        100.0,
        10,
        Duration::from_secs(2),
        "animaid-tests",
    )
    .unwrap();

    let result = client.get_text(&server.uri()).await;
    assert!(matches!(result, Err(animaid_lib::AppError::RateLimitError(_))));
}
