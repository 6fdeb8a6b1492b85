//! Integration tests for collection pagination
//!
//! These tests drive `EncoraConnector` against a mocked `HttpClient` and check:
//! - Accumulation of records across pages, in order
//! - `per_page` pinning on follow-up URLs
//! - Rate-limit waits on the same page (tokio time is paused)
//! - Best-effort stops that keep earlier pages
//! - Fatal transport and parse failures

use async_trait::async_trait;
use bridge_traits::{error::BridgeError, HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::{ExporterConfig, RateLimitPolicy};
use mockall::{mock, Sequence};
use provider_encora::{AbortReason, EncoraConnector, EncoraError, FetchCompletion};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
    }
}

const BASE: &str = "https://encora.test/api/collection";
const FIRST_PAGE: &str = "https://encora.test/api/collection?per_page=2";

fn config() -> ExporterConfig {
    ExporterConfig::builder()
        .api_key("test_token")
        .api_base_url(BASE)
        .per_page(2)
        .build()
        .unwrap()
}

fn page(ids: &[u64], next: Option<&str>) -> HttpResponse {
    let data: Vec<_> = ids.iter().map(|id| json!({"recording": {"id": id}})).collect();
    let body = json!({"data": data, "next_page_url": next});
    HttpResponse::new(200, serde_json::to_vec(&body).unwrap())
}

fn ids(outcome: &provider_encora::FetchOutcome) -> Vec<u64> {
    outcome
        .collection
        .records()
        .iter()
        .map(|r| r.recording_id().unwrap().0)
        .collect()
}

#[tokio::test]
async fn test_single_page() {
    let mut mock_http = MockHttpClient::new();
    mock_http
        .expect_execute()
        .times(1)
        .withf(|req| {
            req.url == FIRST_PAGE
                && req.headers.get("Authorization") == Some(&"Bearer test_token".to_string())
        })
        .returning(|_| Ok(page(&[1, 2], None)));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let outcome = connector.fetch_collection().await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.pages, 1);
    assert_eq!(ids(&outcome), vec![1, 2]);
}

#[tokio::test]
async fn test_accumulates_pages_in_order_and_pins_page_size() {
    let mut seq = Sequence::new();
    let mut mock_http = MockHttpClient::new();

    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| req.url == FIRST_PAGE)
        .returning(|_| {
            Ok(page(
                &[1, 2],
                Some("https://encora.test/api/collection?page=2&per_page=15&sort=date"),
            ))
        });
    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| req.url == "https://encora.test/api/collection?page=2&per_page=2&sort=date")
        .returning(|_| Ok(page(&[3, 4], Some("https://encora.test/api/collection?page=3"))));
    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| req.url == "https://encora.test/api/collection?page=3&per_page=2")
        .returning(|_| Ok(page(&[5], None)));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let outcome = connector.fetch_collection().await.unwrap();

    assert_eq!(outcome.completion, FetchCompletion::Complete);
    assert_eq!(outcome.pages, 3);
    assert_eq!(ids(&outcome), vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_and_repeats_same_page() {
    let mut seq = Sequence::new();
    let mut mock_http = MockHttpClient::new();

    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| req.url == FIRST_PAGE)
        .returning(|_| Ok(HttpResponse::new(429, "").with_header("retryafter", "2")));
    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req| req.url == FIRST_PAGE)
        .returning(|_| Ok(page(&[7], None)));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let started = tokio::time::Instant::now();
    let outcome = connector.fetch_collection().await.unwrap();
    let waited = started.elapsed();

    assert!(waited >= Duration::from_secs(2), "waited {:?}", waited);
    assert!(waited < Duration::from_secs(3), "waited {:?}", waited);
    assert!(outcome.is_complete());
    assert_eq!(outcome.pages, 1);
    assert_eq!(ids(&outcome), vec![7]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_without_header_uses_default_delay() {
    let mut seq = Sequence::new();
    let mut mock_http = MockHttpClient::new();

    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(HttpResponse::new(429, "").with_header("RetryAfter", "later")));
    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(page(&[1], None)));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let started = tokio::time::Instant::now();
    connector.fetch_collection().await.unwrap();

    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(5), "waited {:?}", waited);
    assert!(waited < Duration::from_secs(6), "waited {:?}", waited);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_budget_exhausted_keeps_partial_results() {
    let mut seq = Sequence::new();
    let mut mock_http = MockHttpClient::new();

    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(page(&[1, 2], Some("https://encora.test/api/collection?page=2"))));
    mock_http
        .expect_execute()
        .times(3)
        .in_sequence(&mut seq)
        .withf(|req| req.url == "https://encora.test/api/collection?page=2&per_page=2")
        .returning(|_| Ok(HttpResponse::new(429, "").with_header("RetryAfter", "1")));

    let config = ExporterConfig::builder()
        .api_key("test_token")
        .api_base_url(BASE)
        .per_page(2)
        .rate_limit(RateLimitPolicy {
            max_retries: 2,
            ..RateLimitPolicy::default()
        })
        .build()
        .unwrap();

    let connector = EncoraConnector::new(Arc::new(mock_http), &config);
    let outcome = connector.fetch_collection().await.unwrap();

    assert_eq!(
        outcome.completion,
        FetchCompletion::Aborted(AbortReason::RateLimitExhausted { attempts: 3 })
    );
    assert_eq!(outcome.pages, 1);
    assert_eq!(ids(&outcome), vec![1, 2]);
}

#[tokio::test]
async fn test_server_error_stops_pagination_but_keeps_records() {
    let mut seq = Sequence::new();
    let mut mock_http = MockHttpClient::new();

    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(page(&[1, 2], Some("https://encora.test/api/collection?page=2"))));
    mock_http
        .expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(HttpResponse::new(500, "Internal Server Error")));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let outcome = connector.fetch_collection().await.unwrap();

    assert!(!outcome.is_complete());
    assert_eq!(
        outcome.completion,
        FetchCompletion::Aborted(AbortReason::HttpStatus {
            status: 500,
            body: "Internal Server Error".to_string(),
        })
    );
    assert_eq!(ids(&outcome), vec![1, 2]);
}

#[tokio::test]
async fn test_unauthorized_first_page_yields_empty_partial() {
    let mut mock_http = MockHttpClient::new();
    mock_http
        .expect_execute()
        .times(1)
        .returning(|_| Ok(HttpResponse::new(401, "Unauthenticated.")));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let outcome = connector.fetch_collection().await.unwrap();

    assert!(outcome.collection.is_empty());
    assert_eq!(outcome.pages, 0);
    assert!(matches!(
        outcome.completion,
        FetchCompletion::Aborted(AbortReason::HttpStatus { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_invalid_next_page_keeps_current_page() {
    let mut mock_http = MockHttpClient::new();
    mock_http
        .expect_execute()
        .times(1)
        .returning(|_| Ok(page(&[1], Some("/api/collection?page=2"))));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let outcome = connector.fetch_collection().await.unwrap();

    assert_eq!(ids(&outcome), vec![1]);
    assert!(matches!(
        outcome.completion,
        FetchCompletion::Aborted(AbortReason::InvalidNextPage { .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_fatal() {
    let mut mock_http = MockHttpClient::new();
    mock_http
        .expect_execute()
        .times(1)
        .returning(|_| Ok(HttpResponse::new(200, "<html>maintenance</html>")));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let result = connector.fetch_collection().await;

    assert!(matches!(result, Err(EncoraError::ParseError(_))));
}

#[tokio::test]
async fn test_transport_failure_is_fatal() {
    let mut mock_http = MockHttpClient::new();
    mock_http
        .expect_execute()
        .times(1)
        .returning(|_| Err(BridgeError::OperationFailed("Connection failed".to_string())));

    let connector = EncoraConnector::new(Arc::new(mock_http), &config());
    let result = connector.fetch_collection().await;

    assert!(matches!(result, Err(EncoraError::BridgeError(_))));
}
