//! Integration tests for the backend API client.
//!
//! Drives `ApiClient` against a mocked relay backend covering:
//! - Success decoding for all four endpoints
//! - Error-as-data bodies on the messages endpoint
//! - Health classification for healthy, degraded, error-status and
//!   unreachable backends
//! - Retry acceptance and rejection

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relay_doctor::{ApiClient, ApiError, MessagesBody, SystemStatus};

fn client_for(uri: &str) -> ApiClient {
    ApiClient::builder()
        .endpoint(uri)
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client must build")
}

/// Endpoint with nothing listening, for transport-error cases.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_fetch_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 120,
            "successful": 100,
            "failed": 15,
            "pending": 5,
            "orders": {"total": 70, "successful": 60, "failed": 10},
            "reports": {"total": 50, "successful": 40, "failed": 5}
        })))
        .mount(&server)
        .await;

    let stats = client_for(&server.uri()).fetch_stats().await.unwrap();
    assert_eq!(stats.total, 120);
    assert_eq!(stats.failed, 15);
    assert_eq!(stats.orders.unwrap().total, 70);
}

#[tokio::test]
async fn test_fetch_stats_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server.uri()).fetch_stats().await.unwrap_err();
    match err {
        ApiError::Http(status) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected an HTTP error, got {:?}", other),
    }
    assert!(!client_for(&server.uri())
        .fetch_stats()
        .await
        .unwrap_err()
        .is_transport());
}

#[tokio::test]
async fn test_fetch_failed_messages_requests_failed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .and(query_param("status", "failed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "m1",
                "direction": "order",
                "status": "failed",
                "patient_id": "P100",
                "message_type": "ORM^O01"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server.uri()).fetch_failed_messages().await.unwrap();
    match body {
        MessagesBody::Messages(messages) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].id, "m1");
            assert_eq!(messages[0].patient_id.as_deref(), Some("P100"));
        }
        MessagesBody::Error(err) => panic!("unexpected error body: {}", err.message),
    }
}

#[tokio::test]
async fn test_fetch_failed_messages_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "DLQ unavailable"})),
        )
        .mount(&server)
        .await;

    let body = client_for(&server.uri()).fetch_failed_messages().await.unwrap();
    assert!(matches!(
        body,
        MessagesBody::Error(err) if err.message == "DLQ unavailable"
    ));
}

#[tokio::test]
async fn test_health_healthy_is_running() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "components": {"nats": "healthy"},
            "version": "1.0.0"
        })))
        .mount(&server)
        .await;

    let check = client_for(&server.uri()).check_health().await;
    assert_eq!(check.status, SystemStatus::Running);
    assert!(check.body.unwrap().failing_components().is_empty());
}

#[tokio::test]
async fn test_health_other_body_is_degraded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "down",
            "components": {"dlq_store": "unhealthy"}
        })))
        .mount(&server)
        .await;

    let check = client_for(&server.uri()).check_health().await;
    assert_eq!(check.status, SystemStatus::Degraded);
    assert_eq!(
        check.body.unwrap().failing_components(),
        vec!["dlq_store: unhealthy".to_string()]
    );
}

#[tokio::test]
async fn test_health_error_status_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let check = client_for(&server.uri()).check_health().await;
    assert_eq!(check.status, SystemStatus::ConnectionError);
    assert!(check.body.is_none());
}

#[tokio::test]
async fn test_health_unreachable_is_connection_error() {
    let check = client_for(DEAD_ENDPOINT).check_health().await;
    assert_eq!(check.status, SystemStatus::ConnectionError);
}

#[tokio::test]
async fn test_retry_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages/m42/retry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "requeued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server.uri()).retry_message("m42").await.unwrap();
}

#[tokio::test]
async fn test_retry_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages/m42/retry"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server.uri()).retry_message("m42").await.unwrap_err();
    assert!(matches!(err, ApiError::Http(status) if status.as_u16() == 404));
}

#[tokio::test]
async fn test_transport_error_is_transport() {
    let err = client_for(DEAD_ENDPOINT).fetch_stats().await.unwrap_err();
    assert!(err.is_transport());
}
