//! Executor retry behavior against a mock service

use reqwest::Method;
use spdrive_core::domain::errors::{OperationKind, TransferError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_persistent_failure_exhausts_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let executor = common::fast_executor(3);
    let spec = spdrive_graph::RequestSpec::get(
        format!("{}/thing", server.uri()),
        OperationKind::Metadata,
    );

    let err = executor.execute(&spec).await.unwrap_err();
    match err {
        TransferError::RetryExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert!(last.contains("503"));
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transient_failures_then_success() {
    let server = MockServer::start().await;
    // Two failures, then the real answer
    Mock::given(method("GET"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let executor = common::fast_executor(5);
    let spec = spdrive_graph::RequestSpec::get(
        format!("{}/thing", server.uri()),
        OperationKind::Metadata,
    );

    let response = executor.execute(&spec).await.expect("should recover");
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_fatal_status_fails_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "itemNotFound", "message": "The resource could not be found." }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let executor = common::fast_executor(5);
    let spec = spdrive_graph::RequestSpec::get(
        format!("{}/missing", server.uri()),
        OperationKind::Metadata,
    );

    let err = executor.execute(&spec).await.unwrap_err();
    match err {
        TransferError::Remote { status, message, .. } => {
            assert_eq!(status, 404);
            assert!(message.contains("itemNotFound"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_throttle_honors_retry_after_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = common::fast_executor(5);
    let spec =
        spdrive_graph::RequestSpec::get(format!("{}/busy", server.uri()), OperationKind::List);

    let response = executor.execute(&spec).await.expect("should recover");
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_non_repeatable_request_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/effectful"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let executor = common::fast_executor(5);
    let spec = spdrive_graph::RequestSpec::new(
        Method::POST,
        format!("{}/effectful", server.uri()),
        OperationKind::Share,
        false,
    );

    let err = executor.execute(&spec).await.unwrap_err();
    match err {
        TransferError::RetryExhausted { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected RetryExhausted after one attempt, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bearer_token_attached_to_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/authed"))
        .and(header("Authorization", format!("Bearer {}", common::TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/authed"))
        .and(header("Authorization", format!("Bearer {}", common::TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = common::fast_executor(3);
    let spec = spdrive_graph::RequestSpec::get(
        format!("{}/authed", server.uri()),
        OperationKind::Metadata,
    );
    executor.execute(&spec).await.expect("authorized retry");
}
