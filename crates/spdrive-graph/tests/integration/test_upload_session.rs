//! Upload session chunk protocol against a mock service

use std::sync::Arc;

use bytes::Bytes;
use spdrive_core::domain::errors::TransferError;
use spdrive_core::domain::newtypes::RemotePath;
use spdrive_core::ports::IProgressObserver;
use spdrive_graph::SessionStatus;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, RecordingObserver};

const SESSION_PATH: &str = "/upload/session-1";

fn rp(s: &str) -> RemotePath {
    RemotePath::new(s.to_string()).unwrap()
}

async fn mount_session_create(server: &MockServer, remote: &str) {
    let create_path = format!("/drives/{}/root:{}:/createUploadSession", common::DRIVE_ID, remote);
    Mock::given(method("POST"))
        .and(path(create_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uploadUrl": format!("{}{}", server.uri(), SESSION_PATH)
        })))
        .mount(server)
        .await;
}

fn completed_item(name: &str, size: u64) -> serde_json::Value {
    serde_json::json!({
        "id": "uploaded-001",
        "name": name,
        "size": size,
        "lastModifiedDateTime": "2026-02-01T09:00:00Z",
        "parentReference": { "path": "/drives/b!testdrive/root:", "id": "ROOT" },
        "file": {}
    })
}

#[tokio::test]
async fn test_chunked_upload_completes() {
    let (server, drive) = common::setup_drive_client(3).await;
    mount_session_create(&server, "/big.bin").await;

    // 10 bytes in 4-byte chunks: 4 + 4 + 2
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 0-3/10"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "nextExpectedRanges": ["4-9"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 4-7/10"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "nextExpectedRanges": ["8-9"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 8-9/10"))
        .respond_with(ResponseTemplate::new(201).set_body_json(completed_item("big.bin", 10)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = drive
        .create_upload_session(&rp("/big.bin"), 10, 4)
        .await
        .expect("session should open");

    let observer = Arc::new(RecordingObserver::default());
    let progress: Arc<dyn IProgressObserver> = observer.clone();
    let cancel = CancellationToken::new();

    let entry = session
        .upload(Bytes::from_static(b"0123456789"), &progress, &cancel)
        .await
        .expect("upload should complete");

    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(entry.name, "big.bin");
    assert_eq!(entry.size, 10);
    assert_eq!(observer.bytes_done(), vec![4, 8, 10]);
}

#[tokio::test]
async fn test_offset_disagreement_aborts_session() {
    let (server, drive) = common::setup_drive_client(3).await;
    mount_session_create(&server, "/big.bin").await;

    // Service claims it still wants byte 2 although 4 were sent
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "nextExpectedRanges": ["2-9"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = drive
        .create_upload_session(&rp("/big.bin"), 10, 4)
        .await
        .expect("session should open");

    let observer: Arc<dyn IProgressObserver> = Arc::new(RecordingObserver::default());
    let cancel = CancellationToken::new();

    let err = session
        .upload(Bytes::from_static(b"0123456789"), &observer, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Protocol(_)));
    assert_eq!(session.status(), SessionStatus::Aborted);
}

#[tokio::test]
async fn test_malformed_completion_body_aborts_session() {
    let (server, drive) = common::setup_drive_client(3).await;
    mount_session_create(&server, "/small.bin").await;

    // Final chunk is acknowledged with 200 but the body is not a drive item
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 0-2/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = drive
        .create_upload_session(&rp("/small.bin"), 3, 4)
        .await
        .expect("session should open");

    let observer: Arc<dyn IProgressObserver> = Arc::new(RecordingObserver::default());
    let cancel = CancellationToken::new();

    let err = session
        .upload(Bytes::from_static(b"abc"), &observer, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Protocol(_)));
    assert_eq!(session.status(), SessionStatus::Aborted);
}

#[tokio::test]
async fn test_cancellation_before_first_chunk() {
    let (server, drive) = common::setup_drive_client(3).await;
    mount_session_create(&server, "/big.bin").await;

    Mock::given(method("DELETE"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = drive
        .create_upload_session(&rp("/big.bin"), 10, 4)
        .await
        .expect("session should open");

    let observer: Arc<dyn IProgressObserver> = Arc::new(RecordingObserver::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = session
        .upload(Bytes::from_static(b"0123456789"), &observer, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(session.status(), SessionStatus::Aborted);
}

#[tokio::test]
async fn test_retried_chunk_still_completes() {
    let (server, drive) = common::setup_drive_client(4).await;
    mount_session_create(&server, "/small.bin").await;

    // Single-chunk file whose first two PUTs hit a transient error
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(SESSION_PATH))
        .and(header("Content-Range", "bytes 0-2/3"))
        .respond_with(ResponseTemplate::new(201).set_body_json(completed_item("small.bin", 3)))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = drive
        .create_upload_session(&rp("/small.bin"), 3, 4)
        .await
        .expect("session should open");

    let observer: Arc<dyn IProgressObserver> = Arc::new(RecordingObserver::default());
    let cancel = CancellationToken::new();

    let entry = session
        .upload(Bytes::from_static(b"abc"), &observer, &cancel)
        .await
        .expect("upload should survive transient chunk failures");
    assert_eq!(entry.size, 3);
    assert_eq!(session.status(), SessionStatus::Completed);
}
