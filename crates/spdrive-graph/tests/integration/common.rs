//! Shared test helpers for Graph API integration tests
//!
//! Provides wiremock-based mock server setup and a request executor
//! wired with a static token and millisecond backoff delays so retry
//! paths run quickly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use spdrive_core::domain::newtypes::DriveId;
use spdrive_core::ports::{IProgressObserver, ProgressEvent, StaticTokenProvider};
use spdrive_graph::{BackoffPolicy, DriveClient, GraphClient, RequestExecutor};
use wiremock::MockServer;

pub const DRIVE_ID: &str = "b!testdrive";
pub const TOKEN: &str = "test-access-token";

/// Executor with near-zero backoff delays for fast retry tests
pub fn fast_executor(max_attempts: u32) -> Arc<RequestExecutor> {
    let policy = BackoffPolicy::new(
        max_attempts,
        Duration::from_millis(5),
        2.0,
        Duration::from_millis(40),
    );
    Arc::new(RequestExecutor::new(
        Arc::new(StaticTokenProvider::new(TOKEN)),
        policy,
        Duration::from_secs(5),
    ))
}

/// Mock server plus a drive client pointed at it
pub async fn setup_drive_client(max_attempts: u32) -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let graph = GraphClient::with_base_url(fast_executor(max_attempts), server.uri());
    let drive = DriveClient::new(graph, DriveId::new(DRIVE_ID.to_string()).unwrap());
    (server, drive)
}

/// Observer that records the `bytes_done` of every event
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<u64>>,
}

impl RecordingObserver {
    pub fn bytes_done(&self) -> Vec<u64> {
        self.events.lock().unwrap().clone()
    }
}

impl IProgressObserver for RecordingObserver {
    fn on_progress(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event.bytes_done);
    }
}
