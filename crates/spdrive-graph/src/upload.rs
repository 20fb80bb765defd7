//! Resumable upload sessions
//!
//! Large files go up through a Graph upload session: one POST creates
//! the session, then the content is PUT in sequential chunks with
//! `Content-Range` headers. After every accepted chunk the service
//! reports the ranges it still expects; the session cross-checks that
//! report against its own offset and aborts on any disagreement rather
//! than writing bytes the service would misplace.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use spdrive_core::domain::errors::{OperationKind, TransferError};
use spdrive_core::domain::newtypes::RemotePath;
use spdrive_core::ports::{IProgressObserver, ProgressEvent, RemoteEntry};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::drive::{drive_item_to_entry, DriveItem};
use crate::executor::{RequestExecutor, RequestSpec};

/// Lifecycle of an upload session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
    Aborted,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSessionResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkAccepted {
    #[serde(default)]
    next_expected_ranges: Vec<String>,
}

/// A resumable upload session for one file
///
/// Chunks are sent strictly in order. The session is single-use:
/// after `upload` returns, the status is terminal.
pub struct UploadSession {
    executor: Arc<RequestExecutor>,
    upload_url: String,
    path: RemotePath,
    total: u64,
    chunk_size: u64,
    next_offset: u64,
    status: SessionStatus,
}

impl UploadSession {
    /// Opens a session for a file of `total` bytes
    ///
    /// Existing content at the target path is replaced on completion.
    pub(crate) async fn open(
        executor: Arc<RequestExecutor>,
        session_url: String,
        path: RemotePath,
        total: u64,
        chunk_size: u64,
    ) -> Result<Self, TransferError> {
        debug_assert!(chunk_size > 0);
        let spec = RequestSpec::new(Method::POST, session_url, OperationKind::Upload, true).json(
            json!({
                "item": { "@microsoft.graph.conflictBehavior": "replace" }
            }),
        );
        let response: UploadSessionResponse = executor.execute_json(&spec).await?;
        info!(
            path = %path,
            total,
            chunks = total.div_ceil(chunk_size),
            "Opened upload session"
        );
        Ok(Self {
            executor,
            upload_url: response.upload_url,
            path,
            total,
            chunk_size,
            next_offset: 0,
            status: SessionStatus::Active,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Uploads the full content, chunk by chunk
    ///
    /// `content.len()` must equal the total the session was opened
    /// with. Progress is reported after every accepted chunk.
    /// Cancellation is honored between chunks; an in-flight chunk is
    /// allowed to finish.
    pub async fn upload(
        &mut self,
        content: Bytes,
        progress: &Arc<dyn IProgressObserver>,
        cancel: &CancellationToken,
    ) -> Result<RemoteEntry, TransferError> {
        if self.status != SessionStatus::Active {
            return Err(TransferError::Protocol(
                "Upload session is no longer active".to_string(),
            ));
        }
        if content.len() as u64 != self.total {
            self.abort().await;
            return Err(TransferError::Protocol(format!(
                "Content is {} bytes but the session was opened for {}",
                content.len(),
                self.total
            )));
        }

        loop {
            if cancel.is_cancelled() {
                self.abort().await;
                return Err(TransferError::Cancelled);
            }

            let start = self.next_offset;
            let end = (start + self.chunk_size).min(self.total);
            let chunk = content.slice(start as usize..end as usize);
            let content_range = format!("bytes {}-{}/{}", start, end - 1, self.total);
            debug!(path = %self.path, range = %content_range, "Uploading chunk");

            let spec = RequestSpec::new(
                Method::PUT,
                self.upload_url.clone(),
                OperationKind::Upload,
                true,
            )
            .header("Content-Length", (end - start).to_string())
            .header("Content-Range", content_range)
            .bytes(chunk);

            let response = match self.executor.execute(&spec).await {
                Ok(r) => r,
                Err(e) => {
                    self.abort().await;
                    return Err(e);
                }
            };
            let status = response.status();

            if status == StatusCode::OK || status == StatusCode::CREATED {
                let item: DriveItem = match response.json().await {
                    Ok(item) => item,
                    Err(e) => {
                        self.abort().await;
                        return Err(TransferError::Protocol(format!(
                            "Malformed completion response: {e}"
                        )));
                    }
                };
                self.next_offset = end;
                self.status = SessionStatus::Completed;
                progress.on_progress(ProgressEvent::new(
                    self.path.clone(),
                    self.total,
                    Some(self.total),
                ));
                info!(path = %self.path, total = self.total, "Upload session completed");
                return drive_item_to_entry(item, &self.path);
            }

            // 202 Accepted: the service names the next range it expects
            let ack: ChunkAccepted = match response.json().await {
                Ok(ack) => ack,
                Err(e) => {
                    self.abort().await;
                    return Err(TransferError::Protocol(format!(
                        "Malformed chunk acknowledgement: {e}"
                    )));
                }
            };
            let expected = ack
                .next_expected_ranges
                .first()
                .and_then(|r| r.split('-').next())
                .and_then(|s| s.parse::<u64>().ok());

            match expected {
                Some(service_offset) if service_offset == end => {
                    self.next_offset = end;
                    progress.on_progress(ProgressEvent::new(
                        self.path.clone(),
                        self.next_offset,
                        Some(self.total),
                    ));
                }
                Some(service_offset) => {
                    warn!(
                        path = %self.path,
                        local = end,
                        remote = service_offset,
                        "Upload session offset disagreement"
                    );
                    self.abort().await;
                    return Err(TransferError::Protocol(format!(
                        "Session expects offset {service_offset} but {end} bytes were sent"
                    )));
                }
                None => {
                    self.abort().await;
                    return Err(TransferError::Protocol(
                        "Chunk accepted without a next expected range".to_string(),
                    ));
                }
            }
        }
    }

    /// Abandons the session, releasing server-side state
    ///
    /// Best effort: a failure to delete the session is logged and
    /// swallowed, since the service expires orphaned sessions on its
    /// own.
    pub async fn abort(&mut self) {
        if self.status != SessionStatus::Active {
            return;
        }
        self.status = SessionStatus::Aborted;
        let spec = RequestSpec::new(
            Method::DELETE,
            self.upload_url.clone(),
            OperationKind::Upload,
            true,
        );
        if let Err(e) = self.executor.execute(&spec).await {
            debug!(path = %self.path, error = %e, "Upload session cleanup failed");
        } else {
            info!(path = %self.path, "Upload session aborted");
        }
    }
}
