//! Single-item transfers
//!
//! A [`TransferUnit`] drives one [`TransferItem`] to a terminal state.
//! Errors never escape: whatever happens, the item comes back either
//! succeeded or failed with the classified cause, which is what lets
//! the batch layer aggregate without unwinding.

use std::sync::Arc;

use spdrive_core::domain::errors::TransferError;
use spdrive_core::domain::transfer::{Direction, TransferItem};
use spdrive_core::ports::{ILocalStore, IProgressObserver, IRemoteStore, ProgressEvent};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Executes downloads and uploads for individual items
#[derive(Clone)]
pub struct TransferUnit {
    remote: Arc<dyn IRemoteStore>,
    local: Arc<dyn ILocalStore>,
    progress: Arc<dyn IProgressObserver>,
    /// Uploads at or below this many bytes go up in a single request
    small_upload_limit: u64,
    /// Download segment length; each segment is one retryable request
    segment_size: u64,
}

impl TransferUnit {
    pub fn new(
        remote: Arc<dyn IRemoteStore>,
        local: Arc<dyn ILocalStore>,
        progress: Arc<dyn IProgressObserver>,
        small_upload_limit: u64,
        segment_size: u64,
    ) -> Self {
        debug_assert!(segment_size > 0);
        Self {
            remote,
            local,
            progress,
            small_upload_limit,
            segment_size,
        }
    }

    /// Runs the item to completion and returns it in a terminal state
    ///
    /// This method never fails; a transfer error lands inside the
    /// returned item.
    pub async fn run(&self, mut item: TransferItem, cancel: &CancellationToken) -> TransferItem {
        item.start();
        let outcome = match item.direction {
            Direction::Download => self.download(&mut item, cancel).await,
            Direction::Upload => self.upload(&mut item, cancel).await,
        };
        match outcome {
            Ok(()) => {
                info!(remote = %item.remote_path, ?item.direction, "Transfer succeeded");
                item.succeed();
            }
            Err(e) => {
                warn!(remote = %item.remote_path, ?item.direction, error = %e, "Transfer failed");
                item.fail(e);
            }
        }
        item
    }

    /// Pulls a remote file down as a sequence of bounded range reads
    ///
    /// A failed or cancelled download leaves the partially written
    /// destination in place for the caller to inspect or clean up.
    async fn download(
        &self,
        item: &mut TransferItem,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        if cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }

        let total = match item.size {
            Some(size) => size,
            None => {
                let entry = self.remote.get_metadata(&item.remote_path).await?;
                if entry.is_folder {
                    return Err(TransferError::Protocol(format!(
                        "{} is a folder, not a file",
                        item.remote_path
                    )));
                }
                item.size = Some(entry.size);
                entry.size
            }
        };

        let mut sink = self.local.open_sink(&item.local_path).await?;
        let mut offset: u64 = 0;
        while offset < total {
            if cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }
            let len = self.segment_size.min(total - offset);
            let bytes = self.remote.read_range(&item.remote_path, offset, len).await?;
            if bytes.len() as u64 != len {
                return Err(TransferError::Protocol(format!(
                    "Range read at {offset} returned {} bytes, expected {len}",
                    bytes.len()
                )));
            }
            sink.write_all(&bytes).await?;
            offset += len;
            self.progress.on_progress(ProgressEvent::new(
                item.remote_path.clone(),
                offset,
                Some(total),
            ));
        }
        sink.shutdown().await?;
        debug!(remote = %item.remote_path, bytes = total, "Download complete");
        Ok(())
    }

    /// Pushes a local file up, small or chunked depending on size
    async fn upload(
        &self,
        item: &mut TransferItem,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        if cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }

        let size = self.local.file_size(&item.local_path).await?;
        item.size = Some(size);
        let content = self.local.read_file(&item.local_path).await?;

        if size <= self.small_upload_limit {
            self.remote
                .upload_small(&item.remote_path, content)
                .await?;
            self.progress.on_progress(ProgressEvent::new(
                item.remote_path.clone(),
                size,
                Some(size),
            ));
        } else {
            // The session reports progress per accepted chunk
            self.remote
                .upload_resumable(
                    &item.remote_path,
                    content,
                    self.progress.clone(),
                    cancel,
                )
                .await?;
        }
        debug!(remote = %item.remote_path, bytes = size, "Upload complete");
        Ok(())
    }
}
