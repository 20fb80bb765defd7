//! Batch orchestration with bounded concurrency
//!
//! Batches are fixed up front: folder transfers enumerate the full
//! item set before anything moves, so the report always accounts for
//! every item. Workers run under a semaphore; a cancellation signal
//! stops dispatch and fails not-yet-started items with a cancellation
//! error while letting in-flight items wind down at their next check.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spdrive_core::domain::errors::TransferError;
use spdrive_core::domain::newtypes::{RemotePath, UniqueId};
use spdrive_core::domain::report::BatchReport;
use spdrive_core::domain::transfer::{Direction, ItemStatus, TransferItem};
use spdrive_core::ports::{ILocalStore, IRemoteStore};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::unit::TransferUnit;

/// Runs batches of transfer items through a bounded worker pool
pub struct BatchOrchestrator {
    remote: Arc<dyn IRemoteStore>,
    local: Arc<dyn ILocalStore>,
    unit: TransferUnit,
    concurrency: usize,
}

impl BatchOrchestrator {
    pub fn new(
        remote: Arc<dyn IRemoteStore>,
        local: Arc<dyn ILocalStore>,
        unit: TransferUnit,
        concurrency: usize,
    ) -> Self {
        debug_assert!(concurrency >= 1);
        Self {
            remote,
            local,
            unit,
            concurrency,
        }
    }

    /// Runs every item to a terminal state and reports the outcomes
    ///
    /// Returns only after all items finish. One item's failure never
    /// cancels its siblings; only the caller's cancellation token
    /// stops the batch, and even then every item is accounted for.
    pub async fn run_batch(
        &self,
        items: Vec<TransferItem>,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let total = items.len();
        info!(total, concurrency = self.concurrency, "Starting batch");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers = JoinSet::new();

        for item in items {
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let unit = self.unit.clone();
            workers.spawn(async move {
                // The transfer runs on its own task so a panic inside it
                // is caught here and becomes a failed item, not an unwind
                // out of the batch.
                let placeholder = FailedPlaceholder::of(&item);
                let transfer = tokio::spawn(async move {
                    let mut item = item;
                    // Waiting for a permit races against cancellation so a
                    // cancelled batch fails queued items without running them.
                    let permit = tokio::select! {
                        _ = cancel.cancelled() => None,
                        permit = semaphore.acquire_owned() => permit.ok(),
                    };
                    match permit {
                        Some(_permit) => unit.run(item, &cancel).await,
                        None => {
                            item.start();
                            item.fail(TransferError::Cancelled);
                            item
                        }
                    }
                });
                match transfer.await {
                    Ok(item) => item,
                    Err(err) => {
                        warn!(remote = %placeholder.remote_path, error = %err, "Transfer worker panicked");
                        placeholder.into_failed_item(err)
                    }
                }
            });
        }

        let mut report = BatchReport::new();
        while let Some(joined) = workers.join_next().await {
            // The outer worker only converts panics and cannot itself panic
            if let Ok(item) = joined {
                report.record(item);
            }
        }

        info!(
            total,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch finished"
        );
        report
    }

    /// Downloads a remote folder tree into a local directory
    ///
    /// Enumerates the complete remote tree first; an enumeration
    /// failure surfaces here before any transfer starts.
    pub async fn download_folder(
        &self,
        remote_root: &RemotePath,
        local_root: &Path,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, TransferError> {
        let files = self.enumerate_remote(remote_root).await?;
        info!(remote = %remote_root, count = files.len(), "Enumerated remote folder");

        self.local.create_dir_all(local_root).await?;

        let mut items = Vec::with_capacity(files.len());
        for (path, size) in files {
            let relative = relative_remote(remote_root, &path)?;
            let mut item = TransferItem::new(
                Direction::Download,
                local_root.join(relative),
                path,
            );
            item.size = Some(size);
            items.push(item);
        }

        Ok(self.run_batch(items, cancel).await)
    }

    /// Uploads a local directory tree into a remote folder
    ///
    /// Destination folders are created shallow-to-deep before any file
    /// moves; a folder-creation failure surfaces here before the batch
    /// starts.
    pub async fn upload_folder(
        &self,
        local_root: &Path,
        remote_root: &RemotePath,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, TransferError> {
        let files = self.local.walk_files(local_root).await?;
        info!(local = %local_root.display(), count = files.len(), "Enumerated local folder");

        let mut items = Vec::with_capacity(files.len());
        for relative in &files {
            let remote = remote_join(remote_root, relative)?;
            items.push(TransferItem::new(
                Direction::Upload,
                local_root.join(relative),
                remote,
            ));
        }

        // Every destination folder, ordered so parents come first
        let mut folders: BTreeSet<(usize, String)> = BTreeSet::new();
        for ancestor in remote_root.ancestors_inclusive() {
            folders.insert((depth(&ancestor), ancestor.as_str().to_string()));
        }
        for item in &items {
            if let Some(parent) = item.remote_path.parent() {
                for ancestor in parent.ancestors_inclusive() {
                    folders.insert((depth(&ancestor), ancestor.as_str().to_string()));
                }
            }
        }
        for (_, folder) in folders {
            let path = RemotePath::new(folder)
                .map_err(|e| TransferError::Protocol(format!("Bad folder path: {e}")))?;
            self.remote.create_folder(&path).await?;
            debug!(folder = %path, "Destination folder ready");
        }

        Ok(self.run_batch(items, cancel).await)
    }

    /// Walks the remote tree and lists every file under a folder
    async fn enumerate_remote(
        &self,
        root: &RemotePath,
    ) -> Result<Vec<(RemotePath, u64)>, TransferError> {
        let mut files = Vec::new();
        let mut queue = vec![root.clone()];
        while let Some(folder) = queue.pop() {
            for entry in self.remote.list_children(&folder).await? {
                if entry.is_folder {
                    queue.push(entry.path);
                } else {
                    files.push((entry.path, entry.size));
                }
            }
        }
        Ok(files)
    }
}

/// Identity of an item kept outside its worker task, so a panicked
/// worker can still be reported as a failed item.
struct FailedPlaceholder {
    id: UniqueId,
    direction: Direction,
    local_path: PathBuf,
    remote_path: RemotePath,
    size: Option<u64>,
}

impl FailedPlaceholder {
    fn of(item: &TransferItem) -> Self {
        Self {
            id: item.id,
            direction: item.direction,
            local_path: item.local_path.clone(),
            remote_path: item.remote_path.clone(),
            size: item.size,
        }
    }

    fn into_failed_item(self, err: tokio::task::JoinError) -> TransferItem {
        let mut item = TransferItem {
            id: self.id,
            direction: self.direction,
            local_path: self.local_path,
            remote_path: self.remote_path,
            size: self.size,
            status: ItemStatus::Pending,
            started_at: None,
            finished_at: None,
        };
        item.start();
        item.fail(TransferError::Protocol(format!(
            "Transfer worker panicked: {err}"
        )));
        item
    }
}

fn depth(path: &RemotePath) -> usize {
    path.as_str().matches('/').count()
}

/// Local relative path of a remote file under `root`
fn relative_remote(root: &RemotePath, file: &RemotePath) -> Result<PathBuf, TransferError> {
    let stripped = if root.is_root() {
        file.as_str().strip_prefix('/')
    } else {
        file.as_str()
            .strip_prefix(root.as_str())
            .and_then(|s| s.strip_prefix('/'))
    };
    match stripped {
        Some(rel) if !rel.is_empty() => Ok(PathBuf::from(rel)),
        _ => {
            warn!(root = %root, file = %file, "Remote entry outside the requested folder");
            Err(TransferError::Protocol(format!(
                "Listing returned {file} outside {root}"
            )))
        }
    }
}

/// Remote path for a local file relative to `root`
fn remote_join(root: &RemotePath, relative: &Path) -> Result<RemotePath, TransferError> {
    let mut remote = root.clone();
    for component in relative.components() {
        let name = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| {
                TransferError::LocalIo(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("non-UTF8 path component in {}", relative.display()),
                ))
            })?;
        remote = remote
            .join(name)
            .map_err(|e| TransferError::Protocol(format!("Unmappable local name: {e}")))?;
    }
    Ok(remote)
}
