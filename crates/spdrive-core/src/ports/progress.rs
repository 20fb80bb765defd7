//! Progress observation port
//!
//! Transfers report progress per completed segment or chunk, keyed by
//! the remote path under transfer. Observers must be cheap: they are
//! called from inside the transfer loop.

use chrono::{DateTime, Utc};

use crate::domain::newtypes::RemotePath;

/// A single progress notification
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Remote path of the item under transfer
    pub path: RemotePath,
    /// Bytes confirmed so far
    pub bytes_done: u64,
    /// Total bytes, when known up front
    pub bytes_total: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(path: RemotePath, bytes_done: u64, bytes_total: Option<u64>) -> Self {
        Self {
            path,
            bytes_done,
            bytes_total,
            timestamp: Utc::now(),
        }
    }
}

/// Receives progress events from running transfers
pub trait IProgressObserver: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressObserver;

impl IProgressObserver for NullProgressObserver {
    fn on_progress(&self, _event: ProgressEvent) {}
}
