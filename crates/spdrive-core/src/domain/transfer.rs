//! Transfer items and their lifecycle
//!
//! A `TransferItem` describes one file to move between the local
//! filesystem and the remote drive. Items move through a small state
//! machine: `Pending` -> `InProgress` -> `Succeeded` or `Failed`. The
//! terminal states are sinks; an item never leaves them.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::errors::TransferError;
use super::newtypes::{RemotePath, UniqueId};

/// Which way the bytes flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Download,
    Upload,
}

/// Lifecycle state of a single transfer item
#[derive(Debug)]
pub enum ItemStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed(TransferError),
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// One file to transfer, with its lifecycle state
#[derive(Debug)]
pub struct TransferItem {
    pub id: UniqueId,
    pub direction: Direction,
    pub local_path: PathBuf,
    pub remote_path: RemotePath,
    pub size: Option<u64>,
    pub status: ItemStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TransferItem {
    /// Creates a pending item
    pub fn new(direction: Direction, local_path: PathBuf, remote_path: RemotePath) -> Self {
        Self {
            id: UniqueId::new(),
            direction,
            local_path,
            remote_path,
            size: None,
            status: ItemStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Marks the item in progress and records the start time
    pub fn start(&mut self) {
        debug_assert!(matches!(self.status, ItemStatus::Pending));
        self.status = ItemStatus::InProgress;
        self.started_at = Some(Utc::now());
    }

    /// Marks the item succeeded
    pub fn succeed(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = ItemStatus::Succeeded;
        self.finished_at = Some(Utc::now());
    }

    /// Marks the item failed with the given error
    pub fn fail(&mut self, error: TransferError) {
        debug_assert!(!self.status.is_terminal());
        self.status = ItemStatus::Failed(error);
        self.finished_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.status, ItemStatus::Succeeded)
    }
}
