//! Remote store port (driven/secondary port)
//!
//! This module defines the interface the transfer engine uses to talk
//! to the remote drive. The primary implementation targets SharePoint
//! document libraries via the Microsoft Graph API, but the trait only
//! speaks in drive-relative paths and byte ranges, so other backends
//! could implement it.
//!
//! ## Design Notes
//!
//! - Returns `TransferError` so callers can classify failures
//!   (retry exhaustion, fatal remote status, protocol violation)
//!   without knowing the transport.
//! - `read_range` is the download primitive. The transfer engine pulls
//!   files as a sequence of bounded range reads rather than one open
//!   stream, so each segment independently benefits from retry.
//! - `upload_small` and `upload_resumable` split at a size threshold
//!   the caller owns; implementations do not second-guess it.
//! - `RemoteEntry` is a port-level DTO, not a domain entity.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::domain::errors::TransferError;
use crate::domain::newtypes::RemotePath;
use crate::ports::progress::IProgressObserver;

/// Metadata for one item in the remote drive
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    /// Provider-specific item identifier
    pub id: String,
    /// Item name (file or folder name)
    pub name: String,
    /// Drive-relative path of the item
    pub path: RemotePath,
    /// Size in bytes (0 for folders)
    pub size: u64,
    /// Whether this item is a folder
    pub is_folder: bool,
    /// Last modified timestamp, when the provider reports one
    pub modified: Option<DateTime<Utc>>,
    /// Content hash for integrity checks (None for folders)
    pub hash: Option<String>,
}

/// Operations the transfer engine needs from a remote drive
#[async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Fetches metadata for a single item
    async fn get_metadata(&self, path: &RemotePath) -> Result<RemoteEntry, TransferError>;

    /// Lists the immediate children of a folder, draining pagination
    async fn list_children(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, TransferError>;

    /// Creates a folder, succeeding if it already exists
    ///
    /// Returns the entry for the folder whether it was created by this
    /// call or existed beforehand.
    async fn create_folder(&self, path: &RemotePath) -> Result<RemoteEntry, TransferError>;

    /// Reads `len` bytes starting at `offset` from a remote file
    ///
    /// The returned buffer may be shorter than `len` only when the
    /// range extends past the end of the file.
    async fn read_range(
        &self,
        path: &RemotePath,
        offset: u64,
        len: u64,
    ) -> Result<Bytes, TransferError>;

    /// Uploads a file whose entire content fits in one request
    async fn upload_small(
        &self,
        path: &RemotePath,
        content: Bytes,
    ) -> Result<RemoteEntry, TransferError>;

    /// Uploads a file through a resumable upload session
    ///
    /// `content` holds the full file; the implementation slices it into
    /// chunks, reports progress after each accepted chunk, and aborts
    /// the session on protocol violations. Cancellation is checked
    /// between chunks.
    async fn upload_resumable(
        &self,
        path: &RemotePath,
        content: Bytes,
        progress: Arc<dyn IProgressObserver>,
        cancel: &CancellationToken,
    ) -> Result<RemoteEntry, TransferError>;
}
