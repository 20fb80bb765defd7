//! Local filesystem port (driven/secondary port)
//!
//! The transfer engine never touches `std::fs` or `tokio::fs` directly;
//! it goes through this trait so tests can substitute in-memory
//! implementations and so all path handling stays in one adapter.
//!
//! ## Design Notes
//!
//! - Returns `TransferError` (via its `LocalIo` variant) so local
//!   failures flow through the same classification as remote ones.
//! - `open_sink` hands back a writer for incremental download writes;
//!   the caller is responsible for flushing before treating the file
//!   as complete.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWrite;

use crate::domain::errors::TransferError;

/// Incremental byte sink for a file being written
pub type LocalSink = Box<dyn AsyncWrite + Unpin + Send>;

/// Operations the transfer engine needs from the local filesystem
#[async_trait]
pub trait ILocalStore: Send + Sync {
    /// Reads an entire file into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes, TransferError>;

    /// Opens a file for writing, creating parent directories and
    /// truncating any existing content
    async fn open_sink(&self, path: &Path) -> Result<LocalSink, TransferError>;

    /// Creates a directory and all missing parents
    async fn create_dir_all(&self, path: &Path) -> Result<(), TransferError>;

    /// Returns the size of a regular file in bytes
    async fn file_size(&self, path: &Path) -> Result<u64, TransferError>;

    /// Recursively lists every regular file under a directory
    ///
    /// Paths are returned relative to `root`, in a stable
    /// lexicographic order.
    async fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>, TransferError>;
}
