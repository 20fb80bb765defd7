//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalStore`] using `tokio::fs`. Directory walks are
//! breadth-first with sorted entries so the resulting item order is
//! stable across runs.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use spdrive_core::domain::errors::TransferError;
use spdrive_core::ports::{ILocalStore, LocalSink};
use tracing::debug;

/// Adapter that bridges the [`ILocalStore`] port to the real filesystem.
///
/// Zero-sized: all operations derive their context from path arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ILocalStore for TokioFileSystem {
    async fn read_file(&self, path: &Path) -> Result<Bytes, TransferError> {
        let content = tokio::fs::read(path).await?;
        Ok(Bytes::from(content))
    }

    async fn open_sink(&self, path: &Path) -> Result<LocalSink, TransferError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::File::create(path).await?;
        Ok(Box::new(file))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), TransferError> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn file_size(&self, path: &Path) -> Result<u64, TransferError> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(TransferError::LocalIo(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }
        Ok(meta.len())
    }

    async fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>, TransferError> {
        let mut files = Vec::new();
        let mut queue = VecDeque::from([root.to_path_buf()]);

        while let Some(dir) = queue.pop_front() {
            let mut entries = Vec::new();
            let mut reader = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = reader.next_entry().await? {
                entries.push(entry.path());
            }
            entries.sort();

            for path in entries {
                let meta = tokio::fs::metadata(&path).await?;
                if meta.is_dir() {
                    queue.push_back(path);
                } else if meta.is_file() {
                    let relative = path
                        .strip_prefix(root)
                        .map(Path::to_path_buf)
                        .unwrap_or(path);
                    files.push(relative);
                }
            }
        }

        debug!(root = %root.display(), count = files.len(), "Walked local tree");
        Ok(files)
    }
}
