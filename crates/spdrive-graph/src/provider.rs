//! `IRemoteStore` implementation backed by a document library
//!
//! Thin adapter: the port methods delegate to [`DriveClient`], which
//! already speaks `TransferError`. Splitting small and resumable
//! uploads is the caller's decision; this type just executes either.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use spdrive_core::domain::errors::TransferError;
use spdrive_core::domain::newtypes::RemotePath;
use spdrive_core::ports::{IProgressObserver, IRemoteStore, RemoteEntry};
use tokio_util::sync::CancellationToken;

use crate::drive::DriveClient;

/// Remote store bound to one site's document library
pub struct GraphRemoteStore {
    drive: DriveClient,
    chunk_size: u64,
}

impl GraphRemoteStore {
    pub fn new(drive: DriveClient, chunk_size: u64) -> Self {
        Self { drive, chunk_size }
    }

    pub fn drive(&self) -> &DriveClient {
        &self.drive
    }
}

#[async_trait]
impl IRemoteStore for GraphRemoteStore {
    async fn get_metadata(&self, path: &RemotePath) -> Result<RemoteEntry, TransferError> {
        self.drive.get_metadata(path).await
    }

    async fn list_children(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, TransferError> {
        self.drive.list_children(path).await
    }

    async fn create_folder(&self, path: &RemotePath) -> Result<RemoteEntry, TransferError> {
        self.drive.create_folder(path).await
    }

    async fn read_range(
        &self,
        path: &RemotePath,
        offset: u64,
        len: u64,
    ) -> Result<Bytes, TransferError> {
        self.drive.read_range(path, offset, len).await
    }

    async fn upload_small(
        &self,
        path: &RemotePath,
        content: Bytes,
    ) -> Result<RemoteEntry, TransferError> {
        self.drive.upload_small(path, content).await
    }

    async fn upload_resumable(
        &self,
        path: &RemotePath,
        content: Bytes,
        progress: Arc<dyn IProgressObserver>,
        cancel: &CancellationToken,
    ) -> Result<RemoteEntry, TransferError> {
        let total = content.len() as u64;
        let mut session = self
            .drive
            .create_upload_session(path, total, self.chunk_size)
            .await?;
        session.upload(content, &progress, cancel).await
    }
}
