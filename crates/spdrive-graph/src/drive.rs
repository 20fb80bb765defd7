//! DriveItem operations within one document library
//!
//! All operations address items by drive-relative path using the
//! Graph `root:{path}:` convention. Responses deserialize into
//! [`DriveItem`] and are mapped to the port-level `RemoteEntry` DTO.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use spdrive_core::domain::errors::{OperationKind, TransferError};
use spdrive_core::domain::newtypes::{DriveId, RemotePath};
use spdrive_core::ports::RemoteEntry;
use tracing::{debug, info};

use crate::client::GraphClient;
use crate::executor::RequestSpec;
use crate::upload::UploadSession;

// ============================================================================
// Graph API DriveItem response types
// ============================================================================

/// A DriveItem response from the Microsoft Graph API
///
/// Fields use `Option` because not all fields are present in every
/// response (folders lack file hashes, minimal responses lack
/// timestamps).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    pub size: Option<u64>,
    pub last_modified_date_time: Option<String>,
    pub parent_reference: Option<ParentReference>,
    pub file: Option<FileInfo>,
    pub folder: Option<serde_json::Value>,
}

/// Parent folder reference in a DriveItem response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    /// Full path of the parent folder (e.g., "/drives/b!x/root:/Documents")
    pub path: Option<String>,
    pub id: Option<String>,
}

/// File-specific metadata in a DriveItem response
#[derive(Debug, Deserialize)]
pub struct FileInfo {
    pub hashes: Option<FileHashes>,
}

/// Content hashes for a file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHashes {
    /// QuickXorHash used by SharePoint for integrity verification
    pub quick_xor_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChildrenPage {
    value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareLinkResponse {
    link: ShareLink,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareLink {
    web_url: String,
}

// ============================================================================
// DriveItem -> RemoteEntry conversion
// ============================================================================

/// Maps a Graph DriveItem into the provider-agnostic `RemoteEntry`
///
/// The entry path is rebuilt from the parent reference, stripping the
/// `/drives/{id}/root:` prefix the service prepends. When no parent
/// reference is present the supplied fallback path is used.
pub(crate) fn drive_item_to_entry(
    item: DriveItem,
    fallback_path: &RemotePath,
) -> Result<RemoteEntry, TransferError> {
    let is_folder = item.folder.is_some();

    let modified = item
        .last_modified_date_time
        .as_deref()
        .and_then(|s| s.parse::<DateTime<Utc>>().ok());

    let hash = item
        .file
        .as_ref()
        .and_then(|f| f.hashes.as_ref())
        .and_then(|h| h.quick_xor_hash.clone());

    let path = item
        .parent_reference
        .as_ref()
        .and_then(|pr| pr.path.as_deref())
        .and_then(|p| p.split_once("root:").map(|(_, tail)| tail.to_string()))
        .map(|parent| {
            let full = if parent.is_empty() {
                format!("/{}", item.name)
            } else {
                format!("{parent}/{}", item.name)
            };
            RemotePath::new(full)
                .map_err(|e| TransferError::Protocol(format!("Unusable item path from service: {e}")))
        })
        .transpose()?
        .unwrap_or_else(|| fallback_path.clone());

    Ok(RemoteEntry {
        id: item.id,
        name: item.name,
        path,
        size: item.size.unwrap_or(0),
        is_folder,
        modified,
        hash,
    })
}

// ============================================================================
// DriveClient
// ============================================================================

/// Operations bound to a single document library
#[derive(Clone)]
pub struct DriveClient {
    graph: GraphClient,
    drive: DriveId,
}

impl DriveClient {
    pub fn new(graph: GraphClient, drive: DriveId) -> Self {
        Self { graph, drive }
    }

    pub fn drive_id(&self) -> &DriveId {
        &self.drive
    }

    /// URL for the item itself
    fn item_url(&self, path: &RemotePath) -> String {
        if path.is_root() {
            self.graph.url(&format!("/drives/{}/root", self.drive.as_str()))
        } else {
            self.graph
                .url(&format!("/drives/{}/root:{}", self.drive.as_str(), path.as_str()))
        }
    }

    /// URL for an operation on the item, e.g. `children` or `content`
    fn item_op_url(&self, path: &RemotePath, suffix: &str) -> String {
        if path.is_root() {
            self.graph
                .url(&format!("/drives/{}/root/{}", self.drive.as_str(), suffix))
        } else {
            self.graph.url(&format!(
                "/drives/{}/root:{}:/{}",
                self.drive.as_str(),
                path.as_str(),
                suffix
            ))
        }
    }

    /// Fetches metadata for a single item
    pub async fn get_metadata(&self, path: &RemotePath) -> Result<RemoteEntry, TransferError> {
        let spec = RequestSpec::get(self.item_url(path), OperationKind::Metadata);
        let item: DriveItem = self.graph.executor().execute_json(&spec).await?;
        drive_item_to_entry(item, path)
    }

    /// Lists the immediate children of a folder, draining pagination
    pub async fn list_children(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, TransferError> {
        let mut url = self.item_op_url(path, "children");
        let mut entries = Vec::new();
        loop {
            let spec = RequestSpec::get(url, OperationKind::List);
            let page: ChildrenPage = self.graph.executor().execute_json(&spec).await?;
            for item in page.value {
                let fallback = path.join(&item.name).map_err(|e| {
                    TransferError::Protocol(format!("Unusable child name from service: {e}"))
                })?;
                entries.push(drive_item_to_entry(item, &fallback)?);
            }
            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }
        debug!(path = %path, count = entries.len(), "Listed children");
        Ok(entries)
    }

    /// Creates a folder, succeeding if it already exists
    ///
    /// Creation asks the service to fail on name collision; a 409 is
    /// then resolved by fetching the existing item, which keeps the
    /// operation safe to repeat.
    pub async fn create_folder(&self, path: &RemotePath) -> Result<RemoteEntry, TransferError> {
        let name = path.name().ok_or_else(|| {
            TransferError::Protocol("Cannot create the drive root".to_string())
        })?;
        let parent = path.parent().unwrap_or_else(RemotePath::root);

        let spec = RequestSpec::new(
            Method::POST,
            self.item_op_url(&parent, "children"),
            OperationKind::FolderCreate,
            true,
        )
        .json(json!({
            "name": name,
            "folder": {},
            "@microsoft.graph.conflictBehavior": "fail",
        }));

        match self.graph.executor().execute_json::<DriveItem>(&spec).await {
            Ok(item) => {
                info!(path = %path, "Created folder");
                drive_item_to_entry(item, path)
            }
            Err(TransferError::Remote { status: 409, .. }) => {
                debug!(path = %path, "Folder already exists");
                let existing = self.get_metadata(path).await?;
                if !existing.is_folder {
                    return Err(TransferError::Remote {
                        op: OperationKind::FolderCreate,
                        status: 409,
                        message: format!("A file already occupies {path}"),
                    });
                }
                Ok(existing)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes an item; a missing item counts as deleted
    pub async fn delete(&self, path: &RemotePath) -> Result<(), TransferError> {
        let spec = RequestSpec::new(
            Method::DELETE,
            self.item_url(path),
            OperationKind::Delete,
            true,
        );
        match self.graph.executor().execute(&spec).await {
            Ok(_) => {
                info!(path = %path, "Deleted item");
                Ok(())
            }
            Err(TransferError::Remote { status: 404, .. }) => {
                debug!(path = %path, "Item already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Moves or renames an item
    ///
    /// The destination is given as a full path; its parent becomes the
    /// new parent folder and its final component the new name.
    pub async fn move_item(
        &self,
        from: &RemotePath,
        to: &RemotePath,
    ) -> Result<RemoteEntry, TransferError> {
        let new_name = to.name().ok_or_else(|| {
            TransferError::Protocol("Move destination cannot be the drive root".to_string())
        })?;
        let new_parent = to.parent().unwrap_or_else(RemotePath::root);
        let parent_ref_path = if new_parent.is_root() {
            format!("/drives/{}/root:", self.drive.as_str())
        } else {
            format!("/drives/{}/root:{}", self.drive.as_str(), new_parent.as_str())
        };

        let spec = RequestSpec::new(Method::PATCH, self.item_url(from), OperationKind::Move, true)
            .json(json!({
                "parentReference": { "path": parent_ref_path },
                "name": new_name,
            }));
        let item: DriveItem = self.graph.executor().execute_json(&spec).await?;
        info!(from = %from, to = %to, "Moved item");
        drive_item_to_entry(item, to)
    }

    /// Creates a sharing link for an item and returns its URL
    ///
    /// `link_type` is `view` or `edit`; `scope` is `anonymous` or
    /// `organization`.
    pub async fn create_share_link(
        &self,
        path: &RemotePath,
        link_type: &str,
        scope: &str,
    ) -> Result<String, TransferError> {
        let spec = RequestSpec::new(
            Method::POST,
            self.item_op_url(path, "createLink"),
            OperationKind::Share,
            true,
        )
        .json(json!({ "type": link_type, "scope": scope }));
        let response: ShareLinkResponse = self.graph.executor().execute_json(&spec).await?;
        info!(path = %path, link_type, scope, "Created sharing link");
        Ok(response.link.web_url)
    }

    /// Reads a bounded byte range from a file
    ///
    /// Each range read is an independent request, so a failed segment
    /// retries without restarting the whole download.
    pub async fn read_range(
        &self,
        path: &RemotePath,
        offset: u64,
        len: u64,
    ) -> Result<Bytes, TransferError> {
        let end = offset + len.saturating_sub(1);
        let spec = RequestSpec::get(self.item_op_url(path, "content"), OperationKind::Download)
            .header("Range", format!("bytes={offset}-{end}"));
        let response = self.graph.executor().execute(&spec).await?;
        response
            .bytes()
            .await
            .map_err(|e| TransferError::Protocol(format!("Truncated download body: {e}")))
    }

    /// Uploads a file whose entire content fits in one PUT
    pub async fn upload_small(
        &self,
        path: &RemotePath,
        content: Bytes,
    ) -> Result<RemoteEntry, TransferError> {
        debug!(path = %path, bytes = content.len(), "Uploading small file");
        let spec = RequestSpec::new(
            Method::PUT,
            self.item_op_url(path, "content"),
            OperationKind::Upload,
            true,
        )
        .header("Content-Type", "application/octet-stream")
        .bytes(content);
        let item: DriveItem = self.graph.executor().execute_json(&spec).await?;
        drive_item_to_entry(item, path)
    }

    /// Opens a resumable upload session for a file of `total` bytes
    pub async fn create_upload_session(
        &self,
        path: &RemotePath,
        total: u64,
        chunk_size: u64,
    ) -> Result<UploadSession, TransferError> {
        UploadSession::open(
            self.graph.executor().clone(),
            self.item_op_url(path, "createUploadSession"),
            path.clone(),
            total,
            chunk_size,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rp(s: &str) -> RemotePath {
        RemotePath::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_drive_item_deserialization_file() {
        let json = r#"{
            "id": "01BYE5RZ6QN3ZWBTUFOFD3GSPGOHDJD36K",
            "name": "report.pdf",
            "size": 1048576,
            "lastModifiedDateTime": "2026-06-15T10:30:00Z",
            "parentReference": {
                "path": "/drives/b!x/root:/Documents",
                "id": "01BYE5RZ5PXRAAAAAAAAAAAAAAAA"
            },
            "file": {
                "hashes": { "quickXorHash": "AAAAAAAAAAAAAAAAAAAAAAAAAAA=" }
            }
        }"#;
        let item: DriveItem = serde_json::from_str(json).unwrap();
        let entry = drive_item_to_entry(item, &rp("/Documents/report.pdf")).unwrap();
        assert_eq!(entry.name, "report.pdf");
        assert_eq!(entry.path.as_str(), "/Documents/report.pdf");
        assert_eq!(entry.size, 1048576);
        assert!(!entry.is_folder);
        assert!(entry.hash.is_some());
        assert!(entry.modified.is_some());
    }

    #[test]
    fn test_drive_item_root_parent() {
        let json = r#"{
            "id": "A",
            "name": "top.txt",
            "size": 12,
            "parentReference": { "path": "/drives/b!x/root:", "id": "ROOT" },
            "file": {}
        }"#;
        let item: DriveItem = serde_json::from_str(json).unwrap();
        let entry = drive_item_to_entry(item, &rp("/top.txt")).unwrap();
        assert_eq!(entry.path.as_str(), "/top.txt");
    }

    #[test]
    fn test_drive_item_folder_without_parent_uses_fallback() {
        let json = r#"{ "id": "F", "name": "Docs", "folder": { "childCount": 2 } }"#;
        let item: DriveItem = serde_json::from_str(json).unwrap();
        let entry = drive_item_to_entry(item, &rp("/Docs")).unwrap();
        assert!(entry.is_folder);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.path.as_str(), "/Docs");
    }
}
