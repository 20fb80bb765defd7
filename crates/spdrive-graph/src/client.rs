//! Site and drive resolution against the Microsoft Graph API
//!
//! A SharePoint document library is addressed by a site ID plus a
//! drive ID. This module resolves both from friendlier inputs: a
//! hostname and site path, a display-name search, or a library name.

use std::sync::Arc;

use serde::Deserialize;
use spdrive_core::domain::errors::{OperationKind, TransferError};
use spdrive_core::domain::newtypes::{DriveId, SiteId};
use tracing::debug;

use crate::executor::{RequestExecutor, RequestSpec};
use crate::GRAPH_BASE_URL;

/// A SharePoint site, as returned by the Graph API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A document library (drive) within a site
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub drive_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    value: Vec<T>,
}

/// Typed client for site and drive lookups
#[derive(Clone)]
pub struct GraphClient {
    executor: Arc<RequestExecutor>,
    base_url: String,
}

impl GraphClient {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            base_url: GRAPH_BASE_URL.to_string(),
        }
    }

    /// Creates a client against a custom base URL (useful for testing)
    pub fn with_base_url(executor: Arc<RequestExecutor>, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Lists every site visible to the application
    pub async fn list_sites(&self) -> Result<Vec<Site>, TransferError> {
        let spec = RequestSpec::get(self.url("/sites?search=*"), OperationKind::List);
        let collection: Collection<Site> = self.executor.execute_json(&spec).await?;
        debug!(count = collection.value.len(), "Listed sites");
        Ok(collection.value)
    }

    /// Resolves a site by hostname and server-relative path
    ///
    /// `GET /sites/{hostname}:/{site_path}`, e.g.
    /// `contoso.sharepoint.com` + `sites/engineering`.
    pub async fn get_site(&self, hostname: &str, site_path: &str) -> Result<Site, TransferError> {
        let trimmed = site_path.trim_matches('/');
        let spec = RequestSpec::get(
            self.url(&format!("/sites/{hostname}:/{trimmed}")),
            OperationKind::Metadata,
        );
        self.executor.execute_json(&spec).await
    }

    /// Finds a site whose name or display name contains `name`
    ///
    /// Matching is case-insensitive. An exact display-name match wins
    /// over the first substring match.
    pub async fn find_site_by_name(&self, name: &str) -> Result<Site, TransferError> {
        let needle = name.to_lowercase();
        let sites = self.list_sites().await?;

        let mut substring_match = None;
        for site in sites {
            let display = site.display_name.as_deref().unwrap_or("").to_lowercase();
            let short = site.name.as_deref().unwrap_or("").to_lowercase();
            if display == needle || short == needle {
                return Ok(site);
            }
            if substring_match.is_none() && (display.contains(&needle) || short.contains(&needle)) {
                substring_match = Some(site);
            }
        }

        substring_match.ok_or_else(|| TransferError::Remote {
            op: OperationKind::Metadata,
            status: 404,
            message: format!("No site matching '{name}'"),
        })
    }

    /// Lists the document libraries of a site
    pub async fn list_drives(&self, site: &SiteId) -> Result<Vec<Drive>, TransferError> {
        let spec = RequestSpec::get(
            self.url(&format!("/sites/{}/drives", site.as_str())),
            OperationKind::List,
        );
        let collection: Collection<Drive> = self.executor.execute_json(&spec).await?;
        Ok(collection.value)
    }

    /// Resolves a document library by name, or the first one when
    /// `name` is `None`
    pub async fn get_drive(
        &self,
        site: &SiteId,
        name: Option<&str>,
    ) -> Result<DriveId, TransferError> {
        let drives = self.list_drives(site).await?;
        let chosen = match name {
            Some(wanted) => drives
                .into_iter()
                .find(|d| d.name.as_deref() == Some(wanted)),
            None => drives.into_iter().next(),
        };
        let drive = chosen.ok_or_else(|| TransferError::Remote {
            op: OperationKind::Metadata,
            status: 404,
            message: match name {
                Some(wanted) => format!("No document library named '{wanted}'"),
                None => "Site has no document libraries".to_string(),
            },
        })?;
        DriveId::new(drive.id)
            .map_err(|e| TransferError::Protocol(format!("Drive ID from service is invalid: {e}")))
    }
}
