//! Shared command context: configuration, authentication, and the
//! resolved drive client

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use spdrive_core::config::Config;
use spdrive_core::domain::newtypes::SiteId;
use spdrive_core::ports::{ILocalStore, IProgressObserver};
use spdrive_graph::{
    BackoffPolicy, ClientCredentialProvider, DriveClient, GraphClient, GraphRemoteStore,
    RequestExecutor,
};
use spdrive_transfer::{BatchOrchestrator, TokioFileSystem, TransferUnit};
use tracing::debug;

/// Loads configuration from the given path or the default location
pub fn load_config(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(Path::new(p))
            .with_context(|| format!("Failed to load configuration from {p}"))?,
        None => Config::load_or_default(&Config::default_path()),
    };
    let errors = config.validate();
    if !errors.is_empty() {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", joined.join("\n  "));
    }
    Ok(config)
}

/// Builds an authenticated Graph client from configuration
pub fn connect_graph(config: &Config) -> Result<GraphClient> {
    let credentials = config.auth.resolve()?;
    let provider = Arc::new(ClientCredentialProvider::new(credentials));
    let executor = Arc::new(RequestExecutor::new(
        provider,
        BackoffPolicy::from_config(&config.retry),
        config.retry.request_timeout(),
    ));
    Ok(GraphClient::new(executor))
}

/// Configuration plus the clients bound to one document library
pub struct RemoteContext {
    pub config: Config,
    pub graph: GraphClient,
    pub drive: DriveClient,
}

impl RemoteContext {
    /// Resolves the target site and library and connects to it
    ///
    /// `site` is either `hostname/sites/name` (resolved directly) or a
    /// display name to search for. `library` picks a document library
    /// by name; the site's first library is used when omitted.
    pub async fn connect(
        config_path: Option<&str>,
        site: &str,
        library: Option<&str>,
    ) -> Result<Self> {
        let config = load_config(config_path)?;
        let graph = connect_graph(&config)?;

        let resolved = match site.split_once('/') {
            Some((hostname, site_path)) if hostname.contains('.') => {
                graph.get_site(hostname, site_path).await?
            }
            _ => graph.find_site_by_name(site).await?,
        };
        debug!(site_id = %resolved.id, "Resolved site");

        let site_id = SiteId::new(resolved.id)?;
        let drive_id = graph.get_drive(&site_id, library).await?;
        let drive = DriveClient::new(graph.clone(), drive_id);

        Ok(Self {
            config,
            graph,
            drive,
        })
    }

    /// Transfer engine wired to this drive
    pub fn orchestrator(&self, progress: Arc<dyn IProgressObserver>) -> BatchOrchestrator {
        let remote = Arc::new(GraphRemoteStore::new(
            self.drive.clone(),
            self.config.transfer.chunk_size_bytes(),
        ));
        let local: Arc<dyn ILocalStore> = Arc::new(TokioFileSystem::new());
        let unit = TransferUnit::new(
            remote.clone(),
            local.clone(),
            progress,
            self.config.transfer.threshold_bytes(),
            self.config.transfer.chunk_size_bytes(),
        );
        BatchOrchestrator::new(remote, local, unit, self.config.transfer.concurrency)
    }
}
