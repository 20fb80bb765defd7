//! Download command - fetch a remote file or folder

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use spdrive_core::domain::newtypes::RemotePath;
use spdrive_core::domain::transfer::{Direction, ItemStatus, TransferItem};
use spdrive_core::ports::ILocalStore;
use spdrive_graph::GraphRemoteStore;
use spdrive_transfer::{TokioFileSystem, TransferUnit};
use tokio_util::sync::CancellationToken;

use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{get_formatter, print_report, progress_observer, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct DownloadCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote file or folder to download
    pub remote: String,

    /// Local destination path
    pub local: PathBuf,
}

impl DownloadCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let remote_ctx = RemoteContext::connect(
            ctx.config.as_deref(),
            &self.target.site,
            self.target.library.as_deref(),
        )
        .await?;

        let remote_path = RemotePath::new(self.remote.clone())?;
        let progress = progress_observer(ctx.quiet, ctx.format == OutputFormat::Json);
        let cancel = CancellationToken::new();
        spawn_interrupt_handler(cancel.clone());

        let entry = remote_ctx.drive.get_metadata(&remote_path).await?;
        if entry.is_folder {
            let orch = remote_ctx.orchestrator(progress);
            let report = orch
                .download_folder(&remote_path, &self.local, &cancel)
                .await?;
            print_report(&report, ctx.format, &*formatter);
            if !report.all_succeeded() {
                bail!("{} of {} item(s) failed", report.failed(), report.len());
            }
            return Ok(());
        }

        let remote_store = Arc::new(GraphRemoteStore::new(
            remote_ctx.drive.clone(),
            remote_ctx.config.transfer.chunk_size_bytes(),
        ));
        let local: Arc<dyn ILocalStore> = Arc::new(TokioFileSystem::new());
        let unit = TransferUnit::new(
            remote_store,
            local,
            progress,
            remote_ctx.config.transfer.threshold_bytes(),
            remote_ctx.config.transfer.chunk_size_bytes(),
        );

        let mut item = TransferItem::new(Direction::Download, self.local.clone(), remote_path);
        item.size = Some(entry.size);
        let done = unit.run(item, &cancel).await;
        match done.status {
            ItemStatus::Succeeded => {
                formatter.success(&format!("Downloaded {} to {}", done.remote_path, self.local.display()));
                Ok(())
            }
            ItemStatus::Failed(e) => bail!("Download failed: {e}"),
            _ => unreachable!("transfer unit returns terminal items"),
        }
    }
}

/// Ctrl-C flips the cancellation token so transfers wind down cleanly
pub(crate) fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}
