//! Upload command - push a local file or directory tree

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

use crate::commands::download::spawn_interrupt_handler;
use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{get_formatter, print_report, progress_observer, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct UploadCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Local file or directory to upload
    pub local: PathBuf,

    /// Remote destination path
    pub remote: String,
}

impl UploadCommand {
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

        let meta = tokio::fs::metadata(&self.local).await?;
        if meta.is_dir() {
            let orch = remote_ctx.orchestrator(progress);
            let report = orch
                .upload_folder(&self.local, &remote_path, &cancel)
                .await?;
            print_report(&report, ctx.format, &*formatter);
            if !report.all_succeeded() {
                bail!("{} of {} item(s) failed", report.failed(), report.len());
            }
            return Ok(());
        }

        if let Some(parent) = remote_path.parent() {
            for ancestor in parent.ancestors_inclusive() {
                remote_ctx.drive.create_folder(&ancestor).await?;
            }
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

        let item = TransferItem::new(Direction::Upload, self.local.clone(), remote_path);
        let done = unit.run(item, &cancel).await;
        match done.status {
            ItemStatus::Succeeded => {
                formatter.success(&format!(
                    "Uploaded {} to {}",
                    self.local.display(),
                    done.remote_path
                ));
                Ok(())
            }
            ItemStatus::Failed(e) => bail!("Upload failed: {e}"),
            _ => unreachable!("transfer unit returns terminal items"),
        }
    }
}
