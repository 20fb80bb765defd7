//! Rm command - delete a remote item

use anyhow::Result;
use clap::Args;
use spdrive_core::domain::newtypes::RemotePath;

use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct RmCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote file or folder to delete
    pub path: String,
}

impl RmCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let remote_ctx = RemoteContext::connect(
            ctx.config.as_deref(),
            &self.target.site,
            self.target.library.as_deref(),
        )
        .await?;

        let path = RemotePath::new(self.path.clone())?;
        remote_ctx.drive.delete(&path).await?;
        formatter.success(&format!("Deleted {}", path));
        Ok(())
    }
}
