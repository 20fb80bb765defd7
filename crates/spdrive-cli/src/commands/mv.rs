//! Mv command - move or rename a remote item

use anyhow::Result;
use clap::Args;
use spdrive_core::domain::newtypes::RemotePath;

use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct MvCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Current remote path
    pub from: String,

    /// New remote path
    pub to: String,
}

impl MvCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let remote_ctx = RemoteContext::connect(
            ctx.config.as_deref(),
            &self.target.site,
            self.target.library.as_deref(),
        )
        .await?;

        let from = RemotePath::new(self.from.clone())?;
        let to = RemotePath::new(self.to.clone())?;
        remote_ctx.drive.move_item(&from, &to).await?;
        formatter.success(&format!("Moved {} to {}", from, to));
        Ok(())
    }
}
