//! Mkdir command - create a remote folder

use anyhow::Result;
use clap::Args;
use spdrive_core::domain::newtypes::RemotePath;

use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct MkdirCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote folder path to create
    pub path: String,
}

impl MkdirCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let remote_ctx = RemoteContext::connect(
            ctx.config.as_deref(),
            &self.target.site,
            self.target.library.as_deref(),
        )
        .await?;

        let path = RemotePath::new(self.path.clone())?;
        for ancestor in path.ancestors_inclusive() {
            remote_ctx.drive.create_folder(&ancestor).await?;
        }
        formatter.success(&format!("Created folder {}", path));
        Ok(())
    }
}
