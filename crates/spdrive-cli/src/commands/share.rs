//! Share command - create a sharing link for a remote item

use anyhow::Result;
use clap::Args;
use serde_json::json;
use spdrive_core::domain::newtypes::RemotePath;

use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct ShareCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote file or folder to share
    pub path: String,

    /// Link type: view or edit
    #[arg(long, default_value = "view")]
    pub link_type: String,

    /// Link scope: organization or anonymous
    #[arg(long, default_value = "organization")]
    pub scope: String,
}

impl ShareCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let remote_ctx = RemoteContext::connect(
            ctx.config.as_deref(),
            &self.target.site,
            self.target.library.as_deref(),
        )
        .await?;

        let path = RemotePath::new(self.path.clone())?;
        let url = remote_ctx
            .drive
            .create_share_link(&path, &self.link_type, &self.scope)
            .await?;

        match ctx.format {
            OutputFormat::Json => formatter.print_json(&json!({
                "path": path.as_str(),
                "link_type": self.link_type,
                "scope": self.scope,
                "url": url,
            })),
            OutputFormat::Human => println!("{}", url),
        }
        Ok(())
    }
}
