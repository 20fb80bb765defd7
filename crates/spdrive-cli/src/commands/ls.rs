//! Ls command - list a remote folder

use anyhow::Result;
use clap::Args;
use spdrive_core::domain::newtypes::RemotePath;

use crate::commands::TargetArgs;
use crate::context::RemoteContext;
use crate::output::{format_size, get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct LsCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote folder to list (defaults to the drive root)
    pub path: Option<String>,
}

impl LsCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let remote = RemoteContext::connect(
            ctx.config.as_deref(),
            &self.target.site,
            self.target.library.as_deref(),
        )
        .await?;

        let path = match &self.path {
            Some(p) => RemotePath::new(p.clone())?,
            None => RemotePath::root(),
        };
        let mut entries = remote.drive.list_children(&path).await?;
        entries.sort_by(|a, b| (b.is_folder, &a.name).cmp(&(a.is_folder, &b.name)));

        if ctx.format == OutputFormat::Json {
            let values: Vec<serde_json::Value> = entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "name": e.name,
                        "path": e.path.as_str(),
                        "size": e.size,
                        "is_folder": e.is_folder,
                        "modified": e.modified.map(|m| m.to_rfc3339()),
                    })
                })
                .collect();
            formatter.print_json(&serde_json::json!({ "entries": values }));
            return Ok(());
        }

        if entries.is_empty() {
            formatter.info("(empty)");
            return Ok(());
        }
        for entry in &entries {
            let kind = if entry.is_folder { "d" } else { "-" };
            let size = if entry.is_folder {
                String::new()
            } else {
                format_size(entry.size)
            };
            let modified = entry
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!("{kind} {size:>10} {modified:>16}  {}", entry.name);
        }
        Ok(())
    }
}
