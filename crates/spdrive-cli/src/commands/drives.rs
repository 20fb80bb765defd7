//! Drives command - list a site's document libraries

use anyhow::Result;
use clap::Args;
use spdrive_core::domain::newtypes::SiteId;

use crate::context::{connect_graph, load_config};
use crate::output::{get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct DrivesCommand {
    /// Site to inspect: a display name or `hostname/sites/name`
    #[arg(long)]
    pub site: String,
}

impl DrivesCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let config = load_config(ctx.config.as_deref())?;
        let graph = connect_graph(&config)?;

        let site = match self.site.split_once('/') {
            Some((hostname, site_path)) if hostname.contains('.') => {
                graph.get_site(hostname, site_path).await?
            }
            _ => graph.find_site_by_name(&self.site).await?,
        };
        let site_id = SiteId::new(site.id)?;
        let drives = graph.list_drives(&site_id).await?;

        if ctx.format == OutputFormat::Json {
            let values: Vec<serde_json::Value> = drives
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "name": d.name,
                        "drive_type": d.drive_type,
                    })
                })
                .collect();
            formatter.print_json(&serde_json::json!({ "drives": values }));
            return Ok(());
        }

        if drives.is_empty() {
            formatter.info("Site has no document libraries");
            return Ok(());
        }
        for drive in &drives {
            println!(
                "{:<30} {}",
                drive.name.as_deref().unwrap_or("(unnamed)"),
                drive.id
            );
        }
        Ok(())
    }
}
