//! Sites command - list or search SharePoint sites

use anyhow::Result;
use clap::Args;

use crate::context::{connect_graph, load_config};
use crate::output::{get_formatter, OutputFormat};
use crate::Ctx;

#[derive(Debug, Args)]
pub struct SitesCommand {
    /// Only show sites whose name contains this text
    pub filter: Option<String>,
}

impl SitesCommand {
    pub async fn execute(&self, ctx: &Ctx) -> Result<()> {
        let formatter = get_formatter(ctx.format == OutputFormat::Json);
        let config = load_config(ctx.config.as_deref())?;
        let graph = connect_graph(&config)?;

        let needle = self.filter.as_deref().map(str::to_lowercase);
        let sites: Vec<_> = graph
            .list_sites()
            .await?
            .into_iter()
            .filter(|s| match &needle {
                Some(n) => {
                    s.display_name.as_deref().unwrap_or("").to_lowercase().contains(n)
                        || s.name.as_deref().unwrap_or("").to_lowercase().contains(n)
                }
                None => true,
            })
            .collect();

        if ctx.format == OutputFormat::Json {
            let values: Vec<serde_json::Value> = sites
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id,
                        "name": s.name,
                        "display_name": s.display_name,
                        "web_url": s.web_url,
                    })
                })
                .collect();
            formatter.print_json(&serde_json::json!({ "sites": values }));
            return Ok(());
        }

        if sites.is_empty() {
            formatter.info("No sites found");
            return Ok(());
        }
        for site in &sites {
            println!(
                "{:<40} {}",
                site.display_name.as_deref().unwrap_or("(unnamed)"),
                site.web_url.as_deref().unwrap_or("")
            );
        }
        Ok(())
    }
}
