//! CLI command implementations

pub mod completions;
pub mod download;
pub mod drives;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod share;
pub mod sites;
pub mod upload;

use clap::Args;

/// Site and library selection shared by drive commands
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Site to operate on: a display name or `hostname/sites/name`
    #[arg(long)]
    pub site: String,

    /// Document library name (defaults to the site's first library)
    #[arg(long)]
    pub library: Option<String>,
}
