//! spdrive CLI - transfer files to and from SharePoint document libraries
//!
//! Provides commands for:
//! - Discovering sites and document libraries
//! - Listing, creating, moving, deleting, and sharing remote items
//! - Uploading and downloading files and folder trees

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{
    completions::CompletionsCommand, download::DownloadCommand, drives::DrivesCommand,
    ls::LsCommand, mkdir::MkdirCommand, mv::MvCommand, rm::RmCommand, share::ShareCommand,
    sites::SitesCommand, upload::UploadCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "spdrive", version, about = "SharePoint transfer tool")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List SharePoint sites visible to the application
    Sites(SitesCommand),
    /// List document libraries on a site
    Drives(DrivesCommand),
    /// List the contents of a remote folder
    Ls(LsCommand),
    /// Download a remote file or folder
    Download(DownloadCommand),
    /// Upload a local file or directory
    Upload(UploadCommand),
    /// Create a remote folder
    Mkdir(MkdirCommand),
    /// Delete a remote file or folder
    Rm(RmCommand),
    /// Move or rename a remote item
    Mv(MvCommand),
    /// Create a sharing link for a remote item
    Share(ShareCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Global flags shared by every command
pub struct Ctx {
    pub format: OutputFormat,
    pub config: Option<String>,
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing: -v flags override the configured level
    let log_config = spdrive_core::config::Config::load_or_default(
        cli.config
            .as_deref()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(spdrive_core::config::Config::default_path)
            .as_path(),
    )
    .logging;
    let filter = match cli.verbose {
        0 => log_config.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);
    if log_config.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let ctx = Ctx {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        config: cli.config,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Sites(cmd) => cmd.execute(&ctx).await,
        Commands::Drives(cmd) => cmd.execute(&ctx).await,
        Commands::Ls(cmd) => cmd.execute(&ctx).await,
        Commands::Download(cmd) => cmd.execute(&ctx).await,
        Commands::Upload(cmd) => cmd.execute(&ctx).await,
        Commands::Mkdir(cmd) => cmd.execute(&ctx).await,
        Commands::Rm(cmd) => cmd.execute(&ctx).await,
        Commands::Mv(cmd) => cmd.execute(&ctx).await,
        Commands::Share(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}
