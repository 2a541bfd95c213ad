mod cli;

use aide::config::AideConfig;
use aide::server;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aide", version, about = "Personal assistant MCP server for AI agents")]
struct Cli {
    /// Config file (default: ~/.aide/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config, stdio by default)
    Serve {
        /// Serve over streamable HTTP instead of the configured transport
        #[arg(long)]
        http: bool,
    },
    /// Validate every stored document and print a health report
    Doctor,
    /// Remove completed/archived goals and archived ideas, keeping a backup
    Cleanup {
        /// Show what would be removed without writing
        #[arg(long)]
        dry_run: bool,
        /// Only remove items untouched for at least this many days
        #[arg(long)]
        older_than_days: Option<u32>,
        /// Keep completed goals
        #[arg(long)]
        keep_completed_goals: bool,
        /// Keep archived goals and ideas
        #[arg(long)]
        keep_archived: bool,
    },
    /// Move the audit log into the backups directory
    ClearLog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AideConfig::load_from(path)?,
        None => AideConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { http } => {
            let transport = if http {
                "http".to_string()
            } else {
                config.server.transport.clone()
            };
            match transport.as_str() {
                "stdio" => server::serve_stdio(config).await?,
                "http" => server::serve_http(config).await?,
                other => bail!("unknown transport {other:?}, expected \"stdio\" or \"http\""),
            }
        }
        Command::Doctor => {
            cli::doctor::doctor(config)?;
        }
        Command::Cleanup {
            dry_run,
            older_than_days,
            keep_completed_goals,
            keep_archived,
        } => {
            cli::cleanup::cleanup(
                config,
                cli::cleanup::CleanupArgs {
                    dry_run,
                    older_than_days,
                    keep_completed_goals,
                    keep_archived,
                },
            )?;
        }
        Command::ClearLog => {
            cli::cleanup::clear_log(config)?;
        }
    }

    Ok(())
}
