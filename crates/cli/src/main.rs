use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scout_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

/// Scout - Project discovery and context for manifest-based workspaces
#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Discover projects in a workspace and build context for their files")]
#[command(version)]
struct Cli {
    /// Workspace root to scan; repeat for multi-root workspaces (defaults to current directory)
    #[arg(short, long = "workspace", default_value = ".")]
    workspaces: Vec<PathBuf>,

    /// Config file to use instead of `.scout/config.yml` in the workspace roots
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects in the workspace
    List {
        /// Print the full project records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which project owns a file
    Owner {
        /// File path, absolute or relative to the first workspace root
        file: PathBuf,
    },
    /// Print the context for a file
    Context {
        /// File path, absolute or relative to the first workspace root
        file: PathBuf,
    },
    /// Summarize the workspace
    Summary,
    /// Watch the workspace and report project changes as they happen
    Watch,
    /// Print the JSON schema of the config file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // The schema needs no workspace
    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    info!("Starting scout for {} root(s)", cli.workspaces.len());
    let manager = WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_roots: cli.workspaces,
        config_path: cli.config,
    })
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize workspace: {}", e))?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::List { json } => commands::list::execute(&manager, json).await,
        Commands::Owner { file } => commands::owner::execute(&manager, &file).await,
        Commands::Context { file } => commands::context::execute(&manager, &file).await,
        Commands::Summary => commands::summary::execute(&manager).await,
        Commands::Watch => commands::watch::execute(&manager).await,
        Commands::Schema => commands::schema::execute(),
    }
}
