//! snapvc - minimal snapshot-based version control.
//!
//! This is the main entry point for the snapvc CLI.

mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::*;
use config::Config;
use snapvc_snapshot::SnapshotStore;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "snapvc")]
#[command(author, version, about = "Snapshot and restore a directory tree", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,

    /// Store directory, relative to the working-tree root
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the snapshot store
    Init,
    /// Capture the working tree and print its fingerprint
    Snapshot,
    /// Restore the working tree to a snapshot
    Revert {
        /// Snapshot fingerprint
        fingerprint: String,
    },
    /// List stored snapshots
    List,
    /// Show the files in a snapshot
    Show {
        /// Snapshot fingerprint
        fingerprint: String,
    },
    /// Show what a revert would change
    Status {
        /// Snapshot fingerprint
        fingerprint: String,
    },
    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = match &cli.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let (mut config, sources) = Config::load(&cwd)?;
    if let Some(store_dir) = &cli.store_dir {
        config.store_dir = Some(store_dir.clone());
        config.validate()?;
    }

    init_logging(&config, cli.verbose);
    debug!(root = %cwd.display(), sources = sources.len(), "Configuration loaded");

    let store = SnapshotStore::open(&cwd, &config.snapshot_config());

    match cli.command {
        Commands::Init => handle_init(&store),
        Commands::Snapshot => handle_snapshot(&store),
        Commands::Revert { fingerprint } => handle_revert(&store, &fingerprint),
        Commands::List => handle_list(&store),
        Commands::Show { fingerprint } => handle_show(&store, &fingerprint),
        Commands::Status { fingerprint } => handle_status(&store, &fingerprint),
        Commands::Config => show_config(&store, &config, &sources),
    }
}

/// Print the effective configuration and where it came from.
fn show_config(store: &SnapshotStore, config: &Config, sources: &[String]) -> anyhow::Result<()> {
    println!("Working tree: {}", store.root().display());
    println!("Store: {}", store.store_dir().display());
    println!();

    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {source}");
        }
    }
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}
