//! CLI application for building a running inventory from invoice documents.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, export, ingest, inventory, parse};

/// Tally - turn invoice text into one running, de-duplicated inventory
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Inventory file (overrides store.path from the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse documents and merge them into the inventory
    Ingest(ingest::IngestArgs),

    /// Preview the records parsed from a single document
    Parse(parse::ParseArgs),

    /// Write the inventory as CSV
    Export(export::ExportArgs),

    /// Inspect the inventory
    Inventory(inventory::InventoryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    let store = cli.store;

    // Execute command
    match cli.command {
        Commands::Ingest(args) => ingest::run(args, &config::load(config_path, store)?).await,
        Commands::Parse(args) => parse::run(args, &config::load(config_path, store)?).await,
        Commands::Export(args) => export::run(args, &config::load(config_path, store)?).await,
        Commands::Inventory(args) => {
            inventory::run(args, &config::load(config_path, store)?).await
        }
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
