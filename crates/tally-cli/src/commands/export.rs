//! Export command - write the inventory as CSV.

use std::path::PathBuf;

use clap::Args;
use console::style;

use tally_core::{export_to_path, InventoryStore, JsonFileStore, TallyConfig};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: export.path from the config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExportArgs, config: &TallyConfig) -> anyhow::Result<()> {
    let store = JsonFileStore::new(&config.store.path);
    let inventory = store.load()?;

    let output = args.output.unwrap_or_else(|| config.export.path.clone());
    export_to_path(&inventory, &output)?;

    println!(
        "{} Exported {} records to {}",
        style("✓").green(),
        inventory.len(),
        output.display()
    );

    Ok(())
}
