//! Inventory command - inspect the running inventory.

use clap::{Args, Subcommand};
use console::style;

use tally_core::normalize::format_amount;
use tally_core::{write_export, Inventory, InventoryStore, JsonFileStore, TallyConfig};

use super::parse::OutputFormat;

/// Arguments for the inventory command.
#[derive(Args)]
pub struct InventoryArgs {
    #[command(subcommand)]
    command: InventoryCommand,
}

#[derive(Subcommand)]
enum InventoryCommand {
    /// List every record
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Totals per category
    Summary,
}

pub async fn run(args: InventoryArgs, config: &TallyConfig) -> anyhow::Result<()> {
    let inventory = JsonFileStore::new(&config.store.path).load()?;

    match args.command {
        InventoryCommand::Show { format } => show(&inventory, format),
        InventoryCommand::Summary => summary(&inventory),
    }
}

fn show(inventory: &Inventory, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(inventory)?),
        OutputFormat::Csv => write_export(inventory, std::io::stdout().lock())?,
        OutputFormat::Text => print_table(inventory),
    }
    Ok(())
}

fn print_table(inventory: &Inventory) {
    if inventory.is_empty() {
        println!("{} Inventory is empty.", style("ℹ").blue());
        return;
    }

    println!(
        "{}",
        style(format!(
            "{:<8} {:<32} {:<20} {:>8} {:>10} {:>12}  {}",
            "Item#", "Item Name", "Brand", "Ordered", "Price", "Value", "Category"
        ))
        .bold()
    );

    for record in inventory.iter() {
        println!(
            "{:<8} {:<32} {:<20} {:>8} {:>10} {:>12}  {}",
            record.item_number.as_deref().unwrap_or("-"),
            record.item_name,
            record.brand.as_deref().unwrap_or("-"),
            record.ordered_quantity,
            format_amount(record.price),
            format_amount(record.extended_value()),
            style(record.category).cyan()
        );
    }

    println!();
    println!(
        "{} records, total value {}",
        inventory.len(),
        style(format_amount(inventory.total_value())).green()
    );
    if let Some(updated) = inventory.updated_at() {
        println!("Last updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

fn summary(inventory: &Inventory) -> anyhow::Result<()> {
    println!("{}", style("Inventory by Category").bold());
    println!();

    let totals = inventory.category_summary();
    if totals.is_empty() {
        println!("  {}", style("no records").dim());
        return Ok(());
    }

    println!(
        "    {:<16} {:>6} {:>10} {:>14}",
        "Category", "Items", "Ordered", "Value"
    );
    for total in &totals {
        println!(
            "    {:<16} {:>6} {:>10} {:>14}",
            style(total.category).cyan(),
            total.items,
            total.ordered_quantity,
            format_amount(total.extended_value)
        );
    }

    println!();
    println!(
        "    {:<16} {:>6} {:>10} {:>14}",
        style("Total").bold(),
        inventory.len(),
        inventory.total_quantity(),
        format_amount(inventory.total_value())
    );

    Ok(())
}
