//! Parse command - preview the records extracted from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use tally_core::normalize::format_amount;
use tally_core::source::extract_text;
use tally_core::{BatchMetadata, DocumentBatch, Pipeline, TallyConfig};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (TXT, CSV, JSON or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Delivery date to attach to the batch
    #[arg(long)]
    delivery_date: Option<String>,

    /// Invoice total to attach to the batch
    #[arg(long)]
    invoice_total: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config: &TallyConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let text = extract_text(&args.input)?;
    let name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");
    let metadata = BatchMetadata::new(args.delivery_date.clone(), args.invoice_total.clone());
    let batch = Pipeline::new(&config.parsing).process(name, &text, metadata);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&batch)?,
        OutputFormat::Csv => format_batch_csv(&batch)?,
        OutputFormat::Text => format_batch_text(&batch),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_batch_csv(batch: &DocumentBatch) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "item_key",
        "item_number",
        "item_name",
        "brand",
        "pack_size",
        "unit",
        "price",
        "ordered_quantity",
        "category",
        "status",
        "unit_cost_normalized",
        "extended_value",
    ])?;

    for record in &batch.records {
        wtr.write_record([
            record.item_key.as_str(),
            record.item_number.as_deref().unwrap_or(""),
            &record.item_name,
            record.brand.as_deref().unwrap_or(""),
            record.pack_size.as_deref().unwrap_or(""),
            record.unit.as_deref().unwrap_or(""),
            &format_amount(record.price),
            &record.ordered_quantity.to_string(),
            record.category.as_str(),
            &record.status,
            &record.unit_cost_normalized.to_string(),
            &format_amount(record.extended_value()),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_batch_text(batch: &DocumentBatch) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document: {}\n", batch.document));
    if let Some(date) = &batch.metadata.delivery_date {
        output.push_str(&format!("Delivery date: {}\n", date));
    }
    if let Some(total) = &batch.metadata.invoice_total {
        output.push_str(&format!("Invoice total: {}\n", total));
    }
    output.push('\n');

    for record in &batch.records {
        output.push_str(&format!(
            "  {:<32} {:>6} x {:>10}  {}\n",
            record.item_name,
            record.ordered_quantity,
            format_amount(record.price),
            record.category
        ));
    }

    let stats = &batch.stats;
    output.push('\n');
    output.push_str(&format!(
        "Lines: {} ({} records, {} rejected, {} noise, {} section headers)\n",
        stats.lines,
        stats.records,
        stats.rejected(),
        stats.noise,
        stats.section_headers
    ));

    if !batch.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &batch.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
