//! Ingest command - parse documents in parallel and merge them into the inventory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use tally_core::source::extract_text;
use tally_core::{BatchMetadata, DocumentBatch, JsonFileStore, Pipeline, Reconciler, TallyConfig};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Delivery date to record for these documents
    #[arg(long)]
    delivery_date: Option<String>,

    /// Invoice total to record for these documents
    #[arg(long)]
    invoice_total: Option<String>,

    /// Number of documents parsed in parallel
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Parse and report without touching the inventory
    #[arg(long)]
    dry_run: bool,

    /// Also write a per-document summary CSV
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,
}

/// Outcome of ingesting a single document.
struct IngestResult {
    path: PathBuf,
    records: usize,
    inserted: usize,
    updated: usize,
    warnings: usize,
    error: Option<String>,
    processing_time_ms: u64,
    finished_at: DateTime<Local>,
}

impl IngestResult {
    fn failed(path: PathBuf, error: String, processing_time_ms: u64) -> Self {
        Self {
            path,
            records: 0,
            inserted: 0,
            updated: 0,
            warnings: 0,
            error: Some(error),
            processing_time_ms,
            finished_at: Local::now(),
        }
    }
}

pub async fn run(args: IngestArgs, config: &TallyConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    // Unsupported formats stay in the list and are reported as failed documents
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to ingest",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let pipeline = Arc::new(Pipeline::new(&config.parsing));
    let metadata = BatchMetadata::new(args.delivery_date.clone(), args.invoice_total.clone());
    let reconciler = Arc::new(Reconciler::new(
        JsonFileStore::new(&config.store.path),
        config.store.max_save_attempts,
    ));

    // Parsing runs on the blocking pool; batches come back in input order and are
    // committed one at a time by this loop.
    let mut parsed = stream::iter(files)
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let metadata = metadata.clone();
            tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let batch = parse_document(&path, &pipeline, metadata);
                (path, batch, file_start)
            })
        })
        .buffered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(joined) = parsed.next().await {
        let (path, batch, file_start) = joined?;
        let elapsed = |t: Instant| t.elapsed().as_millis() as u64;

        let result = match batch {
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                IngestResult::failed(path, e.to_string(), elapsed(file_start))
            }
            Ok(batch) if args.dry_run => IngestResult {
                records: batch.records.len(),
                inserted: 0,
                updated: 0,
                warnings: batch.warnings.len(),
                error: None,
                processing_time_ms: elapsed(file_start),
                finished_at: Local::now(),
                path,
            },
            Ok(batch) => {
                let reconciler = Arc::clone(&reconciler);
                let (batch, merged) = tokio::task::spawn_blocking(move || {
                    let merged = reconciler.submit(&batch);
                    (batch, merged)
                })
                .await?;

                match merged {
                    Ok(report) => IngestResult {
                        records: batch.records.len(),
                        inserted: report.inserted,
                        updated: report.updated,
                        warnings: batch.warnings.len(),
                        error: None,
                        processing_time_ms: elapsed(file_start),
                        finished_at: Local::now(),
                        path,
                    },
                    Err(e) => {
                        warn!("Failed to merge {}: {}", path.display(), e);
                        IngestResult::failed(path, e.to_string(), elapsed(file_start))
                    }
                }
            }
        };

        pb.suspend(|| println!("{}", report_line(&result)));
        pb.inc(1);
        results.push(result);
    }

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&IngestResult> = results.iter().filter(|r| r.error.is_some()).collect();
    let records: usize = results.iter().map(|r| r.records).sum();

    println!();
    println!(
        "{} Ingested {} files ({} records) in {:?}",
        style("✓").green(),
        results.len(),
        records,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );
    if args.dry_run {
        println!("   {}", style("dry run: inventory not modified").yellow());
    } else {
        println!("   Inventory: {}", config.store.path.display());
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn parse_document(
    path: &Path,
    pipeline: &Pipeline,
    metadata: BatchMetadata,
) -> anyhow::Result<DocumentBatch> {
    let text = extract_text(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    let batch = pipeline.process(&name, &text, metadata);
    for warning in &batch.warnings {
        debug!("{}: {}", name, warning);
    }
    Ok(batch)
}

fn report_line(result: &IngestResult) -> String {
    let name = result.path.display();
    match &result.error {
        Some(error) => format!("{} {}: {}", style("✗").red(), name, error),
        None => {
            let mut line = format!(
                "{} {}: {} records, {} new, {} updated",
                style("✓").green(),
                name,
                result.records,
                result.inserted,
                result.updated
            );
            if result.warnings > 0 {
                line.push_str(&format!(" ({} warnings)", style(result.warnings).yellow()));
            }
            line
        }
    }
}

fn write_summary(path: &Path, results: &[IngestResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "records",
        "inserted",
        "updated",
        "warnings",
        "processing_time_ms",
        "finished_at",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let status = if result.error.is_some() { "error" } else { "success" };

        wtr.write_record([
            filename,
            status,
            &result.records.to_string(),
            &result.inserted.to_string(),
            &result.updated.to_string(),
            &result.warnings.to_string(),
            &result.processing_time_ms.to_string(),
            &result.finished_at.to_rfc3339(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
