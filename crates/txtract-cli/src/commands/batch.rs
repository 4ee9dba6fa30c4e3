//! Batch command - extract transactions from many documents concurrently.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, warn};

use txtract_core::{ExtractionOutcome, InMemoryMetrics, Orchestrator, RawDocument, TxtractError};

use super::{OutputFormat, format_transactions, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching PDF and CSV files
    #[arg(required = true)]
    input: String,

    /// Output directory for per-document results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Keep processing remaining files after a failure (default: stop at the first failure)
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    final_method: &'a str,
    transactions: usize,
    issues: usize,
    error: String,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let documents: Vec<RawDocument> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter_map(|p| RawDocument::from_path(p).ok())
        .collect();

    if documents.is_empty() {
        anyhow::bail!("No PDF or CSV files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        documents.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(documents.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let metrics = Arc::new(InMemoryMetrics::new());
    let orchestrator = Orchestrator::from_config(&config).with_metrics(metrics.clone());

    let continue_on_error = args.continue_on_error;
    let finished = orchestrator
        .extract_batch_with(&documents, args.jobs, |document, result| {
            progress.inc(1);
            match result {
                Err(e) => {
                    warn!("Failed to process {}: {}", document.path.display(), e);
                    if continue_on_error {
                        ControlFlow::Continue(())
                    } else {
                        ControlFlow::Break(())
                    }
                }
                Ok(_) => ControlFlow::Continue(()),
            }
        })
        .await;

    progress.finish_with_message("Complete");

    let results: Vec<(&RawDocument, Result<ExtractionOutcome, TxtractError>)> = finished
        .into_iter()
        .map(|(index, result)| (&documents[index], result))
        .collect();

    if !continue_on_error {
        if let Some((document, Err(e))) = results.iter().find(|(_, r)| r.is_err()) {
            anyhow::bail!("Processing {} failed: {}", document.path.display(), e);
        }
    }

    if let Some(output_dir) = &args.output_dir {
        for (document, result) in &results {
            if let Ok(outcome) = result {
                write_output(output_dir, document, outcome, args.format)?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results
        .iter()
        .filter_map(|(d, r)| r.as_ref().err().map(|e| (*d, e)))
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} transactions",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red(),
        metrics.counter("transactions_extracted")
    );

    for (name, count) in metrics.counters() {
        if let Some(method) = name.strip_prefix("extraction_method_") {
            println!("   {}: {} files", method, count);
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (document, error) in &failed {
            println!("  - {}: {}", document.path.display(), error);
        }
    }

    Ok(())
}

fn write_output(
    output_dir: &Path,
    document: &RawDocument,
    outcome: &ExtractionOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stem = document
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&output_path, format_transactions(&outcome.transactions, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(
    path: &Path,
    results: &[(&RawDocument, Result<ExtractionOutcome, TxtractError>)],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for (document, result) in results {
        let filename = document.file_name();
        let row = match result {
            Ok(outcome) => SummaryRow {
                filename: &filename,
                status: "success",
                final_method: outcome.run.final_method.map(|m| m.as_str()).unwrap_or(""),
                transactions: outcome.transactions.len(),
                issues: outcome.run.errors.len(),
                error: String::new(),
            },
            Err(e) => SummaryRow {
                filename: &filename,
                status: "error",
                final_method: "",
                transactions: 0,
                issues: 0,
                error: e.to_string(),
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
