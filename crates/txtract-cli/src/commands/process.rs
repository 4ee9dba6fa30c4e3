//! Process command - extract transactions from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use txtract_core::{Orchestrator, RawDocument};

use super::{OutputFormat, describe_run, format_transactions, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or CSV)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the strategies attempted and any issues to stderr
    #[arg(long)]
    show_run: bool,

    /// Year for statements that print none (default: current year)
    #[arg(long)]
    year: Option<i32>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if args.year.is_some() {
        config.extraction.default_year = args.year;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    let document = RawDocument::from_path(&args.input)?;

    info!("Processing file: {}", args.input.display());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!("Extracting {}", document.file_name()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let orchestrator = Orchestrator::from_config(&config);
    let result = orchestrator.extract(&document).await;
    spinner.finish_and_clear();

    let outcome = result?;
    let output = format_transactions(&outcome.transactions, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Wrote {} transactions to {}",
            style("✓").green(),
            outcome.transactions.len(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if matches!(args.format, OutputFormat::Json) {
            println!();
        }
    }

    if args.show_run {
        eprintln!();
        eprint!("{}", describe_run(&outcome.run));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
