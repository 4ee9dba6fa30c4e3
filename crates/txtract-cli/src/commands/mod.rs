//! CLI subcommands and shared output helpers.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use txtract_core::models::transaction::{ExtractionRun, NormalizedTransaction};
use txtract_core::PipelineConfig;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of transactions
    Json,
    /// CSV with a header row
    Csv,
    /// Aligned plain text
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Platform config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("txtract")
        .join("config.json")
}

/// The `-c` path if given, otherwise the platform default.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the explicit config (which must exist), else the default file if present, else defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<PipelineConfig> {
    if let Some(path) = explicit {
        return PipelineConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(PipelineConfig::from_file(&path)?)
    } else {
        Ok(PipelineConfig::default())
    }
}

pub fn format_transactions(
    transactions: &[NormalizedTransaction],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transactions)?),
        OutputFormat::Csv => format_csv(transactions),
        OutputFormat::Text => Ok(format_text(transactions)),
    }
}

fn format_csv(transactions: &[NormalizedTransaction]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "merchant", "amount", "source_method"])?;

    for t in transactions {
        wtr.write_record([
            t.date.to_string().as_str(),
            t.merchant.as_str(),
            t.amount.to_string().as_str(),
            t.source_method.as_str(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(transactions: &[NormalizedTransaction]) -> String {
    let width = transactions
        .iter()
        .map(|t| t.merchant.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for t in transactions {
        output.push_str(&format!(
            "{}  {:<width$}  {:>10}  {}\n",
            t.date,
            t.merchant,
            t.amount,
            t.source_method,
            width = width
        ));
    }
    output
}

/// Human-readable account of how a run went.
pub fn describe_run(run: &ExtractionRun) -> String {
    let mut output = String::new();
    output.push_str(&format!("Document: {}\n", run.document.path.display()));

    for attempt in &run.attempts {
        output.push_str(&format!("  {}\n", attempt));
    }

    output.push_str(&format!(
        "Final method: {}\n",
        run.final_method.map(|m| m.as_str()).unwrap_or("none")
    ));

    if !run.errors.is_empty() {
        output.push_str("Issues:\n");
        for issue in &run.errors {
            match issue.page {
                Some(page) => output.push_str(&format!(
                    "  [{}] page {}: {}\n",
                    issue.method, page, issue.message
                )),
                None => output.push_str(&format!("  [{}] {}\n", issue.method, issue.message)),
            }
        }
    }

    output
}
