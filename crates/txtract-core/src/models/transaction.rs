//! Transaction and extraction-run data models.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Kind of input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Digitally-typeset or scanned PDF statement.
    Pdf,
    /// Tabular CSV export.
    Csv,
}

/// A document reference handed to the pipeline by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Location of the file on disk.
    pub path: PathBuf,
    /// Document kind tag.
    pub kind: DocumentKind,
}

impl RawDocument {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Build a document reference, inferring the kind from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let kind = match extension.as_str() {
            "pdf" => DocumentKind::Pdf,
            "csv" => DocumentKind::Csv,
            _ => {
                return Err(ExtractionError::UnsupportedDocument(format!(
                    "{} (expected .pdf or .csv)",
                    path.display()
                )));
            }
        };

        Ok(Self::new(path, kind))
    }

    /// File name for logging.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Strategy that produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Embedded PDF text and reconstructed tables.
    Text,
    /// OCR over rasterized pages.
    Ocr,
    /// Multimodal model over rasterized pages.
    Vision,
    /// Column-mapped CSV rows.
    Csv,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Text => "text",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::Vision => "vision",
            ExtractionMethod::Csv => "csv",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date as found by a strategy, possibly still missing its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateDate {
    /// A concrete calendar date.
    Resolved(NaiveDate),
    /// Month and day only; the year is resolved during normalization.
    MonthDay { month: u32, day: u32 },
}

impl CandidateDate {
    /// Attach a year to a month/day date. Impossible dates yield `None`.
    pub fn resolve(&self, year: i32) -> Option<NaiveDate> {
        match *self {
            CandidateDate::Resolved(date) => Some(date),
            CandidateDate::MonthDay { month, day } => NaiveDate::from_ymd_opt(year, month, day),
        }
    }
}

impl From<NaiveDate> for CandidateDate {
    fn from(date: NaiveDate) -> Self {
        CandidateDate::Resolved(date)
    }
}

/// An unvalidated transaction produced by a single strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTransaction {
    pub date: CandidateDate,
    /// Merchant text as captured.
    pub merchant: String,
    /// Amount as found; may be negative or carry extra precision.
    pub amount: Decimal,
    /// Source line, row or page note kept for diagnostics.
    pub raw_text: String,
    pub source_method: ExtractionMethod,
}

/// A validated transaction.
///
/// The amount is always positive with exactly two fraction digits and the
/// date always carries a concrete year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub date: NaiveDate,
    pub merchant: String,
    pub amount: Decimal,
    pub raw_text: String,
    pub source_method: ExtractionMethod,
}

/// Identity used to collapse duplicate transactions.
pub type DedupKey = (NaiveDate, String, Decimal);

impl NormalizedTransaction {
    /// `(date, lowercase merchant, amount)`.
    pub fn dedup_key(&self) -> DedupKey {
        (self.date, self.merchant.to_lowercase(), self.amount)
    }
}

/// How a single strategy attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The strategy ran; `yielded` is its deduplicated candidate count.
    Completed { yielded: usize },
    /// The strategy could not run (engine or credentials missing).
    Skipped { reason: String },
    /// The strategy started but failed as a whole.
    Failed { reason: String },
}

/// One entry of the strategy order a run went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub method: ExtractionMethod,
    pub outcome: AttemptOutcome,
}

impl StrategyAttempt {
    /// Deduplicated yield of this attempt (zero when skipped or failed).
    pub fn yielded(&self) -> usize {
        match self.outcome {
            AttemptOutcome::Completed { yielded } => yielded,
            _ => 0,
        }
    }

    /// Whether the strategy actually ran.
    pub fn was_invoked(&self) -> bool {
        !matches!(self.outcome, AttemptOutcome::Skipped { .. })
    }
}

impl fmt::Display for StrategyAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Completed { yielded } => {
                write!(f, "{} yielded {} transaction(s)", self.method, yielded)
            }
            AttemptOutcome::Skipped { reason } => write!(f, "{} skipped ({})", self.method, reason),
            AttemptOutcome::Failed { reason } => write!(f, "{} failed ({})", self.method, reason),
        }
    }
}

/// Category of a non-fatal problem recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    PageRender,
    PageText,
    ResponseParse,
    ModelRequest,
    ColumnMappingIncomplete,
    StrategyUnavailable,
    StrategyFailed,
}

/// A diagnostic entry in [`ExtractionRun::errors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIssue {
    pub method: ExtractionMethod,
    pub kind: IssueKind,
    /// 1-indexed page, when the problem is page-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub message: String,
}

impl RunIssue {
    pub fn new(method: ExtractionMethod, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            method,
            kind,
            page: None,
            message: message.into(),
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Diagnostic record of one document extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRun {
    pub document: RawDocument,
    /// Strategies in the order they were attempted, with their outcome.
    pub attempts: Vec<StrategyAttempt>,
    /// Highest-escalation strategy that actually ran.
    pub final_method: Option<ExtractionMethod>,
    pub errors: Vec<RunIssue>,
}

impl ExtractionRun {
    pub fn new(document: RawDocument) -> Self {
        Self {
            document,
            attempts: Vec::new(),
            final_method: None,
            errors: Vec::new(),
        }
    }

    /// Methods in attempt order.
    pub fn strategy_order(&self) -> Vec<ExtractionMethod> {
        self.attempts.iter().map(|a| a.method).collect()
    }

    /// Deduplicated yield of a given strategy, if it was attempted.
    pub fn yield_for(&self, method: ExtractionMethod) -> Option<usize> {
        self.attempts
            .iter()
            .find(|a| a.method == method)
            .map(StrategyAttempt::yielded)
    }
}

/// Transactions plus the run that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub transactions: Vec<NormalizedTransaction>,
    pub run: ExtractionRun,
}
