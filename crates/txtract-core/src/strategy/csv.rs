//! CSV export strategy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{ExtractionContext, Extractor, StrategyOutput};
use crate::error::Result;
use crate::models::transaction::{
    CandidateTransaction, ExtractionMethod, IssueKind, RawDocument, RunIssue,
};
use crate::statement::rules::{
    clean_merchant, parse_amount, parse_date, parse_date_with_year, resolve_year,
};

const DATE_ALIASES: &[&str] = &["date", "transaction date", "post date", "trans date"];
const MERCHANT_ALIASES: &[&str] = &["merchant", "description", "desc", "payee", "vendor"];
const AMOUNT_ALIASES: &[&str] = &["amount", "debit", "credit", "transaction amount"];

/// Column indices for each transaction field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: Option<usize>,
    pub merchant: Option<usize>,
    pub amount: Option<usize>,
}

impl ColumnMapping {
    /// Map headers by case-insensitive substring match; the first matching column wins.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.iter().any(|alias| h.contains(alias)))
        };

        Self {
            date: find(DATE_ALIASES),
            merchant: find(MERCHANT_ALIASES),
            amount: find(AMOUNT_ALIASES),
        }
    }

    /// Names of the fields no column was found for.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("date", self.date),
            ("merchant", self.merchant),
            ("amount", self.amount),
        ]
        .into_iter()
        .filter(|(_, index)| index.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Reads transactions from a tabular export with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExtractor;

impl CsvExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse CSV content already in memory.
    pub fn parse(&self, content: &str, default_year: i32) -> Result<StrategyOutput> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mapping = ColumnMapping::from_headers(reader.headers()?.iter());
        debug!("CSV column mapping: {:?}", mapping);

        let mut output = StrategyOutput::default();
        let missing = mapping.missing();
        if !missing.is_empty() {
            warn!("No CSV column for {}", missing.join(", "));
            output.issues.push(RunIssue::new(
                ExtractionMethod::Csv,
                IssueKind::ColumnMappingIncomplete,
                format!("no column for {}", missing.join(", ")),
            ));
        }

        let year = resolve_year(content, default_year);
        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    trace!("Skipping malformed CSV row {}: {}", index + 1, e);
                    continue;
                }
            };

            let cell = |column: Option<usize>| column.and_then(|i| record.get(i)).unwrap_or("");

            let date_text = cell(mapping.date);
            let date = parse_date(date_text).or_else(|| parse_date_with_year(date_text, year));
            let amount = parse_amount(cell(mapping.amount));

            if let (Some(date), Some(amount)) = (date, amount) {
                output.candidates.push(CandidateTransaction {
                    date: date.into(),
                    merchant: clean_merchant(cell(mapping.merchant)),
                    amount,
                    raw_text: record.iter().collect::<Vec<_>>().join(","),
                    source_method: ExtractionMethod::Csv,
                });
            }
        }

        Ok(output)
    }
}

#[async_trait]
impl Extractor for CsvExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Csv
    }

    async fn extract(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<StrategyOutput> {
        let content = tokio::fs::read_to_string(&document.path).await?;
        self.parse(&content, ctx.default_year)
    }
}
