//! Multimodal model collaborator and response parsing.

mod gemini;

pub use gemini::GeminiVisionClient;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::VisionError;
use crate::models::transaction::{CandidateDate, CandidateTransaction, ExtractionMethod};
use crate::statement::rules::patterns::{FENCE_CLOSE, FENCE_OPEN};
use crate::statement::rules::{amount_from_json, clean_merchant, parse_date, parse_month_day};

/// Result type for vision operations.
pub type Result<T> = std::result::Result<T, VisionError>;

/// Instruction sent with every page image.
pub const EXTRACTION_PROMPT: &str = r#"You are reading one page of a credit card statement. Extract every purchase transaction on it.

For each transaction return:
- date: the transaction date, as YYYY-MM-DD when the year is printed, otherwise MM/DD
- merchant: the merchant or store name without location codes
- amount: the amount as a positive number

Rules:
- Only include purchases with positive amounts
- Leave out payments, credits, refunds and fees
- Leave out headers, footers and summary lines such as Previous Balance or New Balance

Answer with a JSON array and nothing else. If the page has no transactions answer with [].

Example:
[
  {"date": "2024-12-15", "merchant": "AMAZON.COM", "amount": 45.99},
  {"date": "12/16", "merchant": "STARBUCKS", "amount": 7.50}
]"#;

/// A model that answers a text prompt about an image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Whether credentials are configured.
    fn is_available(&self) -> bool;

    /// Send a PNG page image with `prompt`, returning the model's text answer.
    async fn generate(&self, png: &[u8], prompt: &str) -> Result<String>;
}

/// Remove surrounding markdown code fences from a model answer.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }
    let start = FENCE_OPEN.find(text).map(|m| m.end()).unwrap_or(0);
    let end = FENCE_CLOSE
        .find(&text[start..])
        .map(|m| start + m.start())
        .unwrap_or(text.len());
    &text[start..end]
}

/// Parse a model answer for one page into candidates.
///
/// The answer must be a JSON array. Entries without a usable date or a
/// positive amount are dropped one by one.
pub fn parse_response(text: &str, page: u32) -> Result<Vec<CandidateTransaction>> {
    let body = strip_code_fences(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| VisionError::ResponseParse(format!("page {}: {}", page, e)))?;

    let Value::Array(entries) = value else {
        return Err(VisionError::ResponseParse(format!(
            "page {}: expected a JSON array",
            page
        )));
    };

    let total = entries.len();
    let candidates: Vec<CandidateTransaction> = entries
        .iter()
        .filter_map(|entry| parse_entry(entry, page))
        .collect();

    debug!(
        "Page {}: model returned {} entries, {} usable",
        page,
        total,
        candidates.len()
    );
    Ok(candidates)
}

fn parse_entry(entry: &Value, page: u32) -> Option<CandidateTransaction> {
    let date_text = entry.get("date")?.as_str()?.trim();
    let date = match parse_date(date_text) {
        Some(date) => CandidateDate::Resolved(date),
        None => {
            let (month, day) = parse_month_day(date_text)?;
            CandidateDate::MonthDay { month, day }
        }
    };

    let amount = entry.get("amount").and_then(amount_from_json)?;
    if amount <= Decimal::ZERO {
        trace!("Dropping non-positive model entry: {}", entry);
        return None;
    }

    let merchant = clean_merchant(entry.get("merchant").and_then(Value::as_str).unwrap_or_default());

    Some(CandidateTransaction {
        date,
        merchant,
        amount,
        raw_text: format!("vision page {}", page),
        source_method: ExtractionMethod::Vision,
    })
}
