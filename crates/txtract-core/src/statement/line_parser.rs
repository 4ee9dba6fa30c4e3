//! Line and table-row parsing shared by the text and OCR strategies.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::trace;

use crate::models::transaction::{CandidateTransaction, ExtractionMethod};

use super::rules::patterns::{AMOUNT_CELL, PAYMENT_PHRASES, TABLE_SUMMARY_PHRASES};
use super::rules::{
    DIALECTS, DateToken, Dialect, clean_merchant, is_negative_token, parse_amount, parse_date,
    parse_date_with_year, resolve_year,
};

/// Why a line matched a dialect but produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Amount token carried a leading minus.
    NegativeAmount,
    /// Merchant span named a payment.
    PaymentPhrase,
}

/// Result of parsing a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Candidate(CandidateTransaction),
    Rejected(Dialect, Rejection),
    Skipped,
    NoMatch,
}

/// Classification of a table cell.
#[derive(Debug, Clone, PartialEq)]
enum Cell<'a> {
    Date(NaiveDate),
    Amount { amount: Decimal, negative: bool },
    Text(&'a str),
}

/// Turns statement text and reconstructed tables into candidates.
#[derive(Debug, Clone, Copy)]
pub struct LineParser {
    method: ExtractionMethod,
}

impl LineParser {
    /// Create a parser tagging its candidates with `method`.
    pub fn new(method: ExtractionMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    /// Resolve the page year from its own text, then parse every line.
    pub fn parse_text(&self, text: &str, default_year: i32) -> Vec<CandidateTransaction> {
        let year = resolve_year(text, default_year);
        self.parse_lines(text, year)
    }

    /// Parse every line of `text` with an already-resolved year.
    pub fn parse_lines(&self, text: &str, year: i32) -> Vec<CandidateTransaction> {
        text.lines()
            .filter_map(|line| match self.parse_line(line, year) {
                LineOutcome::Candidate(candidate) => Some(candidate),
                LineOutcome::Rejected(dialect, reason) => {
                    trace!("Rejected {:?} line ({:?}): {}", dialect, reason, line.trim());
                    None
                }
                LineOutcome::Skipped | LineOutcome::NoMatch => None,
            })
            .collect()
    }

    /// Apply the dialects in priority order to one line.
    pub fn parse_line(&self, line: &str, year: i32) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() || DIALECTS.iter().any(|set| set.skips(line)) {
            return LineOutcome::Skipped;
        }

        for set in DIALECTS.iter() {
            let Some(caps) = set.line.captures(line) else {
                continue;
            };

            let negative = caps.name("sign").is_some_and(|m| m.as_str() == "-");
            if set.spec.reject_negative && negative {
                return LineOutcome::Rejected(set.dialect(), Rejection::NegativeAmount);
            }

            let raw_merchant = &caps["merchant"];
            if set.is_payment_merchant(raw_merchant) {
                return LineOutcome::Rejected(set.dialect(), Rejection::PaymentPhrase);
            }

            let date = match set.spec.date_token {
                DateToken::MonthDay => parse_date_with_year(&caps["date"], year),
                DateToken::Full => parse_date(&caps["date"]),
            };
            let merchant = clean_merchant(raw_merchant);
            let amount = parse_amount(&caps["amount"]);

            match (date, amount) {
                (Some(date), Some(amount)) if !merchant.is_empty() => {
                    return LineOutcome::Candidate(CandidateTransaction {
                        date: date.into(),
                        merchant,
                        amount,
                        raw_text: line.to_string(),
                        source_method: self.method,
                    });
                }
                _ => {
                    trace!("{:?} matched but did not parse: {}", set.dialect(), line);
                }
            }
        }

        LineOutcome::NoMatch
    }

    /// Parse the rows of a reconstructed table.
    pub fn parse_table(&self, rows: &[Vec<String>], year: i32) -> Vec<CandidateTransaction> {
        rows.iter()
            .filter_map(|row| self.parse_row(row, year))
            .collect()
    }

    /// Scan cells left to right keeping the first date, amount and merchant.
    ///
    /// A row needs both a date and an amount. Rows with a negative amount or
    /// a payment/summary merchant are treated like their line counterparts.
    pub fn parse_row(&self, row: &[String], year: i32) -> Option<CandidateTransaction> {
        if row.len() < 3 {
            return None;
        }

        let mut date = None;
        let mut amount = None;
        let mut merchant: Option<&str> = None;

        for cell in row.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            match classify_cell(cell, year) {
                Cell::Date(d) => {
                    date.get_or_insert(d);
                }
                Cell::Amount { amount: a, negative } => {
                    amount.get_or_insert((a, negative));
                }
                Cell::Text(text) => {
                    if merchant.is_none() && text.chars().count() > 3 {
                        merchant = Some(text);
                    }
                }
            }
        }

        let (date, (amount, negative)) = (date?, amount?);
        let merchant = merchant.map(clean_merchant).unwrap_or_default();
        let lower = merchant.to_lowercase();

        if negative
            || PAYMENT_PHRASES.iter().any(|p| lower.contains(p))
            || TABLE_SUMMARY_PHRASES.iter().any(|p| lower.contains(p))
        {
            trace!("Dropping payment/summary row: {:?}", row);
            return None;
        }

        Some(CandidateTransaction {
            date: date.into(),
            merchant,
            amount,
            raw_text: row.join(" | "),
            source_method: self.method,
        })
    }
}

fn classify_cell(cell: &str, year: i32) -> Cell<'_> {
    if let Some(date) = parse_date_with_year(cell, year) {
        return Cell::Date(date);
    }
    if AMOUNT_CELL.is_match(cell) {
        if let Some(amount) = parse_amount(cell) {
            return Cell::Amount {
                amount,
                negative: is_negative_token(cell),
            };
        }
    }
    Cell::Text(cell)
}
