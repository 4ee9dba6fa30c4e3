//! Candidate to normalized transaction conversion.

use rust_decimal::Decimal;
use tracing::trace;

use crate::models::transaction::{CandidateTransaction, NormalizedTransaction};

use super::rules::to_cents;

/// Validate and normalize a candidate.
///
/// Month/day dates take `fallback_year`. The amount becomes its absolute value
/// rounded to cents; candidates that end up at zero or on an impossible date
/// are dropped. Strategies clean merchants when they build candidates, so the
/// merchant only has its whitespace collapsed here.
pub fn normalize(candidate: &CandidateTransaction, fallback_year: i32) -> Option<NormalizedTransaction> {
    let Some(date) = candidate.date.resolve(fallback_year) else {
        trace!("Dropping candidate with impossible date: {:?}", candidate.date);
        return None;
    };

    let amount = to_cents(candidate.amount.abs());
    if amount <= Decimal::ZERO {
        trace!("Dropping zero-amount candidate: {}", candidate.raw_text);
        return None;
    }

    Some(NormalizedTransaction {
        date,
        merchant: candidate.merchant.split_whitespace().collect::<Vec<_>>().join(" "),
        amount,
        raw_text: candidate.raw_text.clone(),
        source_method: candidate.source_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::{CandidateDate, ExtractionMethod};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn candidate(date: CandidateDate, merchant: &str, amount: &str) -> CandidateTransaction {
        CandidateTransaction {
            date,
            merchant: merchant.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            raw_text: "raw".to_string(),
            source_method: ExtractionMethod::Vision,
        }
    }

    #[test]
    fn test_normalizes_month_day_and_amount() {
        let c = candidate(CandidateDate::MonthDay { month: 12, day: 20 }, " STARBUCKS  COFFEE ", "-7.5");
        let n = normalize(&c, 2025).unwrap();

        assert_eq!(
            n,
            NormalizedTransaction {
                date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
                merchant: "STARBUCKS COFFEE".to_string(),
                amount: Decimal::from_str("7.50").unwrap(),
                raw_text: "raw".to_string(),
                source_method: ExtractionMethod::Vision,
            }
        );
        assert_eq!(n.amount.scale(), 2);
    }

    #[test]
    fn test_resolved_date_ignores_fallback() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 8).unwrap();
        let c = candidate(CandidateDate::Resolved(date), "SHOP", "10");
        assert_eq!(normalize(&c, 2030).unwrap().date, date);
    }

    #[test]
    fn test_drops_zero_and_impossible() {
        let zero = candidate(CandidateDate::MonthDay { month: 1, day: 1 }, "SHOP", "0.001");
        assert!(normalize(&zero, 2025).is_none());

        let leap = candidate(CandidateDate::MonthDay { month: 2, day: 29 }, "SHOP", "1.00");
        assert!(normalize(&leap, 2025).is_none());
        assert!(normalize(&leap, 2024).is_some());
    }

    #[test]
    fn test_merchant_is_cleaned_once() {
        let parser = crate::statement::LineParser::new(ExtractionMethod::Text);
        let candidates = parser.parse_lines("12/20 AMZN Mktp US WA $23.40", 2025);
        assert_eq!(candidates[0].merchant, "AMZN Mktp US");

        let n = normalize(&candidates[0], 2025).unwrap();
        assert_eq!(n.merchant, "AMZN Mktp US");

        let trip = candidate(CandidateDate::MonthDay { month: 3, day: 4 }, "UBER TRIP SF", "12.00");
        assert_eq!(normalize(&trip, 2025).unwrap().merchant, "UBER TRIP SF");
    }
}
