//! Amount parsing for statement tokens.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse an amount token into its absolute value.
///
/// Everything except digits, `,`, `.` and `-` is dropped, commas are treated
/// as thousands separators. Whether the token was a purchase or a payment
/// must be decided before calling this, from the raw token.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .filter(|c| *c != ',')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    Decimal::from_str(&cleaned).ok().map(|amount| amount.abs())
}

/// Whether the raw token carries a minus sign before its first digit.
pub fn is_negative_token(text: &str) -> bool {
    text.chars()
        .take_while(|c| !c.is_ascii_digit())
        .any(|c| c == '-')
}

/// Round to cents and pin the scale to exactly two fraction digits.
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Coerce a model-provided JSON value (number or numeric string) into an amount.
pub fn amount_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::from_str(&f.to_string()).ok())
            }
        }
        serde_json::Value::String(s) => parse_signed_amount(s),
        _ => None,
    }
}

/// Like [`parse_amount`] but keeps the sign.
pub fn parse_signed_amount(text: &str) -> Option<Decimal> {
    let amount = parse_amount(text)?;
    Some(if is_negative_token(text) { -amount } else { amount })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$7.17"), Some(dec("7.17")));
        assert_eq!(parse_amount("1,562.16"), Some(dec("1562.16")));
        assert_eq!(parse_amount("-$1,562.16"), Some(dec("1562.16")));
        assert_eq!(parse_amount("€ 45.99"), Some(dec("45.99")));
        assert_eq!(parse_amount("12"), Some(dec("12")));
    }

    #[test]
    fn test_parse_amount_rejects_non_numbers() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_negative_token() {
        assert!(is_negative_token("-$14.05"));
        assert!(is_negative_token("- $14.05"));
        assert!(is_negative_token("$-14.05"));
        assert!(!is_negative_token("$14.05"));
        assert!(!is_negative_token("14.05-"));
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(dec("7.1")).to_string(), "7.10");
        assert_eq!(to_cents(dec("12")).to_string(), "12.00");
        assert_eq!(to_cents(dec("3.455")).to_string(), "3.46");
    }

    #[test]
    fn test_amount_from_json() {
        assert_eq!(amount_from_json(&serde_json::json!(45.99)), Some(dec("45.99")));
        assert_eq!(amount_from_json(&serde_json::json!(12)), Some(dec("12")));
        assert_eq!(amount_from_json(&serde_json::json!("$7.50")), Some(dec("7.50")));
        assert_eq!(amount_from_json(&serde_json::json!("-7.50")), Some(dec("-7.50")));
        assert_eq!(amount_from_json(&serde_json::json!(null)), None);
        assert_eq!(amount_from_json(&serde_json::json!("abc")), None);
    }
}
