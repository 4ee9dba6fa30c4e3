//! Date parsing and statement year inference.

use chrono::{Datelike, NaiveDate};

use super::patterns::{BARE_YEAR, MONTH_DAY, SHORT_YEAR_DATE};

/// Formats tried by [`parse_date`], in order.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d/%m/%Y",
    "%d/%m/%y",
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%m-%d-%y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a complete date with the default format list.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_date_with_formats(text, DEFAULT_DATE_FORMATS)
}

/// Try each format in order and return the first successful parse.
///
/// A `%Y` format only accepts four-digit years, so `12/01/25` falls through
/// to the `%y` variant instead of landing in the year 25.
pub fn parse_date_with_formats(text: &str, formats: &[&str]) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .filter(|date| !fmt.contains("%Y") || date.year() >= 1000)
    })
}

/// Split an `MM/DD` token into month and day.
pub fn parse_month_day(text: &str) -> Option<(u32, u32)> {
    let caps = MONTH_DAY.captures(text.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;

    if (1..=12).contains(&month) && (1..=31).contains(&day) {
        Some((month, day))
    } else {
        None
    }
}

/// Combine an `MM/DD` token with a year; full dates go through [`parse_date`].
pub fn parse_date_with_year(text: &str, year: i32) -> Option<NaiveDate> {
    if let Some((month, day)) = parse_month_day(text) {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }
    parse_date(text)
}

/// Infer the statement year from page text.
///
/// Looks for an `MM/DD/YY` date first (00-50 map to 2000-2050, 51-99 to
/// 1951-1999), then for a bare `20xx` token, then gives up and returns
/// `default_year`.
pub fn resolve_year(text: &str, default_year: i32) -> i32 {
    if let Some(caps) = SHORT_YEAR_DATE.captures(text) {
        if let Ok(suffix) = caps[1].parse::<i32>() {
            return expand_two_digit_year(suffix);
        }
    }

    if let Some(caps) = BARE_YEAR.captures(text) {
        if let Ok(year) = caps[1].parse::<i32>() {
            return year;
        }
    }

    default_year
}

fn expand_two_digit_year(suffix: i32) -> i32 {
    if suffix <= 50 { 2000 + suffix } else { 1900 + suffix }
}
