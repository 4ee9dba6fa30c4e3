//! Pattern library and record-level parsing rules for card statements.

pub mod amounts;
pub mod dates;
pub mod merchant;
pub mod patterns;

pub use amounts::{amount_from_json, is_negative_token, parse_amount, parse_signed_amount, to_cents};
pub use dates::{
    DEFAULT_DATE_FORMATS, parse_date, parse_date_with_formats, parse_date_with_year,
    parse_month_day, resolve_year,
};
pub use merchant::clean_merchant;
pub use patterns::{DIALECTS, DateToken, Dialect, DialectSpec, PatternSet};
