//! Statement record parsing: dialect rules, line parsing, normalization and deduplication.

pub mod dedup;
pub mod line_parser;
pub mod normalize;
pub mod rules;

pub use dedup::{Deduplicator, deduplicate};
pub use line_parser::{LineOutcome, LineParser, Rejection};
pub use normalize::normalize;
