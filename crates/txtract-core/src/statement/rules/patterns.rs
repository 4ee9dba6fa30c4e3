//! Statement dialect pattern-sets and shared regexes.
//!
//! Each dialect is described declaratively by a [`DialectSpec`] (date,
//! merchant and amount capture fragments plus the filters that apply to it)
//! and compiled once into a [`PatternSet`]. [`DIALECTS`] holds them in the
//! priority order the line parser tries them.

use lazy_static::lazy_static;
use regex::Regex;

/// Statement layout conventions understood by the line parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `MM/DD [MM/DD] MERCHANT ... [-]$AMOUNT`, anchored at line start.
    Compact,
    /// `MM/DD/YYYY MERCHANT [$|€|£]AMOUNT`, anywhere in the line.
    FullDate,
}

/// How the captured date token should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    /// Month and day only; combined with the page's resolved year.
    MonthDay,
    /// A complete date parsed against the known formats.
    Full,
}

/// Declarative description of a dialect.
#[derive(Debug)]
pub struct DialectSpec {
    pub dialect: Dialect,
    /// Transaction date fragment.
    pub date: &'static str,
    /// Optional posting date following the transaction date.
    pub posting_date: Option<&'static str>,
    /// Merchant span fragment.
    pub merchant: &'static str,
    /// Amount fragment; must contain a `sign` group (possibly empty) and an `amount` group.
    pub amount: &'static str,
    /// Whether the line must start with the date.
    pub anchored: bool,
    pub date_token: DateToken,
    /// A leading minus marks a payment or credit.
    pub reject_negative: bool,
    /// Merchant substrings that mark a payment line.
    pub payment_phrases: &'static [&'static str],
    /// Line-start phrases of non-transaction lines.
    pub skip_prefixes: &'static [&'static str],
}

/// Line-start phrases of balance, header and footer lines.
pub const SKIP_LINE_PREFIXES: &[&str] = &[
    "previous balance",
    "new balance",
    "payment due",
    "minimum payment",
    "total fees",
    "total interest",
    "billing period",
    "account summary",
    "credit limit",
    "available credit",
    "account number",
    "opening/closing",
    "page ",
];

/// Merchant phrases of card payments and header lines that slip through.
pub const PAYMENT_PHRASES: &[&str] = &[
    "online payment",
    "thank you",
    "autopay",
    "due date",
    "minimum payment",
    "payment due",
];

/// Merchant phrases of summary rows picked up by table reconstruction.
pub const TABLE_SUMMARY_PHRASES: &[&str] = &[
    "payment due",
    "due date",
    "minimum payment",
    "previous balance",
    "new balance",
    "credit limit",
    "billing period",
];

pub const COMPACT: DialectSpec = DialectSpec {
    dialect: Dialect::Compact,
    date: r"\d{1,2}/\d{1,2}",
    posting_date: Some(r"\d{1,2}/\d{1,2}"),
    merchant: r".+?",
    amount: r"(?P<sign>-?)\$(?P<amount>\d[\d,]*\.\d{2})",
    anchored: true,
    date_token: DateToken::MonthDay,
    reject_negative: true,
    payment_phrases: PAYMENT_PHRASES,
    skip_prefixes: SKIP_LINE_PREFIXES,
};

pub const FULL_DATE: DialectSpec = DialectSpec {
    dialect: Dialect::FullDate,
    date: r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
    posting_date: None,
    merchant: r".+?",
    amount: r"(?P<sign>)[\$€£]?(?P<amount>[\d,]+\.\d{2})",
    anchored: false,
    date_token: DateToken::Full,
    reject_negative: false,
    payment_phrases: &[],
    skip_prefixes: SKIP_LINE_PREFIXES,
};

/// A compiled dialect.
#[derive(Debug)]
pub struct PatternSet {
    pub spec: &'static DialectSpec,
    /// Full-line regex with `date`, `merchant`, `sign` and `amount` groups.
    pub line: Regex,
}

impl PatternSet {
    /// Compile a dialect description into a line regex.
    pub fn compile(spec: &'static DialectSpec) -> Result<Self, regex::Error> {
        let mut pattern = String::new();
        if spec.anchored {
            pattern.push('^');
        }
        pattern.push_str(&format!("(?P<date>{})", spec.date));
        if let Some(posting) = spec.posting_date {
            pattern.push_str(&format!(r"(?:\s+{})?", posting));
        }
        pattern.push_str(&format!(r"\s+(?P<merchant>{})\s+{}", spec.merchant, spec.amount));

        Ok(Self {
            spec,
            line: Regex::new(&pattern)?,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.spec.dialect
    }

    /// Case-insensitive prefix match against the skip list.
    pub fn skips(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        lower == "page" || self.spec.skip_prefixes.iter().any(|p| lower.starts_with(p))
    }

    /// Whether the merchant span names a payment rather than a purchase.
    pub fn is_payment_merchant(&self, merchant: &str) -> bool {
        let lower = merchant.to_lowercase();
        self.spec.payment_phrases.iter().any(|p| lower.contains(p))
    }
}

lazy_static! {
    /// Dialects in the order they are tried on each line.
    pub static ref DIALECTS: Vec<PatternSet> = [&COMPACT, &FULL_DATE]
        .into_iter()
        .map(|spec| PatternSet::compile(spec).unwrap())
        .collect();

    // Year inference
    pub static ref SHORT_YEAR_DATE: Regex = Regex::new(
        r"\d{1,2}/\d{1,2}/(\d{2})\b"
    ).unwrap();

    pub static ref BARE_YEAR: Regex = Regex::new(
        r"\b(20\d{2})\b"
    ).unwrap();

    pub static ref MONTH_DAY: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})$"
    ).unwrap();

    // A table cell holding nothing but an amount
    pub static ref AMOUNT_CELL: Regex = Regex::new(
        r"^-?\s*[\$€£]?\s*-?\d[\d,]*\.\d{2}$"
    ).unwrap();

    // Merchant cleanup
    pub static ref TRAILING_STATE: Regex = Regex::new(
        r"\s+[A-Z]{2}$"
    ).unwrap();

    pub static ref TRAILING_PHONE: Regex = Regex::new(
        r"\s+\d{3}[-.]?\d{3}[-.]?\d{4}\s*$"
    ).unwrap();

    // Model responses wrapped in markdown fences
    pub static ref FENCE_OPEN: Regex = Regex::new(
        r"^```(?:json|JSON)?\s*"
    ).unwrap();

    pub static ref FENCE_CLOSE: Regex = Regex::new(
        r"\s*```$"
    ).unwrap();
}
