//! Extraction strategies.
//!
//! Each strategy turns a document into candidate transactions on its own.
//! The orchestrator decides which ones run and in what order.

mod csv;
mod ocr;
mod text;
mod vision;

pub use self::csv::{ColumnMapping, CsvExtractor};
pub use self::ocr::OcrExtractor;
pub use self::text::TextExtractor;
pub use self::vision::VisionExtractor;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ExtractionError, PdfError, Result, TxtractError};
use crate::models::transaction::{CandidateTransaction, ExtractionMethod, RawDocument, RunIssue};
use crate::pdf::PageReader;

/// Per-document settings shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionContext {
    /// Year used when the document text carries none.
    pub default_year: i32,
    /// Maximum pages rasterized per document (0 = unlimited).
    pub max_pages: usize,
}

impl ExtractionContext {
    pub fn new(default_year: i32) -> Self {
        Self {
            default_year,
            max_pages: 0,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Pages 1..=n to rasterize, honoring `max_pages`.
    pub fn pages_to_render(&self, page_count: u32) -> std::ops::RangeInclusive<u32> {
        let limit = match self.max_pages {
            0 => page_count,
            max => page_count.min(u32::try_from(max).unwrap_or(u32::MAX)),
        };
        1..=limit
    }
}

/// What a strategy produced for one document.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutput {
    pub candidates: Vec<CandidateTransaction>,
    /// Non-fatal problems (failed pages, unparseable answers).
    pub issues: Vec<RunIssue>,
}

/// A single extraction strategy.
///
/// `StrategyUnavailable` means the strategy could not run and is skipped;
/// `StrategyFailed` means it gave up part way. Any other error is a problem
/// with the document itself and ends the run.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Method tag of the candidates this strategy produces.
    fn method(&self) -> ExtractionMethod;

    async fn extract(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<StrategyOutput>;
}

pub(crate) fn unavailable(method: ExtractionMethod, reason: impl Into<String>) -> TxtractError {
    ExtractionError::StrategyUnavailable {
        method,
        reason: reason.into(),
    }
    .into()
}

pub(crate) fn failed(method: ExtractionMethod, reason: impl Into<String>) -> TxtractError {
    ExtractionError::StrategyFailed {
        method,
        reason: reason.into(),
    }
    .into()
}

/// Count pages on a blocking thread.
pub(crate) async fn count_pages(reader: &Arc<dyn PageReader>, path: &Path) -> Result<u32> {
    let reader = Arc::clone(reader);
    let path = path.to_path_buf();
    let count = tokio::task::spawn_blocking(move || reader.page_count(&path))
        .await
        .map_err(|e| PdfError::TextExtraction(e.to_string()))??;
    Ok(count)
}
