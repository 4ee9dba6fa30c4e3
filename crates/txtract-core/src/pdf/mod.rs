//! PDF reading, table reconstruction and page rasterization.

mod extractor;
mod render;
mod tables;

pub use extractor::{PdfExtractor, PdfPageReader};
pub use render::{PageRasterizer, PdftoppmRasterizer};
pub use tables::{Table, detect_tables, split_cells};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text content of one PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed).
    pub page_index: u32,
    /// Raw page text.
    pub raw_text: String,
    /// Tables reconstructed from the page text.
    pub raw_tables: Vec<Table>,
}

impl PageText {
    /// Build a page and reconstruct its tables from the text.
    pub fn from_text(page_index: u32, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let raw_tables = detect_tables(&raw_text);
        Self {
            page_index,
            raw_text,
            raw_tables,
        }
    }
}

/// Source of per-page text for a PDF document.
pub trait PageReader: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, path: &Path) -> Result<u32>;

    /// Read every page. A page that fails is reported in place so the
    /// remaining pages still count.
    fn read_pages(&self, path: &Path) -> Result<Vec<Result<PageText>>>;
}
