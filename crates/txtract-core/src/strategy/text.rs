//! Embedded PDF text strategy.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ExtractionContext, Extractor, StrategyOutput};
use crate::error::{PdfError, Result};
use crate::models::transaction::{ExtractionMethod, IssueKind, RawDocument, RunIssue};
use crate::pdf::{PageReader, PageText, PdfPageReader};
use crate::statement::LineParser;
use crate::statement::rules::resolve_year;

/// Parses reconstructed tables and text lines of every page.
pub struct TextExtractor {
    reader: Arc<dyn PageReader>,
    parser: LineParser,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PdfPageReader))
    }
}

impl TextExtractor {
    pub fn new(reader: Arc<dyn PageReader>) -> Self {
        Self {
            reader,
            parser: LineParser::new(ExtractionMethod::Text),
        }
    }

    fn parse_page(&self, page: &PageText, default_year: i32, output: &mut StrategyOutput) {
        let year = resolve_year(&page.raw_text, default_year);

        let before = output.candidates.len();
        for table in &page.raw_tables {
            output.candidates.extend(self.parser.parse_table(&table.rows, year));
        }
        let from_tables = output.candidates.len() - before;

        output.candidates.extend(self.parser.parse_lines(&page.raw_text, year));

        debug!(
            "Page {}: {} table candidates, {} line candidates (year {})",
            page.page_index,
            from_tables,
            output.candidates.len() - before - from_tables,
            year
        );
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Text
    }

    async fn extract(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<StrategyOutput> {
        let reader = Arc::clone(&self.reader);
        let path = document.path.clone();
        let pages = tokio::task::spawn_blocking(move || reader.read_pages(&path))
            .await
            .map_err(|e| PdfError::TextExtraction(e.to_string()))??;

        let mut output = StrategyOutput::default();
        for (index, page) in pages.into_iter().enumerate() {
            match page {
                Ok(page) => self.parse_page(&page, ctx.default_year, &mut output),
                Err(e) => {
                    let page_number = index as u32 + 1;
                    warn!("Skipping page {} of {}: {}", page_number, document.file_name(), e);
                    output.issues.push(
                        RunIssue::new(ExtractionMethod::Text, IssueKind::PageText, e.to_string())
                            .on_page(page_number),
                    );
                }
            }
        }

        Ok(output)
    }
}
