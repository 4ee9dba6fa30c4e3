//! OCR strategy: rasterize, recognize, then parse like embedded text.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ExtractionContext, Extractor, StrategyOutput, count_pages, failed, unavailable};
use crate::error::{OcrError, Result};
use crate::models::transaction::{ExtractionMethod, IssueKind, RawDocument, RunIssue};
use crate::ocr::OcrEngine;
use crate::pdf::{PageRasterizer, PageReader};
use crate::statement::LineParser;

/// Default rendering resolution for OCR.
pub const OCR_DPI: u32 = 300;

pub struct OcrExtractor {
    reader: Arc<dyn PageReader>,
    rasterizer: Arc<dyn PageRasterizer>,
    engine: Arc<dyn OcrEngine>,
    dpi: u32,
    parser: LineParser,
}

impl OcrExtractor {
    pub fn new(
        reader: Arc<dyn PageReader>,
        rasterizer: Arc<dyn PageRasterizer>,
        engine: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            reader,
            rasterizer,
            engine,
            dpi: OCR_DPI,
            parser: LineParser::new(ExtractionMethod::Ocr),
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

#[async_trait]
impl Extractor for OcrExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ocr
    }

    async fn extract(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<StrategyOutput> {
        let method = self.method();
        if !self.engine.is_available().await {
            return Err(unavailable(method, "tesseract not configured or not installed"));
        }
        if !self.rasterizer.is_available().await {
            return Err(unavailable(method, "no page rasterizer available"));
        }

        let page_count = count_pages(&self.reader, &document.path).await?;
        let mut output = StrategyOutput::default();

        for page in ctx.pages_to_render(page_count) {
            let image = match self.rasterizer.render(&document.path, page, self.dpi).await {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping page {} of {}: {}", page, document.file_name(), e);
                    output
                        .issues
                        .push(RunIssue::new(method, IssueKind::PageRender, e.to_string()).on_page(page));
                    continue;
                }
            };

            let text = match self.engine.recognize(&image).await {
                Ok(text) => text,
                Err(OcrError::Timeout(secs)) => {
                    return Err(failed(method, format!("page {} timed out after {}s", page, secs)));
                }
                Err(OcrError::Unavailable(reason)) => return Err(unavailable(method, reason)),
                Err(e) => {
                    warn!("OCR failed on page {}: {}", page, e);
                    output
                        .issues
                        .push(RunIssue::new(method, IssueKind::PageText, e.to_string()).on_page(page));
                    continue;
                }
            };

            let candidates = self.parser.parse_text(&text, ctx.default_year);
            debug!("OCR page {}: {} candidates", page, candidates.len());
            output.candidates.extend(candidates);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, TxtractError};
    use crate::models::transaction::DocumentKind;
    use crate::strategy::fakes::{FakeOcr, FakePages, FakeRasterizer};
    use std::collections::HashMap;

    fn document() -> RawDocument {
        RawDocument::new("scan.pdf", DocumentKind::Pdf)
    }

    fn extractor(ocr: FakeOcr, rasterizer: FakeRasterizer) -> OcrExtractor {
        OcrExtractor::new(
            Arc::new(FakePages(vec!["", "", ""])),
            Arc::new(rasterizer),
            Arc::new(ocr),
        )
    }

    #[tokio::test]
    async fn test_recognized_pages_are_parsed() {
        let ocr = FakeOcr {
            available: true,
            pages: HashMap::from([
                (1, "12/20 CHIPOTLE ONLINE CA $7.17\n12/21 TARGET $15.00".to_string()),
                (3, "Payment Due Date 01/15/26\n01/02 SHELL OIL $40.00".to_string()),
            ]),
            timeout: false,
        };
        let output = extractor(ocr, FakeRasterizer { failing_pages: vec![2] })
            .extract(&document(), &ExtractionContext::new(2025))
            .await
            .unwrap();

        assert_eq!(output.candidates.len(), 3);
        assert!(output.candidates.iter().all(|c| c.source_method == ExtractionMethod::Ocr));
        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.issues[0].kind, IssueKind::PageRender);
        assert_eq!(output.issues[0].page, Some(2));
    }

    #[tokio::test]
    async fn test_max_pages_limits_rendering() {
        let ocr = FakeOcr {
            available: true,
            pages: HashMap::from([(3, "01/02 SHELL OIL $40.00".to_string())]),
            timeout: false,
        };
        let output = extractor(ocr, FakeRasterizer::default())
            .extract(&document(), &ExtractionContext::new(2025).with_max_pages(2))
            .await
            .unwrap();
        assert!(output.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_missing_engine_is_unavailable() {
        let err = extractor(FakeOcr::default(), FakeRasterizer::default())
            .extract(&document(), &ExtractionContext::new(2025))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TxtractError::Extraction(ExtractionError::StrategyUnavailable { method: ExtractionMethod::Ocr, .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_fails_strategy() {
        let ocr = FakeOcr {
            available: true,
            timeout: true,
            ..Default::default()
        };
        let err = extractor(ocr, FakeRasterizer::default())
            .extract(&document(), &ExtractionContext::new(2025))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TxtractError::Extraction(ExtractionError::StrategyFailed { .. })
        ));
    }
}
