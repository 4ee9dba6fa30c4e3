//! Vision strategy: one model call per rasterized page.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ExtractionContext, Extractor, StrategyOutput, count_pages, unavailable};
use crate::error::Result;
use crate::models::transaction::{ExtractionMethod, IssueKind, RawDocument, RunIssue};
use crate::pdf::{PageRasterizer, PageReader};
use crate::vision::{EXTRACTION_PROMPT, VisionModel, parse_response};

/// Default rendering resolution for the vision model.
pub const VISION_DPI: u32 = 150;

pub struct VisionExtractor {
    reader: Arc<dyn PageReader>,
    rasterizer: Arc<dyn PageRasterizer>,
    model: Arc<dyn VisionModel>,
    dpi: u32,
}

impl VisionExtractor {
    pub fn new(
        reader: Arc<dyn PageReader>,
        rasterizer: Arc<dyn PageRasterizer>,
        model: Arc<dyn VisionModel>,
    ) -> Self {
        Self {
            reader,
            rasterizer,
            model,
            dpi: VISION_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

async fn encode_png(image: DynamicImage) -> std::result::Result<Vec<u8>, String> {
    tokio::task::spawn_blocking(move || {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| e.to_string())?;
        Ok(buffer)
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()))
}

#[async_trait]
impl Extractor for VisionExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Vision
    }

    async fn extract(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<StrategyOutput> {
        let method = self.method();
        if !self.model.is_available() {
            return Err(unavailable(method, "no API key configured"));
        }
        if !self.rasterizer.is_available().await {
            return Err(unavailable(method, "no page rasterizer available"));
        }

        let page_count = count_pages(&self.reader, &document.path).await?;
        let mut output = StrategyOutput::default();

        for page in ctx.pages_to_render(page_count) {
            let png = match self.rasterizer.render(&document.path, page, self.dpi).await {
                Ok(image) => encode_png(image).await,
                Err(e) => Err(e.to_string()),
            };
            let png = match png {
                Ok(png) => png,
                Err(reason) => {
                    warn!("Skipping page {} of {}: {}", page, document.file_name(), reason);
                    output
                        .issues
                        .push(RunIssue::new(method, IssueKind::PageRender, reason).on_page(page));
                    continue;
                }
            };

            let answer = match self.model.generate(&png, EXTRACTION_PROMPT).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("Model call failed on page {}: {}", page, e);
                    output
                        .issues
                        .push(RunIssue::new(method, IssueKind::ModelRequest, e.to_string()).on_page(page));
                    continue;
                }
            };

            match parse_response(&answer, page) {
                Ok(candidates) => {
                    debug!("Vision page {}: {} candidates", page, candidates.len());
                    output.candidates.extend(candidates);
                }
                Err(e) => {
                    warn!("Unusable model answer on page {}: {}", page, e);
                    output
                        .issues
                        .push(RunIssue::new(method, IssueKind::ResponseParse, e.to_string()).on_page(page));
                }
            }
        }

        Ok(output)
    }
}
