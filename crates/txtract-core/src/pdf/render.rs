//! Page rasterization for the OCR and vision strategies.

use async_trait::async_trait;
use image::DynamicImage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use super::{PdfExtractor, Result};
use crate::error::PdfError;

/// Renders single PDF pages to images.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Whether pages can be rendered at all.
    async fn is_available(&self) -> bool;

    /// Render one page (1-indexed) at `dpi`.
    async fn render(&self, path: &Path, page: u32, dpi: u32) -> Result<DynamicImage>;
}

/// Rasterizer backed by the poppler `pdftoppm` executable.
///
/// When the executable is missing it can fall back to the largest image
/// embedded in the page, which covers most scanned statements.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    executable: PathBuf,
    embedded_fallback: bool,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PdftoppmRasterizer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            embedded_fallback: true,
        }
    }

    /// Enable or disable the embedded-image fallback.
    pub fn with_embedded_fallback(mut self, enabled: bool) -> Self {
        self.embedded_fallback = enabled;
        self
    }

    async fn run_pdftoppm(&self, path: &Path, page: u32, dpi: u32) -> std::io::Result<Result<DynamicImage>> {
        let workdir = tempfile::tempdir()?;
        let prefix = workdir.path().join("page");
        let page_arg = page.to_string();

        let output = Command::new(&self.executable)
            .args(["-f", &page_arg, "-l", &page_arg])
            .args(["-r", &dpi.to_string()])
            .args(["-png", "-singlefile"])
            .arg(path)
            .arg(&prefix)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Ok(Err(PdfError::PageRender {
                page,
                reason: format!("pdftoppm exited with {}: {}", output.status, stderr.trim()),
            }));
        }

        let decoded = decode_page(prefix.with_extension("png"), page).await;
        // The rendered file lives in workdir until decoding finishes.
        drop(workdir);
        Ok(decoded)
    }

    async fn render_embedded(&self, path: &Path, page: u32) -> Result<DynamicImage> {
        let path = path.to_path_buf();
        let images = tokio::task::spawn_blocking(move || {
            PdfExtractor::open(&path).and_then(|pdf| pdf.page_images(page))
        })
        .await
        .map_err(|e| PdfError::PageRender {
            page,
            reason: e.to_string(),
        })??;

        images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| PdfError::PageRender {
                page,
                reason: "pdftoppm not installed and page has no embedded image".to_string(),
            })
    }
}

async fn decode_page(rendered: PathBuf, page: u32) -> Result<DynamicImage> {
    tokio::task::spawn_blocking(move || image::open(&rendered).map_err(|e| e.to_string()))
        .await
        .unwrap_or_else(|e| Err(e.to_string()))
        .map_err(|reason| PdfError::PageRender { page, reason })
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn is_available(&self) -> bool {
        let version = Command::new(&self.executable).arg("-v").output().await;
        match version {
            Ok(_) => true,
            Err(e) => {
                debug!("{} not usable: {}", self.executable.display(), e);
                self.embedded_fallback
            }
        }
    }

    async fn render(&self, path: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        match self.run_pdftoppm(path, page, dpi).await {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound && self.embedded_fallback => {
                debug!("pdftoppm not found, using embedded image for page {}", page);
                self.render_embedded(path, page).await
            }
            Err(e) => {
                warn!("Failed to run {}: {}", self.executable.display(), e);
                Err(PdfError::PageRender {
                    page,
                    reason: e.to_string(),
                })
            }
        }
    }
}
