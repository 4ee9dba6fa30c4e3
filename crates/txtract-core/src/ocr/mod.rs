//! OCR engine abstraction and the Tesseract-backed implementation.

mod tesseract;

pub use tesseract::TesseractEngine;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Turns a page image into plain text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Whether the engine is configured and installed.
    async fn is_available(&self) -> bool;

    /// Recognize the text of one page image, lines separated by `\n`.
    async fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Reject images an engine cannot do anything useful with.
pub(crate) fn validate_image(image: &DynamicImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width < 8 || height < 8 {
        return Err(OcrError::InvalidImage(format!(
            "{}x{} is too small to recognize",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image() {
        assert!(validate_image(&DynamicImage::new_luma8(2, 40)).is_err());
        assert!(validate_image(&DynamicImage::new_luma8(640, 480)).is_ok());
    }
}
