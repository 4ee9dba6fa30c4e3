//! Error types for the txtract-core library.

use thiserror::Error;

use crate::models::transaction::{ExtractionMethod, StrategyAttempt};

/// Main error type for the txtract library.
#[derive(Error, Debug)]
pub enum TxtractError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Vision model error.
    #[error("vision error: {0}")]
    Vision(#[from] VisionError),

    /// Transaction extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF reading and page rendering.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// A page could not be rasterized.
    #[error("failed to render page {page}: {reason}")]
    PageRender { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to the external OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The engine executable is not configured or not present.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The engine did not answer in time.
    #[error("OCR timed out after {0}s")]
    Timeout(u64),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to the multimodal model collaborator.
#[derive(Error, Debug)]
pub enum VisionError {
    /// No credentials configured.
    #[error("vision model unavailable: {0}")]
    Unavailable(String),

    /// Network or transport failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status (auth, quota, server error).
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response did not contain the expected structure.
    #[error("malformed model response: {0}")]
    ResponseParse(String),

    /// The call did not complete in time.
    #[error("vision call timed out after {0}s")]
    Timeout(u64),
}

/// Errors related to transaction extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A strategy could not run at all.
    #[error("{method} strategy unavailable: {reason}")]
    StrategyUnavailable {
        method: ExtractionMethod,
        reason: String,
    },

    /// A strategy started but failed as a whole.
    #[error("{method} strategy failed: {reason}")]
    StrategyFailed {
        method: ExtractionMethod,
        reason: String,
    },

    /// Every attempted strategy produced nothing.
    #[error("could not extract transactions: {}", describe_attempts(.attempts))]
    TotalExtractionFailure { attempts: Vec<StrategyAttempt> },

    /// The document kind could not be determined.
    #[error("unsupported document: {0}")]
    UnsupportedDocument(String),
}

fn describe_attempts(attempts: &[StrategyAttempt]) -> String {
    if attempts.is_empty() {
        return "no strategy was attempted".to_string();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for the txtract library.
pub type Result<T> = std::result::Result<T, TxtractError>;
