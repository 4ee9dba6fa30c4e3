//! Core library for extracting card transactions from statements.
//!
//! This crate provides:
//! - Statement line and table parsing with data-driven dialects
//! - PDF text reading, table reconstruction and page rasterization
//! - OCR (Tesseract) and vision model (Gemini) collaborators
//! - Text, OCR, vision and CSV extraction strategies
//! - An orchestrator that escalates between strategies and deduplicates results

pub mod error;
pub mod metrics;
pub mod models;
pub mod ocr;
pub mod orchestrator;
pub mod pdf;
pub mod statement;
pub mod strategy;
pub mod vision;

pub use error::{ExtractionError, Result, TxtractError};
pub use metrics::{InMemoryMetrics, MetricsSink, NoopMetrics};
pub use models::config::PipelineConfig;
pub use models::transaction::{
    CandidateTransaction, DocumentKind, ExtractionMethod, ExtractionOutcome, ExtractionRun,
    NormalizedTransaction, RawDocument,
};
pub use orchestrator::{ExtractionState, Orchestrator};
pub use strategy::{ExtractionContext, Extractor, StrategyOutput};
