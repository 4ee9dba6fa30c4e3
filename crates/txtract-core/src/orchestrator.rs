//! Strategy escalation for a single document, and bounded batches of documents.

use futures_util::stream::{self, StreamExt};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::error::{ExtractionError, Result, TxtractError};
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::models::config::{ExtractionConfig, PipelineConfig};
use crate::models::transaction::{
    AttemptOutcome, DocumentKind, ExtractionMethod, ExtractionOutcome, ExtractionRun, IssueKind,
    NormalizedTransaction, RawDocument, RunIssue, StrategyAttempt,
};
use crate::ocr::TesseractEngine;
use crate::pdf::{PageRasterizer, PageReader, PdfPageReader, PdftoppmRasterizer};
use crate::statement::{Deduplicator, deduplicate, normalize};
use crate::strategy::{
    CsvExtractor, ExtractionContext, Extractor, OcrExtractor, StrategyOutput, TextExtractor,
    VisionExtractor,
};
use crate::vision::GeminiVisionClient;

/// Default minimum yield before escalation stops.
pub const DEFAULT_YIELD_THRESHOLD: usize = 3;

/// Where a PDF run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    NotStarted,
    Trying(ExtractionMethod),
    Done,
}

impl fmt::Display for ExtractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionState::NotStarted => f.write_str("not started"),
            ExtractionState::Trying(method) => write!(f, "trying {}", method),
            ExtractionState::Done => f.write_str("done"),
        }
    }
}

/// Runs PDF strategies in escalation order and CSV exports directly.
pub struct Orchestrator {
    strategies: Vec<Box<dyn Extractor>>,
    csv: Box<dyn Extractor>,
    settings: ExtractionConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl Orchestrator {
    /// Build an orchestrator trying `strategies` in the given order for PDFs.
    pub fn new(strategies: Vec<Box<dyn Extractor>>) -> Self {
        Self {
            strategies,
            csv: Box::new(CsvExtractor::new()),
            settings: ExtractionConfig {
                yield_threshold: DEFAULT_YIELD_THRESHOLD,
                ..Default::default()
            },
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Text, then OCR, then vision, wired from configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let reader: Arc<dyn PageReader> = Arc::new(PdfPageReader);
        let rasterizer: Arc<dyn PageRasterizer> =
            Arc::new(PdftoppmRasterizer::new(&config.render.pdftoppm_path));

        let strategies: Vec<Box<dyn Extractor>> = vec![
            Box::new(TextExtractor::new(Arc::clone(&reader))),
            Box::new(
                OcrExtractor::new(
                    Arc::clone(&reader),
                    Arc::clone(&rasterizer),
                    Arc::new(TesseractEngine::from_config(&config.ocr)),
                )
                .with_dpi(config.render.ocr_dpi),
            ),
            Box::new(
                VisionExtractor::new(
                    reader,
                    rasterizer,
                    Arc::new(GeminiVisionClient::from_config(&config.vision)),
                )
                .with_dpi(config.render.vision_dpi),
            ),
        ];

        let mut orchestrator = Self::new(strategies);
        orchestrator.settings = config.extraction.clone();
        orchestrator
    }

    pub fn with_yield_threshold(mut self, threshold: usize) -> Self {
        self.settings.yield_threshold = threshold;
        self
    }

    /// Year used when a document carries none. Unset means the current year.
    pub fn with_default_year(mut self, year: i32) -> Self {
        self.settings.default_year = Some(year);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.settings.max_pages = max_pages;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_csv_extractor(mut self, csv: Box<dyn Extractor>) -> Self {
        self.csv = csv;
        self
    }

    /// PDF strategies in escalation order.
    pub fn strategy_order(&self) -> Vec<ExtractionMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    fn context(&self) -> ExtractionContext {
        ExtractionContext::new(self.settings.processing_year())
            .with_max_pages(self.settings.max_pages)
    }

    /// Extract the transactions of one document.
    ///
    /// A missing or unreadable input file is reported as an I/O error before
    /// any strategy runs. For PDFs, a strategy that cannot read the document
    /// is recorded as failed and the run escalates; only a run where every
    /// strategy came up empty ends in `TotalExtractionFailure`.
    pub async fn extract(&self, document: &RawDocument) -> Result<ExtractionOutcome> {
        let start = Instant::now();
        info!("Processing {} ({:?})", document.file_name(), document.kind);

        tokio::fs::metadata(&document.path).await?;
        let ctx = self.context();

        let result = match document.kind {
            DocumentKind::Csv => self.extract_csv(document, &ctx).await,
            DocumentKind::Pdf => self.extract_pdf(document, &ctx).await,
        };

        self.metrics.increment_counter("documents_processed", 1);
        if let Ok(outcome) = &result {
            let count = outcome.transactions.len();
            if let Some(method) = outcome.run.final_method {
                self.metrics
                    .increment_counter(&format!("extraction_method_{}", method), 1);
            }
            self.metrics.increment_counter("transactions_extracted", count as u64);
            self.metrics
                .record_histogram("transactions_per_document", count as f64);

            info!(
                "Extracted {} transactions from {} via {} in {:?}",
                count,
                document.file_name(),
                outcome
                    .run
                    .final_method
                    .map(|m| m.as_str())
                    .unwrap_or("nothing"),
                start.elapsed()
            );
        }

        result
    }

    async fn extract_csv(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<ExtractionOutcome> {
        let mut run = ExtractionRun::new(document.clone());
        let output = self.csv.extract(document, ctx).await?;

        let mut dedup = Deduplicator::new();
        let (transactions, yielded) = absorb(output, ctx, &mut dedup, &mut run);

        let method = self.csv.method();
        run.attempts.push(StrategyAttempt {
            method,
            outcome: AttemptOutcome::Completed { yielded },
        });
        run.final_method = Some(method);

        Ok(ExtractionOutcome { transactions, run })
    }

    async fn extract_pdf(&self, document: &RawDocument, ctx: &ExtractionContext) -> Result<ExtractionOutcome> {
        let mut run = ExtractionRun::new(document.clone());
        let mut dedup = Deduplicator::new();
        let mut transactions = Vec::new();
        let mut state = ExtractionState::NotStarted;

        for strategy in &self.strategies {
            let method = strategy.method();
            trace!("{}: {} -> trying {}", document.file_name(), state, method);
            state = ExtractionState::Trying(method);

            let outcome = match strategy.extract(document, ctx).await {
                Ok(output) => {
                    let (accepted, yielded) = absorb(output, ctx, &mut dedup, &mut run);
                    transactions.extend(accepted);
                    AttemptOutcome::Completed { yielded }
                }
                Err(TxtractError::Extraction(ExtractionError::StrategyUnavailable { reason, .. })) => {
                    info!("Skipping {} strategy: {}", method, reason);
                    run.errors
                        .push(RunIssue::new(method, IssueKind::StrategyUnavailable, reason.clone()));
                    AttemptOutcome::Skipped { reason }
                }
                Err(e) => {
                    // Includes documents the strategy could not open or parse.
                    let reason = match e {
                        TxtractError::Extraction(ExtractionError::StrategyFailed { reason, .. }) => reason,
                        other => other.to_string(),
                    };
                    warn!("{} strategy failed on {}: {}", method, document.file_name(), reason);
                    run.errors
                        .push(RunIssue::new(method, IssueKind::StrategyFailed, reason.clone()));
                    AttemptOutcome::Failed { reason }
                }
            };

            let attempt = StrategyAttempt { method, outcome };
            if attempt.was_invoked() {
                run.final_method = Some(method);
            }
            let yielded = attempt.yielded();
            debug!("{}: {}", document.file_name(), attempt);
            run.attempts.push(attempt);

            if yielded >= self.settings.yield_threshold {
                break;
            }
        }

        state = ExtractionState::Done;
        trace!("{}: {}", document.file_name(), state);

        if transactions.is_empty() {
            return Err(ExtractionError::TotalExtractionFailure {
                attempts: run.attempts,
            }
            .into());
        }

        Ok(ExtractionOutcome { transactions, run })
    }

    /// Extract many documents with at most `limit` in flight. Results keep input order.
    pub async fn extract_batch(&self, documents: &[RawDocument], limit: usize) -> Vec<Result<ExtractionOutcome>> {
        self.extract_batch_with(documents, limit, |_, _| ControlFlow::Continue(()))
            .await
            .into_iter()
            .map(|(_, result)| result)
            .collect()
    }

    /// Like [`Orchestrator::extract_batch`], calling `on_complete` as each document finishes.
    ///
    /// Returning `ControlFlow::Break` from `on_complete` stops the batch: documents
    /// still in flight are dropped and no new ones start. The result holds the
    /// finished documents as `(input index, result)` pairs in input order.
    pub async fn extract_batch_with<F>(
        &self,
        documents: &[RawDocument],
        limit: usize,
        mut on_complete: F,
    ) -> Vec<(usize, Result<ExtractionOutcome>)>
    where
        F: FnMut(&RawDocument, &Result<ExtractionOutcome>) -> ControlFlow<()>,
    {
        let mut pending = stream::iter(documents.iter().enumerate())
            .map(|(index, document)| async move { (index, self.extract(document).await) })
            .buffer_unordered(limit.max(1));

        let mut finished = Vec::with_capacity(documents.len());
        while let Some((index, result)) = pending.next().await {
            let flow = on_complete(&documents[index], &result);
            finished.push((index, result));
            if flow.is_break() {
                debug!("Batch stopped after {} of {} documents", finished.len(), documents.len());
                break;
            }
        }

        finished.sort_by_key(|(index, _)| *index);
        finished
    }
}

/// Normalize a strategy's candidates and merge them into the document.
///
/// Returns the newly accepted transactions and the strategy's own
/// deduplicated yield.
fn absorb(
    output: StrategyOutput,
    ctx: &ExtractionContext,
    dedup: &mut Deduplicator,
    run: &mut ExtractionRun,
) -> (Vec<NormalizedTransaction>, usize) {
    run.errors.extend(output.issues);

    let normalized: Vec<NormalizedTransaction> = output
        .candidates
        .iter()
        .filter_map(|c| normalize(c, ctx.default_year))
        .collect();
    let yielded = deduplicate(normalized.clone()).len();

    (dedup.filter(normalized), yielded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::InMemoryMetrics;
    use crate::strategy::fakes::FakePages;
    use crate::models::transaction::{CandidateDate, CandidateTransaction};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed set of candidates, counting calls.
    struct Scripted {
        method: ExtractionMethod,
        result: fn(ExtractionMethod) -> Result<StrategyOutput>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Extractor for Scripted {
        fn method(&self) -> ExtractionMethod {
            self.method
        }

        async fn extract(&self, _document: &RawDocument, _ctx: &ExtractionContext) -> Result<StrategyOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)(self.method)
        }
    }

    fn candidate(method: ExtractionMethod, day: u32, merchant: &str, cents: i64) -> CandidateTransaction {
        CandidateTransaction {
            date: CandidateDate::MonthDay { month: 12, day },
            merchant: merchant.to_string(),
            amount: Decimal::new(cents, 2),
            raw_text: merchant.to_string(),
            source_method: method,
        }
    }

    fn one(method: ExtractionMethod) -> Result<StrategyOutput> {
        Ok(StrategyOutput {
            candidates: vec![candidate(method, 20, "CHIPOTLE", 717)],
            issues: Vec::new(),
        })
    }

    fn none(_method: ExtractionMethod) -> Result<StrategyOutput> {
        Ok(StrategyOutput::default())
    }

    fn plenty(method: ExtractionMethod) -> Result<StrategyOutput> {
        Ok(StrategyOutput {
            candidates: vec![
                candidate(method, 20, "CHIPOTLE", 717),
                candidate(method, 21, "TARGET", 1500),
                candidate(method, 22, "SHELL OIL", -4000),
                candidate(method, 23, "AMAZON", 2399),
            ],
            issues: Vec::new(),
        })
    }

    fn unavailable(method: ExtractionMethod) -> Result<StrategyOutput> {
        Err(crate::strategy::unavailable(method, "not configured"))
    }

    fn scripted(
        method: ExtractionMethod,
        result: fn(ExtractionMethod) -> Result<StrategyOutput>,
    ) -> (Box<dyn Extractor>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = Scripted {
            method,
            result,
            calls: Arc::clone(&calls),
        };
        (Box::new(extractor), calls)
    }

    fn pdf() -> (tempfile::NamedTempFile, RawDocument) {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let document = RawDocument::new(file.path(), DocumentKind::Pdf);
        (file, document)
    }

    #[tokio::test]
    async fn test_low_yield_escalates_through_every_strategy() {
        let (text, _) = scripted(ExtractionMethod::Text, one);
        let (ocr, _) = scripted(ExtractionMethod::Ocr, one);
        let (vision, vision_calls) = scripted(ExtractionMethod::Vision, one);
        let orchestrator = Orchestrator::new(vec![text, ocr, vision]).with_default_year(2025);

        let (_file, document) = pdf();
        let outcome = orchestrator.extract(&document).await.unwrap();

        assert_eq!(vision_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcome.run.strategy_order(),
            vec![ExtractionMethod::Text, ExtractionMethod::Ocr, ExtractionMethod::Vision]
        );
        assert_eq!(outcome.run.final_method, Some(ExtractionMethod::Vision));
        // Same key from all three strategies.
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.transactions[0].source_method, ExtractionMethod::Text);
        assert_eq!(outcome.run.yield_for(ExtractionMethod::Ocr), Some(1));
    }

    #[tokio::test]
    async fn test_sufficient_yield_stops_escalation() {
        let (text, _) = scripted(ExtractionMethod::Text, plenty);
        let (ocr, ocr_calls) = scripted(ExtractionMethod::Ocr, one);
        let orchestrator = Orchestrator::new(vec![text, ocr]).with_default_year(2025);

        let (_file, document) = pdf();
        let outcome = orchestrator.extract(&document).await.unwrap();

        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.run.final_method, Some(ExtractionMethod::Text));
        assert_eq!(outcome.transactions.len(), 4);
    }

    #[tokio::test]
    async fn test_skipped_strategy_is_not_final_method() {
        let (text, _) = scripted(ExtractionMethod::Text, one);
        let (ocr, _) = scripted(ExtractionMethod::Ocr, plenty);
        let (vision, _) = scripted(ExtractionMethod::Vision, unavailable);
        let orchestrator = Orchestrator::new(vec![text, vision, ocr]).with_default_year(2025);

        let (_file, document) = pdf();
        let outcome = orchestrator.extract(&document).await.unwrap();

        assert_eq!(outcome.run.final_method, Some(ExtractionMethod::Ocr));
        assert_eq!(outcome.run.errors.len(), 1);
        assert_eq!(outcome.run.errors[0].kind, IssueKind::StrategyUnavailable);
        assert_eq!(outcome.transactions.len(), 4);
    }

    #[tokio::test]
    async fn test_total_failure() {
        let (text, _) = scripted(ExtractionMethod::Text, none);
        let (ocr, _) = scripted(ExtractionMethod::Ocr, unavailable);
        let (vision, _) = scripted(ExtractionMethod::Vision, none);
        let orchestrator = Orchestrator::new(vec![text, ocr, vision]).with_default_year(2025);

        let (_file, document) = pdf();
        let err = orchestrator.extract(&document).await.unwrap_err();

        match err {
            TxtractError::Extraction(ExtractionError::TotalExtractionFailure { attempts }) => {
                assert_eq!(attempts.len(), 3);
                assert!(!attempts[1].was_invoked());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let (text, calls) = scripted(ExtractionMethod::Text, one);
        let orchestrator = Orchestrator::new(vec![text]);
        let document = RawDocument::new("/nonexistent/statement.pdf", DocumentKind::Pdf);

        let err = orchestrator.extract(&document).await.unwrap_err();
        assert!(matches!(err, TxtractError::Io(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_outputs_are_unique_positive_cents() {
        let (text, _) = scripted(ExtractionMethod::Text, plenty);
        let (ocr, _) = scripted(ExtractionMethod::Ocr, plenty);
        let orchestrator = Orchestrator::new(vec![text, ocr])
            .with_default_year(2025)
            .with_yield_threshold(10);

        let (_file, document) = pdf();
        let outcome = orchestrator.extract(&document).await.unwrap();

        let keys: HashSet<_> = outcome.transactions.iter().map(|t| t.dedup_key()).collect();
        assert_eq!(keys.len(), outcome.transactions.len());
        for t in &outcome.transactions {
            assert!(t.amount > Decimal::ZERO);
            assert_eq!(t.amount.scale(), 2);
        }
        assert_eq!(
            outcome.transactions[2].date,
            NaiveDate::from_ymd_opt(2025, 12, 22).unwrap()
        );
    }

    #[tokio::test]
    async fn test_csv_bypasses_strategies_and_records_metrics() {
        let (text, text_calls) = scripted(ExtractionMethod::Text, plenty);
        let metrics = Arc::new(InMemoryMetrics::new());
        let orchestrator = Orchestrator::new(vec![text])
            .with_default_year(2025)
            .with_metrics(metrics.clone());

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"Transaction Date,Description,Debit\n12/20/2025,CHIPOTLE,7.17\n12/20/2025,Chipotle,7.17\n",
        )
        .unwrap();
        let document = RawDocument::new(file.path(), DocumentKind::Csv);

        let outcome = orchestrator.extract(&document).await.unwrap();

        assert_eq!(text_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.run.final_method, Some(ExtractionMethod::Csv));
        assert_eq!(metrics.counter("documents_processed"), 1);
        assert_eq!(metrics.counter("extraction_method_csv"), 1);
        assert_eq!(metrics.counter("transactions_extracted"), 1);
        assert_eq!(metrics.samples("transactions_per_document"), vec![1.0]);
    }

    #[tokio::test]
    async fn test_empty_csv_is_not_a_failure() {
        let orchestrator = Orchestrator::new(Vec::new());
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"Date,Category\n12/20/2025,Food\n").unwrap();
        let document = RawDocument::new(file.path(), DocumentKind::Csv);

        let outcome = orchestrator.extract(&document).await.unwrap();
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.run.errors[0].kind, IssueKind::ColumnMappingIncomplete);
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let (text, calls) = scripted(ExtractionMethod::Text, plenty);
        let orchestrator = Orchestrator::new(vec![text]).with_default_year(2025);

        let files: Vec<_> = (0..3).map(|_| pdf()).collect();
        let mut documents: Vec<RawDocument> = files.iter().map(|(_, d)| d.clone()).collect();
        documents.insert(1, RawDocument::new("/nonexistent/missing.pdf", DocumentKind::Pdf));

        let results = orchestrator.extract_batch(&documents, 2).await;

        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(
            results[3].as_ref().unwrap().run.document.path,
            documents[3].path
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_batch_callback_sees_every_document() {
        let (text, _) = scripted(ExtractionMethod::Text, plenty);
        let orchestrator = Orchestrator::new(vec![text]).with_default_year(2025);

        let files: Vec<_> = (0..3).map(|_| pdf()).collect();
        let documents: Vec<RawDocument> = files.iter().map(|(_, d)| d.clone()).collect();

        let mut completed = 0;
        let results = orchestrator
            .extract_batch_with(&documents, 2, |_, _| {
                completed += 1;
                ControlFlow::Continue(())
            })
            .await;

        assert_eq!(completed, 3);
        let indexes: Vec<usize> = results.iter().map(|(index, _)| *index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_batch_stops_on_break() {
        let (text, calls) = scripted(ExtractionMethod::Text, plenty);
        let orchestrator = Orchestrator::new(vec![text]).with_default_year(2025);

        let files: Vec<_> = (0..2).map(|_| pdf()).collect();
        let mut documents: Vec<RawDocument> = files.iter().map(|(_, d)| d.clone()).collect();
        documents.insert(0, RawDocument::new("/nonexistent/missing.pdf", DocumentKind::Pdf));

        let results = orchestrator
            .extract_batch_with(&documents, 1, |_, result| {
                if result.is_err() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 0);
        assert!(results[0].1.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unparseable_pdf_escalates_to_total_failure() {
        let (ocr, ocr_calls) = scripted(ExtractionMethod::Ocr, none);
        let orchestrator = Orchestrator::new(vec![Box::new(TextExtractor::default()), ocr])
            .with_default_year(2025);

        let (mut file, document) = pdf();
        std::io::Write::write_all(&mut file, b"this is not a pdf").unwrap();

        let err = orchestrator.extract(&document).await.unwrap_err();

        assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
        match err {
            TxtractError::Extraction(ExtractionError::TotalExtractionFailure { attempts }) => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].method, ExtractionMethod::Text);
                match &attempts[0].outcome {
                    AttemptOutcome::Failed { reason } => assert!(reason.contains("PDF")),
                    other => panic!("unexpected outcome: {:?}", other),
                }
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_table_and_line_passes_collapse_to_one_transaction() {
        let reader = FakePages(vec!["12/20   CHIPOTLE ONLINE   $7.17"]);
        let text = TextExtractor::new(Arc::new(reader));
        let orchestrator = Orchestrator::new(vec![Box::new(text)]).with_default_year(2025);

        let (_file, document) = pdf();
        let outcome = orchestrator.extract(&document).await.unwrap();

        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.transactions[0].merchant, "CHIPOTLE ONLINE");
        assert_eq!(
            outcome.transactions[0].date,
            NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
        );
        assert_eq!(outcome.run.yield_for(ExtractionMethod::Text), Some(1));
    }
}
