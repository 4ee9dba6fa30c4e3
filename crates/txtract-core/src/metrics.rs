//! Counters and histograms emitted by the orchestrator.

use std::collections::HashMap;
use std::sync::Mutex;

/// Receives pipeline metrics.
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: &str, by: u64);

    fn record_histogram(&self, name: &str, value: f64);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment_counter(&self, _name: &str, _by: u64) {}

    fn record_histogram(&self, _name: &str, _value: f64) {}
}

/// Keeps metrics in memory, for tests and end-of-batch summaries.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: Mutex<HashMap<String, u64>>,
    histograms: Mutex<HashMap<String, Vec<f64>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter (0 if never incremented).
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .map(|c| c.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Recorded samples of a histogram, in order.
    pub fn samples(&self, name: &str) -> Vec<f64> {
        self.histograms
            .lock()
            .map(|h| h.get(name).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Snapshot of all counters, sorted by name.
    pub fn counters(&self) -> Vec<(String, u64)> {
        let mut counters: Vec<(String, u64)> = self
            .counters
            .lock()
            .map(|c| c.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        counters.sort();
        counters
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment_counter(&self, name: &str, by: u64) {
        if let Ok(mut counters) = self.counters.lock() {
            *counters.entry(name.to_string()).or_insert(0) += by;
        }
    }

    fn record_histogram(&self, name: &str, value: f64) {
        if let Ok(mut histograms) = self.histograms.lock() {
            histograms.entry(name.to_string()).or_default().push(value);
        }
    }
}
