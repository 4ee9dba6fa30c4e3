//! Identity-key deduplication.

use std::collections::HashSet;

use crate::models::transaction::{DedupKey, NormalizedTransaction};

/// Keeps the first occurrence of each `(date, merchant.lower(), amount)` key.
///
/// One instance lives for a whole document so that table and line passes,
/// and successive strategies, can overlap freely.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction; `false` if its key was already seen.
    pub fn insert(&mut self, transaction: &NormalizedTransaction) -> bool {
        self.seen.insert(transaction.dedup_key())
    }

    /// Keep the transactions whose key has not been seen yet, in order.
    pub fn filter(&mut self, transactions: Vec<NormalizedTransaction>) -> Vec<NormalizedTransaction> {
        transactions.into_iter().filter(|t| self.insert(t)).collect()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Deduplicate a standalone list.
pub fn deduplicate(transactions: Vec<NormalizedTransaction>) -> Vec<NormalizedTransaction> {
    Deduplicator::new().filter(transactions)
}
