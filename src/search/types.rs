use serde::Serialize;

use super::corpus::RecordRef;
use crate::constants::{
    DEFAULT_SEARCH_CONCURRENCY, DEFAULT_SEARCH_TOP_K, SEARCH_MIN_SIMILARITY_FLOOR,
    SEARCH_THRESHOLD_LENIENCY,
};
use crate::imaging::ImageDomain;
use crate::scoring::ComparisonResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Maximum number of matches returned.
    pub top_k: usize,
    /// Matches below this similarity are dropped before `top_k` is applied.
    pub min_similarity: Option<f64>,
    /// Corpus records prepared at the same time. Values below 1 are treated as 1.
    pub concurrency: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_SEARCH_TOP_K,
            min_similarity: None,
            concurrency: DEFAULT_SEARCH_CONCURRENCY,
        }
    }
}

impl SearchOptions {
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = Some(min_similarity);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the similarity floor from a user-facing match threshold.
    pub fn threshold(self, threshold: f64) -> Self {
        self.min_similarity(min_similarity_for_threshold(threshold))
    }
}

/// `max(0.30, 0.6 * threshold)`: sketch searches accept weaker matches than asked for.
pub fn min_similarity_for_threshold(threshold: f64) -> f64 {
    SEARCH_MIN_SIMILARITY_FLOOR.max(threshold * SEARCH_THRESHOLD_LENIENCY)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    /// 1-based position in the result list.
    pub rank: usize,
    pub record: RecordRef,
    pub result: ComparisonResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub matches: Vec<RankedMatch>,
    pub probe_domain: ImageDomain,
    /// Records enumerated from the corpus.
    pub searched_records: usize,
    /// Records skipped because they could not be prepared.
    pub failed_records: usize,
}

impl SearchOutcome {
    pub fn total_matches(&self) -> usize {
        self.matches.len()
    }
}
