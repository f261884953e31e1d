use tracing::info;

use super::fifo::FifoCache;
use super::types::{CacheStats, ClearedCounts};
use crate::constants::CACHE_MAX_SIZE;
use crate::embedding::EmbeddingVector;
use crate::hashing::ContentKey;
use crate::imaging::{DomainHint, ImageDomain};
use crate::scoring::ComparisonResult;

/// Embeddings depend on the bytes and on which preprocessing strategy ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmbeddingKey {
    pub content: ContentKey,
    pub domain: ImageDomain,
}

impl EmbeddingKey {
    pub fn new(content: ContentKey, domain: ImageDomain) -> Self {
        Self { content, domain }
    }
}

/// Ordered pair key: `(a, b)` and `(b, a)` are different entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultKey {
    pub first: ContentKey,
    pub first_hint: DomainHint,
    pub second: ContentKey,
    pub second_hint: DomainHint,
}

impl ResultKey {
    pub fn new(
        first: ContentKey,
        first_hint: DomainHint,
        second: ContentKey,
        second_hint: DomainHint,
    ) -> Self {
        Self {
            first,
            first_hint,
            second,
            second_hint,
        }
    }
}

pub type EmbeddingCache = FifoCache<EmbeddingKey, EmbeddingVector>;
pub type ResultCache = FifoCache<ResultKey, ComparisonResult>;

/// The embedding cache and the result cache, shared by every request.
#[derive(Debug)]
pub struct ComparisonCaches {
    embeddings: EmbeddingCache,
    results: ResultCache,
}

impl Default for ComparisonCaches {
    fn default() -> Self {
        Self::new(CACHE_MAX_SIZE)
    }
}

impl ComparisonCaches {
    /// Both caches get the same capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            embeddings: FifoCache::new(capacity),
            results: FifoCache::new(capacity),
        }
    }

    #[inline]
    pub fn embeddings(&self) -> &EmbeddingCache {
        &self.embeddings
    }

    #[inline]
    pub fn results(&self) -> &ResultCache {
        &self.results
    }

    pub fn clear(&self) -> ClearedCounts {
        let counts = ClearedCounts {
            result_cache_cleared: self.results.clear(),
            embedding_cache_cleared: self.embeddings.clear(),
        };
        info!(
            results = counts.result_cache_cleared,
            embeddings = counts.embedding_cache_cleared,
            "Caches cleared"
        );
        counts
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            embedding_cache_size: self.embeddings.len(),
            result_cache_size: self.results.len(),
            max_size: self.embeddings.capacity(),
        }
    }
}
