//! In-memory comparison caches.
//!
//! Two bounded [`FifoCache`]s: one maps `(content, domain)` to embeddings, the other
//! maps an ordered pair of inputs to a finished [`ComparisonResult`](crate::scoring::ComparisonResult).

pub mod fifo;
pub mod service;
pub mod types;


pub use fifo::FifoCache;
pub use service::{ComparisonCaches, EmbeddingCache, EmbeddingKey, ResultCache, ResultKey};
pub use types::{CACHE_STATUS_HEADER, CacheEntry, CacheStats, CacheStatus, ClearedCounts};
