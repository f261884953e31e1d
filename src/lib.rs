//! FaceFind library crate (used by the server and integration tests).
//!
//! Compares forensic sketches against photographs and ranks a photo corpus
//! against a sketch probe.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`ComparisonPipeline`], [`ImageInput`] - classify, normalize, embed, score
//! - [`ComparisonResult`], [`ConfidenceLevel`] - scored output and its confidence band
//!
//! ## Images & Embeddings
//! - [`ImageClassifier`], [`CrossDomainNormalizer`] - sketch/photo handling
//! - [`EmbeddingProvider`], [`ImageEmbedder`], [`EmbedderConfig`] - face embeddings
//!
//! ## Search
//! - [`CandidateRanker`], [`SearchOptions`], [`SearchOutcome`] - probe-vs-corpus ranking
//! - [`CorpusProvider`], [`DirectoryCorpus`], [`InMemoryCorpus`] - reference photos
//!
//! ## Caching
//! - [`ComparisonCaches`], [`FifoCache`] - bounded embedding and result caches
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod imaging;
pub mod pipeline;
pub mod scoring;
pub mod search;

pub use cache::{
    CACHE_STATUS_HEADER, CacheStats, CacheStatus, ClearedCounts, ComparisonCaches, FifoCache,
};
pub use config::{Config, ConfigError};
pub use constants::CACHE_MAX_SIZE;
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingProvider;
pub use embedding::{
    EmbedderConfig, EmbeddingError, EmbeddingProvider, EmbeddingVector, ImageEmbedder,
};
pub use hashing::{CacheKeyError, ContentKey, content_key};
pub use imaging::{
    CrossDomainNormalizer, DecodeError, DomainHint, ImageClassifier, ImageDomain, PreparedImage,
};
pub use pipeline::{ComparisonError, ComparisonPipeline, ImageInput, PreparedEmbedding};
pub use scoring::{
    ComparisonResult, Confidence, ConfidenceLevel, classify_confidence, cosine_similarity,
};
pub use search::{
    CandidateRanker, CorpusError, CorpusProvider, CorpusRecord, DirectoryCorpus, InMemoryCorpus,
    RankedMatch, SearchError, SearchOptions, SearchOutcome,
};
