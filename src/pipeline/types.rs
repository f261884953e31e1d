use crate::embedding::EmbeddingVector;
use crate::hashing::{CacheKeyError, ContentKey, content_key};
use crate::imaging::{DomainHint, ImageDomain};

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub hint: DomainHint,
}

impl ImageInput {
    /// Input whose domain is decided by the classifier.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            hint: DomainHint::Auto,
        }
    }

    pub fn with_hint(mut self, hint: DomainHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn key(&self) -> Result<ContentKey, CacheKeyError> {
        content_key(&self.bytes)
    }
}

/// An input that went through classification, normalization and embedding.
#[derive(Debug, Clone)]
pub struct PreparedEmbedding {
    pub vector: EmbeddingVector,
    pub domain: ImageDomain,
    /// `None` when the input could not be keyed and caching was bypassed.
    pub key: Option<ContentKey>,
    /// `true` if the vector came from the embedding cache.
    pub cached: bool,
    /// `true` if normalization fell back to the original bytes.
    pub degraded: bool,
}
