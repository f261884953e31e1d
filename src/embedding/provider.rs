use std::future::Future;
use std::sync::Arc;

use crate::constants::WARM_UP_IMAGE_SIZE;
use crate::imaging::PreparedImage;

use super::error::EmbeddingError;

/// Immutable embedding produced by a provider. Clones share the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Arc<[f32]>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values.into())
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        self.as_slice()
    }
}

/// Face embedding model behind the comparison pipeline.
///
/// Implementations are constructed (and warmed) once, then shared by every request.
/// `embed` must be deterministic for identical input bytes after warm-up.
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier reported on every comparison result.
    fn model_name(&self) -> &str;

    /// Baseline cosine distance at which the model considers two faces the same person.
    fn distance_threshold(&self) -> f64;

    /// Embeds one normalized image.
    fn embed(
        &self,
        image: &PreparedImage,
    ) -> impl Future<Output = Result<EmbeddingVector, EmbeddingError>> + Send;

    /// Runs one throwaway embedding so the first real request does not pay model load time.
    fn warm_up(&self) -> impl Future<Output = Result<(), EmbeddingError>> + Send {
        async move {
            let blank = PreparedImage::blank(WARM_UP_IMAGE_SIZE).map_err(|e| {
                EmbeddingError::InvalidInput {
                    reason: e.to_string(),
                }
            })?;
            self.embed(&blank).await.map(|_| ())
        }
    }
}

/// Rejects empty or non-finite vectors before they reach a cache.
pub(crate) fn validate_vector(
    values: Vec<f32>,
    expected_dim: Option<usize>,
) -> Result<EmbeddingVector, EmbeddingError> {
    if values.is_empty() {
        return Err(EmbeddingError::InvalidResponse {
            reason: "embedding is empty".to_string(),
        });
    }

    if let Some(expected) = expected_dim
        && values.len() != expected
    {
        return Err(EmbeddingError::InvalidResponse {
            reason: format!(
                "embedding dimension mismatch: expected {}, got {}",
                expected,
                values.len()
            ),
        });
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(EmbeddingError::InvalidResponse {
            reason: "embedding contains non-finite values".to_string(),
        });
    }

    Ok(EmbeddingVector::new(values))
}
