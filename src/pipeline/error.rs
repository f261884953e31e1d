use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::imaging::DecodeError;

/// Why a single comparison could not be completed.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("image unusable: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Provider(#[from] EmbeddingError),

    #[error("preprocessing task failed: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for ComparisonError {
    fn from(err: tokio::task::JoinError) -> Self {
        ComparisonError::Worker(err.to_string())
    }
}
