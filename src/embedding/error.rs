use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("no face detected: {reason}")]
    NoFaceDetected { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("embedding provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("invalid provider response: {reason}")]
    InvalidResponse { reason: String },

    #[error("invalid embedding input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EmbeddingError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            EmbeddingError::ProviderUnavailable {
                reason: err.to_string(),
            }
        }
    }
}
