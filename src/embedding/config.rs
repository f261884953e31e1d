use std::time::Duration;

use crate::constants::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MODEL_NAME};
use crate::embedding::error::EmbeddingError;

/// Default request timeout for the remote embedding service.
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
/// Configuration for [`ImageEmbedder`](super::ImageEmbedder).
pub struct EmbedderConfig {
    /// Endpoint of the embedding service. `None` outside stub mode is a config error.
    pub endpoint: Option<String>,
    /// Model name passed to the service and reported on results.
    pub model_name: String,
    /// Baseline cosine distance threshold for the model.
    pub distance_threshold: f64,
    /// Per-request timeout for the remote backend.
    pub timeout: Duration,
    /// Expected embedding length; responses of any other length are rejected.
    pub embedding_dim: Option<usize>,
    /// If true, run in deterministic stub mode (no embedding service required).
    pub testing_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
            embedding_dim: None,
            testing_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Creates a config for a remote embedding service.
    pub fn remote<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no service; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn model_name<S: Into<String>>(mut self, model_name: S) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = Some(dim);
        self
    }

    /// Validates required fields for the selected mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if !(self.distance_threshold > 0.0 && self.distance_threshold <= 1.0) {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "distance_threshold must be in (0, 1], got {}",
                    self.distance_threshold
                ),
            });
        }

        if self.model_name.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_name must not be empty".to_string(),
            });
        }

        if self.embedding_dim == Some(0) {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be positive".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        match self.endpoint.as_deref().map(str::trim) {
            None | Some("") => Err(EmbeddingError::InvalidConfig {
                reason: "endpoint is required (stubbing is disabled)".to_string(),
            }),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                Err(EmbeddingError::InvalidConfig {
                    reason: format!("endpoint must be an http(s) URL, got '{}'", url),
                })
            }
            Some(_) if self.timeout.is_zero() => Err(EmbeddingError::InvalidConfig {
                reason: "timeout must be positive".to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}
