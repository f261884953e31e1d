//! Image embedder with a remote backend and a deterministic stub backend.
//!
//! Use [`EmbedderConfig::stub`] for tests and local runs without an embedding service.
//! The stub is not a face model: it embeds a coarse luminance thumbnail, which is enough
//! for identical images to score 1.0 and unrelated ones to score lower.

use image::imageops::FilterType;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::imaging::{PreparedImage, decode};

use super::config::EmbedderConfig;
use super::error::EmbeddingError;
use super::provider::{EmbeddingProvider, EmbeddingVector, validate_vector};

/// Thumbnail grid used by the stub backend; `STUB_GRID_W * STUB_GRID_H` values.
pub const STUB_GRID_W: u32 = 16;
pub const STUB_GRID_H: u32 = 32;

enum EmbedderBackend {
    Remote {
        client: reqwest::Client,
        endpoint: String,
    },
    Stub,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding provider used by the server (supports stub mode).
pub struct ImageEmbedder {
    backend: EmbedderBackend,
    config: EmbedderConfig,
}

impl std::fmt::Debug for ImageEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Remote { endpoint, .. } => format!("Remote({})", endpoint),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("model_name", &self.config.model_name)
            .field("distance_threshold", &self.config.distance_threshold)
            .finish()
    }
}

impl ImageEmbedder {
    /// Builds the embedder from a config (stub mode is supported).
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let endpoint = config
            .endpoint
            .as_deref()
            .map(|url| url.trim().to_string())
            .ok_or_else(|| EmbeddingError::InvalidConfig {
                reason: "endpoint is required (stubbing is disabled)".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        info!(
            endpoint = %endpoint,
            model = %config.model_name,
            timeout_secs = config.timeout.as_secs(),
            "Remote embedder configured"
        );

        Ok(Self {
            backend: EmbedderBackend::Remote { client, endpoint },
            config,
        })
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    async fn embed_remote(
        &self,
        client: &reqwest::Client,
        endpoint: &str,
        image: &PreparedImage,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        debug!(
            bytes = image.bytes().len(),
            domain = %image.domain(),
            degraded = image.is_degraded(),
            "Requesting remote embedding"
        );

        let response = client
            .post(endpoint)
            .query(&[("model", self.config.model_name.as_str())])
            .header(CONTENT_TYPE, "image/png")
            .body(image.bytes().to_vec())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::NoFaceDetected { reason: body });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("provider returned {}: {}", status, body),
            });
        }

        let parsed: EmbedResponse = response.json().await?;
        validate_vector(parsed.embedding, self.config.embedding_dim)
    }

    async fn embed_stub(&self, image: &PreparedImage) -> Result<EmbeddingVector, EmbeddingError> {
        debug!(bytes = image.bytes().len(), "Generating stub embedding");

        let bytes = image.bytes().to_vec();
        let values = tokio::task::spawn_blocking(move || stub_embedding(&bytes))
            .await
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("stub embedding task failed: {}", e),
            })??;

        validate_vector(values, None)
    }
}

impl EmbeddingProvider for ImageEmbedder {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn distance_threshold(&self) -> f64 {
        self.config.distance_threshold
    }

    async fn embed(&self, image: &PreparedImage) -> Result<EmbeddingVector, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Remote { client, endpoint } => {
                self.embed_remote(client, endpoint, image).await
            }
            EmbedderBackend::Stub => self.embed_stub(image).await,
        }
    }
}

/// Mean-centered, L2-normalized luminance thumbnail. Uniform images yield a zero vector.
pub fn stub_embedding(bytes: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    let image = decode(bytes).map_err(|e| EmbeddingError::InvalidInput {
        reason: e.to_string(),
    })?;

    let thumbnail = image::imageops::resize(
        &image.to_luma8(),
        STUB_GRID_W,
        STUB_GRID_H,
        FilterType::Triangle,
    );

    let mut values: Vec<f32> = thumbnail
        .pixels()
        .map(|p| f32::from(p.0[0]) / 255.0)
        .collect();

    let mean = values.iter().sum::<f32>() / values.len() as f32;
    for v in &mut values {
        *v -= mean;
    }

    let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut values {
            *v /= norm;
        }
    }

    Ok(values)
}
