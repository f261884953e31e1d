use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::constants::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MODEL_NAME};
use crate::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingVector};
use crate::hashing::ContentKey;
use crate::imaging::PreparedImage;

/// Scripted provider keyed by the content key of the *original* input bytes.
///
/// Inputs do not need to be decodable images; undecodable bytes degrade through the
/// normalizer and keep their source key.
#[derive(Clone)]
pub struct MockEmbeddingProvider {
    inner: Arc<MockState>,
    model_name: String,
    distance_threshold: f64,
}

#[derive(Default)]
struct MockState {
    vectors: RwLock<HashMap<ContentKey, Vec<f32>>>,
    failures: RwLock<HashSet<ContentKey>>,
    fallback: RwLock<Option<Vec<f32>>>,
    calls: AtomicUsize,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self {
            inner: Arc::new(MockState::default()),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(self, bytes: &[u8], vector: Vec<f32>) -> Self {
        self.set_vector(bytes, vector);
        self
    }

    /// Makes `bytes` fail with [`EmbeddingError::NoFaceDetected`].
    pub fn with_failure(self, bytes: &[u8]) -> Self {
        self.set_failure(bytes);
        self
    }

    /// Vector returned for inputs with no scripted vector.
    pub fn with_fallback(self, vector: Vec<f32>) -> Self {
        *self.inner.fallback.write() = Some(vector);
        self
    }

    pub fn with_model_name<S: Into<String>>(mut self, name: S) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    pub fn set_vector(&self, bytes: &[u8], vector: Vec<f32>) {
        self.inner
            .vectors
            .write()
            .insert(ContentKey::of(bytes), vector);
    }

    pub fn set_failure(&self, bytes: &[u8]) {
        self.inner.failures.write().insert(ContentKey::of(bytes));
    }

    /// Number of `embed` calls so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbeddingProvider")
            .field("model_name", &self.model_name)
            .field("vectors", &self.inner.vectors.read().len())
            .field("calls", &self.calls())
            .finish()
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    async fn embed(&self, image: &PreparedImage) -> Result<EmbeddingVector, EmbeddingError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);

        let key = image.source();
        if self.inner.failures.read().contains(&key) {
            return Err(EmbeddingError::NoFaceDetected {
                reason: format!("scripted failure for {}", key.short()),
            });
        }

        if let Some(vector) = self.inner.vectors.read().get(&key) {
            return Ok(EmbeddingVector::new(vector.clone()));
        }

        match self.inner.fallback.read().as_ref() {
            Some(vector) => Ok(EmbeddingVector::new(vector.clone())),
            None => Err(EmbeddingError::InferenceFailed {
                reason: format!("no scripted vector for {}", key.short()),
            }),
        }
    }
}
