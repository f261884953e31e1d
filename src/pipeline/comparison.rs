use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::error::ComparisonError;
use super::types::{ImageInput, PreparedEmbedding};
use crate::cache::{ComparisonCaches, EmbeddingKey, ResultKey};
use crate::embedding::EmbeddingProvider;
use crate::imaging::{CrossDomainNormalizer, DecodeError, ImageClassifier};
use crate::scoring::{ComparisonResult, classify_confidence, score_pair};

/// Classify → normalize → embed (cached) → score → classify confidence.
///
/// Cheap to clone; clones share the provider, the caches and the image stages.
pub struct ComparisonPipeline<P> {
    provider: Arc<P>,
    classifier: Arc<ImageClassifier>,
    normalizer: Arc<CrossDomainNormalizer>,
    caches: Arc<ComparisonCaches>,
}

impl<P> Clone for ComparisonPipeline<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            classifier: Arc::clone(&self.classifier),
            normalizer: Arc::clone(&self.normalizer),
            caches: Arc::clone(&self.caches),
        }
    }
}

impl<P> std::fmt::Debug for ComparisonPipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonPipeline")
            .field("caches", &self.caches.stats())
            .finish_non_exhaustive()
    }
}

impl<P: EmbeddingProvider> ComparisonPipeline<P> {
    pub fn new(provider: Arc<P>, caches: Arc<ComparisonCaches>) -> Self {
        Self {
            provider,
            classifier: Arc::new(ImageClassifier::new()),
            normalizer: Arc::new(CrossDomainNormalizer::new()),
            caches,
        }
    }

    pub fn with_classifier(mut self, classifier: ImageClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_normalizer(mut self, normalizer: CrossDomainNormalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn caches(&self) -> &ComparisonCaches {
        &self.caches
    }

    /// Compares two images using both caches. Never fails: see [`compare_with`](Self::compare_with).
    pub async fn compare(&self, a: &ImageInput, b: &ImageInput) -> ComparisonResult {
        self.compare_with(a, b, true).await
    }

    /// Compares two images. Any failure yields [`ComparisonResult::failed`].
    ///
    /// With `use_cache` false neither cache is read or written.
    pub async fn compare_with(
        &self,
        a: &ImageInput,
        b: &ImageInput,
        use_cache: bool,
    ) -> ComparisonResult {
        let start = Instant::now();
        match self.try_compare(a, b, use_cache).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Comparison failed");
                ComparisonResult::failed(&e).with_processing_time(start.elapsed().as_secs_f64())
            }
        }
    }

    #[instrument(skip(self, a, b), fields(a_len = a.bytes.len(), b_len = b.bytes.len()))]
    pub async fn try_compare(
        &self,
        a: &ImageInput,
        b: &ImageInput,
        use_cache: bool,
    ) -> Result<ComparisonResult, ComparisonError> {
        let start = Instant::now();

        let result_key = if use_cache {
            match (a.key(), b.key()) {
                (Ok(ka), Ok(kb)) => Some(ResultKey::new(ka, a.hint, kb, b.hint)),
                (Err(e), _) | (_, Err(e)) => {
                    debug!(error = %e, "Bypassing result cache");
                    None
                }
            }
        } else {
            None
        };

        if let Some(key) = &result_key
            && let Some(cached) = self.caches.results().get(key)
        {
            debug!(
                a = %key.first.short(),
                b = %key.second.short(),
                "Result cache hit"
            );
            return Ok(cached
                .with_from_cache(true)
                .with_processing_time(start.elapsed().as_secs_f64()));
        }

        let (first, second) =
            tokio::try_join!(self.prepare(a, use_cache), self.prepare(b, use_cache))?;
        let result = self
            .score(&first, &second)
            .with_processing_time(start.elapsed().as_secs_f64());

        debug!(
            distance = result.distance,
            similarity = result.similarity,
            cross_domain = result.is_cross_domain,
            confidence = %result.confidence_level,
            "Comparison scored"
        );

        if let Some(key) = result_key {
            self.caches.results().insert(key, result.clone());
        }

        Ok(result)
    }

    /// Classifies, normalizes and embeds one input.
    ///
    /// Empty input fails. Undecodable input is classified as a photo and passed to the
    /// provider unchanged; whether that succeeds is up to the provider.
    pub async fn prepare(
        &self,
        input: &ImageInput,
        use_cache: bool,
    ) -> Result<PreparedEmbedding, ComparisonError> {
        if input.bytes.is_empty() {
            return Err(DecodeError::Empty.into());
        }

        let bytes = input.bytes.clone();
        let hint = input.hint;
        let classifier = Arc::clone(&self.classifier);
        let normalizer = Arc::clone(&self.normalizer);

        let prepared = tokio::task::spawn_blocking(move || {
            let domain = hint
                .forced()
                .unwrap_or_else(|| classifier.classify(&bytes));
            normalizer.normalize(&bytes, domain)
        })
        .await?;

        let domain = prepared.domain();
        let key = match input.key() {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(error = %e, "Bypassing embedding cache");
                None
            }
        };

        let (vector, cached) = match key.filter(|_| use_cache) {
            Some(content) => {
                self.caches
                    .embeddings()
                    .get_or_try_compute(EmbeddingKey::new(content, domain), || {
                        self.provider.embed(&prepared)
                    })
                    .await?
            }
            None => (self.provider.embed(&prepared).await?, false),
        };

        debug!(
            domain = %domain,
            cached,
            degraded = prepared.is_degraded(),
            dim = vector.len(),
            "Input prepared"
        );

        Ok(PreparedEmbedding {
            vector,
            domain,
            key,
            cached,
            degraded: prepared.is_degraded(),
        })
    }

    /// Scores two prepared inputs. `processing_time` is left at zero.
    pub fn score(
        &self,
        probe: &PreparedEmbedding,
        reference: &PreparedEmbedding,
    ) -> ComparisonResult {
        let (similarity, distance) =
            score_pair(probe.vector.as_slice(), reference.vector.as_slice());
        let confidence = classify_confidence(
            distance,
            self.provider.distance_threshold(),
            probe.domain != reference.domain,
        );

        ComparisonResult::scored(
            similarity,
            distance,
            probe.domain,
            reference.domain,
            confidence,
            self.provider.model_name(),
        )
    }
}
