use serde::{Deserialize, Serialize};

use super::confidence::{Confidence, ConfidenceLevel};
use crate::constants::{METRIC_COSINE, VERIFIED_MIN_SIMILARITY};
use crate::imaging::ImageDomain;

/// Outcome of one pairwise comparison, as returned to callers and stored in the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub distance: f64,
    pub similarity: f64,
    /// `similarity > 0.55`; always false for a failed comparison.
    #[serde(default)]
    pub verified: bool,
    pub is_cross_domain: bool,
    pub probe_domain: Option<ImageDomain>,
    pub reference_domain: Option<ImageDomain>,
    pub confidence_level: ConfidenceLevel,
    pub confidence_score: u8,
    pub match_quality: String,
    pub model_used: String,
    pub metric_used: String,
    /// Seconds, rounded to milliseconds.
    pub processing_time: f64,
    pub from_cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComparisonResult {
    pub fn scored(
        similarity: f64,
        distance: f64,
        probe_domain: ImageDomain,
        reference_domain: ImageDomain,
        confidence: Confidence,
        model_used: &str,
    ) -> Self {
        Self {
            distance,
            similarity,
            verified: similarity > VERIFIED_MIN_SIMILARITY,
            is_cross_domain: probe_domain != reference_domain,
            probe_domain: Some(probe_domain),
            reference_domain: Some(reference_domain),
            confidence_level: confidence.level,
            confidence_score: confidence.score,
            match_quality: confidence.match_quality.to_string(),
            model_used: model_used.to_string(),
            metric_used: METRIC_COSINE.to_string(),
            processing_time: 0.0,
            from_cache: false,
            error: None,
        }
    }

    /// Sentinel for a comparison that could not be completed.
    pub fn failed<E: std::fmt::Display>(error: E) -> Self {
        let confidence = Confidence::error();
        Self {
            distance: 1.0,
            similarity: 0.0,
            verified: false,
            is_cross_domain: false,
            probe_domain: None,
            reference_domain: None,
            confidence_level: confidence.level,
            confidence_score: confidence.score,
            match_quality: confidence.match_quality.to_string(),
            model_used: "failed".to_string(),
            metric_used: METRIC_COSINE.to_string(),
            processing_time: 0.0,
            from_cache: false,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.confidence_level == ConfidenceLevel::Error
    }

    pub fn with_processing_time(mut self, seconds: f64) -> Self {
        self.processing_time = round_millis(seconds);
        self
    }

    pub fn with_from_cache(mut self, from_cache: bool) -> Self {
        self.from_cache = from_cache;
        self
    }
}

#[inline]
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}
