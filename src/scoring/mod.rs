//! Similarity and confidence scoring.
//!
//! Pure functions over embeddings and distances. Nothing here touches the caches or
//! the provider.

pub mod confidence;
pub mod similarity;
pub mod types;

#[cfg(test)]
mod tests;

pub use confidence::{Confidence, ConfidenceLevel, classify_confidence};
pub use similarity::{clamp_similarity, cosine_similarity, distance_from_similarity, score_pair};
pub use types::{ComparisonResult, round_millis};
