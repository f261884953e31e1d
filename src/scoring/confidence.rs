//! Distance → confidence bucket.
//!
//! Two separate ladders. Same-domain comparisons scale with the model's baseline
//! threshold; sketch-vs-photo comparisons use fixed, looser cut-offs because the
//! domain gap alone pushes distances up. All boundaries are inclusive.

use serde::{Deserialize, Serialize};

/// Cross-domain cut-offs, tightest first.
pub const CROSS_DOMAIN_POSSIBLE: f64 = 0.30;
pub const CROSS_DOMAIN_WEAK: f64 = 0.45;
pub const CROSS_DOMAIN_UNCERTAIN: f64 = 0.60;

/// Same-domain cut-offs as fractions of the model threshold.
pub const SAME_DOMAIN_HIGH_FACTOR: f64 = 0.5;
pub const SAME_DOMAIN_MEDIUM_FACTOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
    PossibleMatch,
    WeakMatch,
    Uncertain,
    Unlikely,
    Error,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very_low",
            ConfidenceLevel::PossibleMatch => "possible_match",
            ConfidenceLevel::WeakMatch => "weak_match",
            ConfidenceLevel::Uncertain => "uncertain",
            ConfidenceLevel::Unlikely => "unlikely",
            ConfidenceLevel::Error => "error",
        }
    }

    /// Score in `0..=100` reported alongside the level.
    pub fn score(&self) -> u8 {
        match self {
            ConfidenceLevel::High => 95,
            ConfidenceLevel::Medium => 80,
            ConfidenceLevel::Low => 60,
            ConfidenceLevel::VeryLow => 30,
            ConfidenceLevel::PossibleMatch => 75,
            ConfidenceLevel::WeakMatch => 55,
            ConfidenceLevel::Uncertain => 35,
            ConfidenceLevel::Unlikely => 15,
            ConfidenceLevel::Error => 0,
        }
    }

    pub fn match_quality(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "Strong match",
            ConfidenceLevel::Medium => "Good match",
            ConfidenceLevel::Low => "Weak match",
            ConfidenceLevel::VeryLow => "No match",
            ConfidenceLevel::PossibleMatch => "Possible match - investigate further",
            ConfidenceLevel::WeakMatch => "Weak resemblance",
            ConfidenceLevel::Uncertain => "Inconclusive",
            ConfidenceLevel::Unlikely => "Unlikely match",
            ConfidenceLevel::Error => "Comparison failed",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub score: u8,
    pub match_quality: &'static str,
}

impl Confidence {
    pub fn from_level(level: ConfidenceLevel) -> Self {
        Self {
            level,
            score: level.score(),
            match_quality: level.match_quality(),
        }
    }

    pub fn error() -> Self {
        Self::from_level(ConfidenceLevel::Error)
    }
}

/// Buckets a cosine distance. `threshold` is the model baseline and only affects
/// same-domain comparisons.
pub fn classify_confidence(distance: f64, threshold: f64, cross_domain: bool) -> Confidence {
    let level = if cross_domain {
        if distance <= CROSS_DOMAIN_POSSIBLE {
            ConfidenceLevel::PossibleMatch
        } else if distance <= CROSS_DOMAIN_WEAK {
            ConfidenceLevel::WeakMatch
        } else if distance <= CROSS_DOMAIN_UNCERTAIN {
            ConfidenceLevel::Uncertain
        } else {
            ConfidenceLevel::Unlikely
        }
    } else if distance <= threshold * SAME_DOMAIN_HIGH_FACTOR {
        ConfidenceLevel::High
    } else if distance <= threshold * SAME_DOMAIN_MEDIUM_FACTOR {
        ConfidenceLevel::Medium
    } else if distance <= threshold {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::VeryLow
    };

    Confidence::from_level(level)
}
