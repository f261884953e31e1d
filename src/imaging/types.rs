use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which side of the sketch/photo gap an image sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDomain {
    Sketch,
    Photo,
}

impl ImageDomain {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDomain::Sketch => "sketch",
            ImageDomain::Photo => "photo",
        }
    }

    #[inline]
    pub fn is_sketch(&self) -> bool {
        matches!(self, ImageDomain::Sketch)
    }
}

impl fmt::Display for ImageDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller override for the classifier. `Auto` runs classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainHint {
    #[default]
    Auto,
    Sketch,
    Photo,
}

impl DomainHint {
    /// The forced domain, if any.
    #[inline]
    pub fn forced(&self) -> Option<ImageDomain> {
        match self {
            DomainHint::Auto => None,
            DomainHint::Sketch => Some(ImageDomain::Sketch),
            DomainHint::Photo => Some(ImageDomain::Photo),
        }
    }
}

impl From<ImageDomain> for DomainHint {
    fn from(domain: ImageDomain) -> Self {
        match domain {
            ImageDomain::Sketch => DomainHint::Sketch,
            ImageDomain::Photo => DomainHint::Photo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown image domain '{0}': expected auto, sketch or photo")]
pub struct ParseDomainError(pub String);

impl FromStr for DomainHint {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(DomainHint::Auto),
            "sketch" => Ok(DomainHint::Sketch),
            "photo" => Ok(DomainHint::Photo),
            _ => Err(ParseDomainError(s.to_string())),
        }
    }
}
