//! Image classification and cross-domain normalization.
//!
//! - [`classifier`] decides whether an input is a sketch or a photo.
//! - [`normalizer`] maps both onto a common canvas and pushes them toward each other.
//!
//! Everything here is CPU-bound and synchronous; async callers should run it on a
//! blocking thread.

pub mod classifier;
mod error;
pub mod normalizer;
pub mod types;


pub use classifier::{Classification, ClassifierThresholds, ImageClassifier, mean_saturation};
pub use error::DecodeError;
pub use normalizer::{
    CrossDomainNormalizer, PhotoPreprocessing, PreparedImage, Preprocessing, SketchPreprocessing,
    compute_fit_dimensions,
};
pub use types::{DomainHint, ImageDomain, ParseDomainError};

use image::DynamicImage;

/// Decodes an image from memory, guessing the format from its magic bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    image::load_from_memory(bytes).map_err(|source| DecodeError::Unreadable { source })
}
