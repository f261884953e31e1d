//! Sketch vs. photo classification from two image statistics.
//!
//! A hand-drawn sketch is nearly colorless and dense in strokes, so it shows both a low
//! mean HSV saturation and a high proportion of edge pixels. Both tests must pass; a
//! desaturated portrait photo has too few edges, and a busy color photo is too saturated.

use image::{DynamicImage, RgbImage};
use imageproc::edges::canny;
use tracing::{debug, warn};

use super::error::DecodeError;
use super::types::ImageDomain;
use super::decode;
use crate::constants::{
    CLASSIFIER_CANNY_HIGH, CLASSIFIER_CANNY_LOW, SKETCH_MAX_SATURATION, SKETCH_MIN_EDGE_DENSITY,
};

/// Decision thresholds. Both images of a comparison must be classified with the same values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    /// Mean saturation (0-255) must be strictly below this.
    pub max_saturation: f64,
    /// Edge-pixel fraction must be strictly above this.
    pub min_edge_density: f64,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            max_saturation: SKETCH_MAX_SATURATION,
            min_edge_density: SKETCH_MIN_EDGE_DENSITY,
            canny_low: CLASSIFIER_CANNY_LOW,
            canny_high: CLASSIFIER_CANNY_HIGH,
        }
    }
}

/// Statistics measured on one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub domain: ImageDomain,
    pub mean_saturation: f64,
    pub edge_density: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ImageClassifier {
    thresholds: ClassifierThresholds,
}

impl ImageClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Classifies raw bytes. Undecodable input is reported as a photo so it takes the
    /// photo preprocessing path.
    pub fn classify(&self, bytes: &[u8]) -> ImageDomain {
        match self.try_classify(bytes) {
            Ok(classification) => classification.domain,
            Err(e) => {
                warn!(error = %e, "Classification failed, treating input as a photo");
                ImageDomain::Photo
            }
        }
    }

    pub fn try_classify(&self, bytes: &[u8]) -> Result<Classification, DecodeError> {
        let image = decode(bytes)?;
        Ok(self.classify_image(&image))
    }

    pub fn classify_image(&self, image: &DynamicImage) -> Classification {
        let rgb = image.to_rgb8();
        let mean_saturation = mean_saturation(&rgb);
        let edge_density = self.edge_density(image);

        let domain = if mean_saturation < self.thresholds.max_saturation
            && edge_density > self.thresholds.min_edge_density
        {
            ImageDomain::Sketch
        } else {
            ImageDomain::Photo
        };

        debug!(
            mean_saturation,
            edge_density,
            domain = %domain,
            "Classified image"
        );

        Classification {
            domain,
            mean_saturation,
            edge_density,
        }
    }

    fn edge_density(&self, image: &DynamicImage) -> f64 {
        let gray = image.to_luma8();
        let total = u64::from(gray.width()) * u64::from(gray.height());
        if total == 0 {
            return 0.0;
        }

        let edges = canny(&gray, self.thresholds.canny_low, self.thresholds.canny_high);
        let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count() as u64;

        edge_pixels as f64 / total as f64
    }
}

/// Mean HSV saturation on the 0-255 scale: `S = (max - min) / max * 255`, 0 for black.
pub fn mean_saturation(image: &RgbImage) -> f64 {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return 0.0;
    }

    let sum: f64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            if max == 0 {
                0.0
            } else {
                f64::from(max - min) * 255.0 / f64::from(max)
            }
        })
        .sum();

    sum / total as f64
}
