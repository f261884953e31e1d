//! Cross-cutting, shared constants.
//!
//! Every numeric parameter of the comparison pipeline lives here. Changing any of them
//! changes comparison output, so cached results from a previous build are not comparable.

/// Default capacity of both the embedding cache and the result cache.
pub const CACHE_MAX_SIZE: usize = 100;

/// Embedding length produced by Facenet512.
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// Model name reported when no other is configured.
pub const DEFAULT_MODEL_NAME: &str = "Facenet512";

/// Cosine distance threshold reported for Facenet512.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.30;

/// Metric label carried on every comparison result.
pub const METRIC_COSINE: &str = "cosine";

/// Number of matches returned by a search when the caller does not ask otherwise.
pub const DEFAULT_SEARCH_TOP_K: usize = 3;

/// Corpus records prepared concurrently during a search.
pub const DEFAULT_SEARCH_CONCURRENCY: usize = 4;

// Classifier

/// Mean HSV saturation (0-255 scale) below which an image may be a sketch.
pub const SKETCH_MAX_SATURATION: f64 = 35.0;

/// Fraction of edge pixels above which an image may be a sketch.
pub const SKETCH_MIN_EDGE_DENSITY: f64 = 0.04;

/// Canny thresholds used by the classifier.
pub const CLASSIFIER_CANNY_LOW: f32 = 100.0;
pub const CLASSIFIER_CANNY_HIGH: f32 = 200.0;

// Normalizer

/// Side length of the square canvas every image is fitted into.
pub const CANVAS_SIZE: u32 = 512;

/// Border color used to pad images to a square canvas.
pub const CANVAS_PADDING: [u8; 3] = [255, 255, 255];

/// Gaussian sigma applied to photos before edge extraction.
pub const PHOTO_DENOISE_SIGMA: f32 = 1.0;

/// Canny thresholds used to extract the photo edge map.
pub const PHOTO_CANNY_LOW: f32 = 50.0;
pub const PHOTO_CANNY_HIGH: f32 = 150.0;

/// Weight of the inverted edge map when blended into a photo.
pub const PHOTO_EDGE_BLEND: f32 = 0.30;

/// Median filter radius applied to sketches.
pub const SKETCH_MEDIAN_RADIUS: u32 = 1;

/// Side length of the blank image embedded during provider warm-up.
pub const WARM_UP_IMAGE_SIZE: u32 = 224;

/// Similarity above which a comparison counts as a verified match.
pub const VERIFIED_MIN_SIMILARITY: f64 = 0.55;

// Search

/// Lowest minimum similarity derived from a caller-supplied search threshold.
pub const SEARCH_MIN_SIMILARITY_FLOOR: f64 = 0.30;

/// Factor applied to a caller-supplied search threshold; sketches rarely score high.
pub const SEARCH_THRESHOLD_LENIENCY: f64 = 0.6;
