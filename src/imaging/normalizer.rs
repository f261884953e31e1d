//! Cross-domain normalization.
//!
//! Both images of a comparison go through the same canvas fit, luminance conversion and
//! histogram equalization. The domain strategy then pulls them toward each other: photos
//! get their edge structure blended back in so they look more like drawings, sketches are
//! only smoothed. Every parameter is a constant so identical bytes always produce
//! identical output bytes.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use tracing::{debug, warn};

use super::decode;
use super::error::DecodeError;
use super::types::ImageDomain;
use crate::constants::{
    CANVAS_PADDING, CANVAS_SIZE, PHOTO_CANNY_HIGH, PHOTO_CANNY_LOW, PHOTO_DENOISE_SIGMA,
    PHOTO_EDGE_BLEND, SKETCH_MEDIAN_RADIUS,
};
use crate::hashing::ContentKey;

/// Domain-specific refinement applied to the equalized luminance image.
pub trait Preprocessing: Send + Sync {
    fn domain(&self) -> ImageDomain;

    fn normalize(&self, luminance: &GrayImage) -> GrayImage;
}

/// Edge-preserving smoothing only.
#[derive(Debug, Clone, Copy)]
pub struct SketchPreprocessing {
    pub median_radius: u32,
}

impl Default for SketchPreprocessing {
    fn default() -> Self {
        Self {
            median_radius: SKETCH_MEDIAN_RADIUS,
        }
    }
}

impl Preprocessing for SketchPreprocessing {
    fn domain(&self) -> ImageDomain {
        ImageDomain::Sketch
    }

    fn normalize(&self, luminance: &GrayImage) -> GrayImage {
        median_filter(luminance, self.median_radius, self.median_radius)
    }
}

/// Denoise, extract edges, invert, blend the edge map back into the photo.
#[derive(Debug, Clone, Copy)]
pub struct PhotoPreprocessing {
    pub denoise_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Weight of the inverted edge map in the output, in `[0, 1]`.
    pub edge_blend: f32,
}

impl Default for PhotoPreprocessing {
    fn default() -> Self {
        Self {
            denoise_sigma: PHOTO_DENOISE_SIGMA,
            canny_low: PHOTO_CANNY_LOW,
            canny_high: PHOTO_CANNY_HIGH,
            edge_blend: PHOTO_EDGE_BLEND,
        }
    }
}

impl Preprocessing for PhotoPreprocessing {
    fn domain(&self) -> ImageDomain {
        ImageDomain::Photo
    }

    fn normalize(&self, luminance: &GrayImage) -> GrayImage {
        let denoised = gaussian_blur_f32(luminance, self.denoise_sigma);
        let mut edges = canny(&denoised, self.canny_low, self.canny_high);
        image::imageops::invert(&mut edges);
        blend(luminance, &edges, self.edge_blend)
    }
}

fn blend(base: &GrayImage, overlay: &GrayImage, weight: f32) -> GrayImage {
    let keep = 1.0 - weight;
    GrayImage::from_fn(base.width(), base.height(), |x, y| {
        let b = f32::from(base.get_pixel(x, y).0[0]);
        let o = f32::from(overlay.get_pixel(x, y).0[0]);
        Luma([(keep * b + weight * o).round().clamp(0.0, 255.0) as u8])
    })
}

/// Image ready for the embedding provider.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    bytes: Vec<u8>,
    domain: ImageDomain,
    source: ContentKey,
    degraded: bool,
}

impl PreparedImage {
    /// PNG bytes of the normalized image, or the original bytes if normalization degraded.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn domain(&self) -> ImageDomain {
        self.domain
    }

    /// Content key of the bytes this image was prepared from.
    #[inline]
    pub fn source(&self) -> ContentKey {
        self.source
    }

    /// `true` when the input could not be decoded and is passed through unchanged.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// A uniform mid-gray square, used to warm up providers.
    pub fn blank(size: u32) -> Result<Self, DecodeError> {
        let image = RgbImage::from_pixel(size, size, Rgb([128, 128, 128]));
        let bytes = encode_png(&image)?;
        Ok(Self {
            source: ContentKey::of(&bytes),
            bytes,
            domain: ImageDomain::Photo,
            degraded: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CrossDomainNormalizer {
    canvas_size: u32,
    padding: [u8; 3],
    sketch: SketchPreprocessing,
    photo: PhotoPreprocessing,
}

impl Default for CrossDomainNormalizer {
    fn default() -> Self {
        Self {
            canvas_size: CANVAS_SIZE,
            padding: CANVAS_PADDING,
            sketch: SketchPreprocessing::default(),
            photo: PhotoPreprocessing::default(),
        }
    }
}

impl CrossDomainNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// The refinement strategy applied to images of `domain`.
    pub fn strategy(&self, domain: ImageDomain) -> &dyn Preprocessing {
        match domain {
            ImageDomain::Sketch => &self.sketch,
            ImageDomain::Photo => &self.photo,
        }
    }

    /// Normalizes `bytes`, passing them through unchanged if they cannot be decoded.
    pub fn normalize(&self, bytes: &[u8], domain: ImageDomain) -> PreparedImage {
        match self.try_normalize(bytes, domain) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(error = %e, domain = %domain, "Normalization failed, using original bytes");
                PreparedImage {
                    bytes: bytes.to_vec(),
                    domain,
                    source: ContentKey::of(bytes),
                    degraded: true,
                }
            }
        }
    }

    pub fn try_normalize(
        &self,
        bytes: &[u8],
        domain: ImageDomain,
    ) -> Result<PreparedImage, DecodeError> {
        let image = decode(bytes)?;
        let normalized = self.normalize_image(&image, domain)?;
        let png = encode_png(&normalized)?;

        debug!(
            domain = %domain,
            original = format!("{}x{}", image.width(), image.height()),
            output_bytes = png.len(),
            "Image normalized"
        );

        Ok(PreparedImage {
            bytes: png,
            domain,
            source: ContentKey::of(bytes),
            degraded: false,
        })
    }

    /// Pixel-level pipeline: fit, luminance, equalize, domain strategy, back to RGB.
    pub fn normalize_image(
        &self,
        image: &DynamicImage,
        domain: ImageDomain,
    ) -> Result<RgbImage, DecodeError> {
        let canvas = self.fit_to_canvas(&image.to_rgb8())?;
        let luminance = image::imageops::grayscale(&canvas);
        let equalized = equalize_histogram(&luminance);
        let refined = self.strategy(domain).normalize(&equalized);

        Ok(DynamicImage::ImageLuma8(refined).to_rgb8())
    }

    /// Resizes to fit inside the canvas, preserving aspect ratio, and centers on padding.
    pub fn fit_to_canvas(&self, image: &RgbImage) -> Result<RgbImage, DecodeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::ZeroSized { width, height });
        }

        let target = self.canvas_size;
        let (content_w, content_h) = compute_fit_dimensions(width, height, target);
        let resized = image::imageops::resize(image, content_w, content_h, FilterType::Lanczos3);

        let mut canvas = RgbImage::from_pixel(target, target, Rgb(self.padding));
        let offset_x = (target - content_w) / 2;
        let offset_y = (target - content_h) / 2;
        image::imageops::overlay(
            &mut canvas,
            &resized,
            i64::from(offset_x),
            i64::from(offset_y),
        );

        Ok(canvas)
    }
}

/// Largest `(w, h)` with the input's aspect ratio that fits inside `target x target`.
pub fn compute_fit_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let longest = width.max(height).max(1);
    let scale = f64::from(target) / f64::from(longest);
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, target);
    (fit(width), fit(height))
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|source| DecodeError::Encode { source })?;
    Ok(buf)
}
