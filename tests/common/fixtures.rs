use std::io::Cursor;
use std::sync::Arc;

use facefind::{ComparisonCaches, ComparisonPipeline, MockEmbeddingProvider};
use image::{ImageFormat, Rgb, RgbImage};

pub fn png(image: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode fixture image");
    buf
}

/// Black grid on white: colorless and edge-dense, so it classifies as a sketch.
pub fn sketch_png(cell: u32) -> Vec<u8> {
    png(&RgbImage::from_fn(96, 96, |x, y| {
        if x % cell < 2 || y % cell < 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    }))
}

/// Smooth saturated gradient, tinted by `shift`, so it classifies as a photo.
pub fn photo_png(shift: u8) -> Vec<u8> {
    png(&RgbImage::from_fn(96, 96, |x, y| {
        Rgb([(x * 2) as u8, (200 - y) as u8, 40u8.wrapping_add(shift)])
    }))
}

/// Unit vector at `degrees` from `[1, 0]`.
pub fn angled(degrees: f32) -> Vec<f32> {
    let rad = degrees.to_radians();
    vec![rad.cos(), rad.sin()]
}

pub fn mock_pipeline(
    mock: MockEmbeddingProvider,
    capacity: usize,
) -> ComparisonPipeline<MockEmbeddingProvider> {
    ComparisonPipeline::new(Arc::new(mock), Arc::new(ComparisonCaches::new(capacity)))
}
