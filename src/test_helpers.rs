//! Shared test utilities for the phototone test suite.
//!
//! Small in-memory buffers for pixel-exact assertions, plus helpers that
//! encode real PNG bytes and write them to disk for backend and export
//! tests.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let buffer = solid_buffer(2, 2, [128, 128, 128, 255]);
//! assert_eq!(pixels_of(&buffer), vec![[128, 128, 128, 255]; 4]);
//! ```

use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::path::Path;

use crate::imaging::PixelBuffer;

// =========================================================================
// Buffers
// =========================================================================

/// A buffer with every pixel set to `pixel`.
pub fn solid_buffer(width: u32, height: u32, pixel: [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_image(RgbaImage::from_pixel(width, height, Rgba(pixel)))
}

/// The 2×1 buffer `[(10,0,0,255), (0,10,0,255)]` used by rotation tests.
pub fn two_by_one() -> PixelBuffer {
    let mut image = RgbaImage::new(2, 1);
    image.put_pixel(0, 0, Rgba([10, 0, 0, 255]));
    image.put_pixel(1, 0, Rgba([0, 10, 0, 255]));
    PixelBuffer::from_image(image)
}

/// A deterministic non-uniform image; every pixel differs from its neighbours.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 37 % 256) as u8,
            (y * 59 % 256) as u8,
            ((x + y) * 23 % 256) as u8,
            255,
        ])
    })
}

/// Pixels in row-major order.
pub fn pixels_of(buffer: &PixelBuffer) -> Vec<[u8; 4]> {
    buffer.image().pixels().map(|p| p.0).collect()
}

// =========================================================================
// Encoded fixtures
// =========================================================================

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    out
}

/// Write a PNG of `gradient_image(width, height)` to `path`.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_png(&gradient_image(width, height))).unwrap();
}
