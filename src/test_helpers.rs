//! Shared fixture builders for the heifbox test suite.
//!
//! Provides byte-level container fixtures (ISO-BMFF `ftyp` boxes, tiny real
//! PNG/JPEG files) and in-memory images, shaped the way the conversion
//! pipeline consumes them.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let upload = heif_bytes();
//! let renamed_mp4 = heif_bytes_with_brand(b"isom", &[b"iso2", b"mp41"]);
//! let image = rgb_fixture(8, 8);
//! ```

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgb, RgbImage};

// =========================================================================
// Container fixtures
// =========================================================================

/// A minimal HEIC upload: `ftyp` box with major brand `heic`, followed by
/// filler standing in for the rest of the container.
pub fn heif_bytes() -> Vec<u8> {
    heif_bytes_with_brand(b"heic", &[b"mif1"])
}

/// An `ftyp` box with the given major and compatible brands, plus trailing
/// filler. The box size field is consistent with the brand list, so tests
/// that need a malformed size overwrite bytes 0-3 afterwards.
pub fn heif_bytes_with_brand(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
    let box_size = 16 + 4 * compatible.len() as u32;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&box_size.to_be_bytes());
    bytes.extend_from_slice(b"ftyp");
    bytes.extend_from_slice(major);
    bytes.extend_from_slice(&0u32.to_be_bytes()); // minor version
    for brand in compatible {
        bytes.extend_from_slice(*brand);
    }
    bytes.extend_from_slice(&[0u8; 32]); // stand-in for mdat and friends
    bytes
}

/// A real (tiny) PNG file.
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    rgb_fixture(4, 4)
        .write_with_encoder(PngEncoder::new(Cursor::new(&mut buf)))
        .unwrap();
    buf
}

/// A real (tiny) JPEG file.
pub fn jpeg_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    rgb_fixture(4, 4)
        .write_with_encoder(JpegEncoder::new(Cursor::new(&mut buf)))
        .unwrap();
    buf
}

// =========================================================================
// Image fixtures
// =========================================================================

/// An RGB gradient image of the given dimensions. The gradient makes
/// off-by-one pixel errors visible in encode round-trips.
pub fn rgb_fixture(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    DynamicImage::ImageRgb8(image)
}
