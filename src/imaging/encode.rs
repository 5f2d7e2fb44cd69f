//! Raster → PNG/JPEG encoding at the fixed quality policy.
//!
//! JPEG has no alpha channel, so transparent rasters are composited onto a
//! white background first — the same treatment photo tools apply when
//! exporting screenshots or stickers to JPEG. PNG keeps alpha as-is.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use thiserror::Error;

use super::format::{JPEG_QUALITY, OutputFormat, PNG_COMPRESSION, PNG_FILTER};

#[derive(Debug, Error)]
#[error("encoding failed: {0}")]
pub struct EncodeError(#[from] image::ImageError);

/// Encode a decoded raster in the requested output format, returning the
/// complete file bytes.
pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Png => encode_png(image),
        OutputFormat::Jpeg => encode_jpeg(image),
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        Cursor::new(&mut buf),
        PNG_COMPRESSION,
        PNG_FILTER,
    );
    image.write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), JPEG_QUALITY);

    if image.color().has_alpha() {
        flatten_onto_white(&image.to_rgba8()).write_with_encoder(encoder)?;
    } else {
        image.write_with_encoder(encoder)?;
    }
    Ok(buf)
}

/// Alpha-composite onto a white background, weighting each channel by the
/// pixel's alpha. Fully transparent pixels come out white, fully opaque
/// ones keep their color.
fn flatten_onto_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        let a = p[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a)) / 255) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::rgb_fixture;
    use image::{GenericImageView, Rgba};

    #[test]
    fn png_output_decodes_as_png_with_same_dimensions() {
        let source = rgb_fixture(40, 25);
        let bytes = encode(&source, OutputFormat::Png).unwrap();

        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Png
        );
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (40, 25));
    }

    #[test]
    fn jpeg_output_decodes_as_jpeg_with_same_dimensions() {
        let source = rgb_fixture(33, 17);
        let bytes = encode(&source, OutputFormat::Jpeg).unwrap();

        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (33, 17));
    }

    #[test]
    fn jpeg_flattens_transparency_onto_white() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let bytes = encode(&DynamicImage::ImageRgba8(rgba), OutputFormat::Jpeg).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let p = decoded.get_pixel(2, 2);
        // JPEG is lossy; allow a little wiggle around pure white.
        assert!(p[0] > 250 && p[1] > 250 && p[2] > 250, "expected white, got {p:?}");
    }

    #[test]
    fn png_keeps_alpha_channel() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let bytes = encode(&DynamicImage::ImageRgba8(rgba), OutputFormat::Png).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn flatten_blends_partial_alpha() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&rgba);
        let p = flat.get_pixel(0, 0);
        // Half-transparent black over white lands near mid-grey.
        assert!((125..=130).contains(&p[0]), "got {p:?}");
    }
}
