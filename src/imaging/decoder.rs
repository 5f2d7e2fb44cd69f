//! HEIC/HEIF decoding behind a trait.
//!
//! [`HeifDecoder`] is the seam between request handling and the actual
//! codec. The production implementation is [`LibheifDecoder`], backed by
//! the libheif C library via `libheif-rs`; tests substitute the mock from
//! [`tests`] so conversion logic runs without the system library.

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The container could not be parsed at all — truncated, corrupt, or
    /// not actually HEIF despite the sniffed brand.
    #[error("could not read HEIF container: {0}")]
    Container(String),
    /// The container parsed but the image payload did not decode.
    #[error("could not decode image data: {0}")]
    Codec(String),
}

/// Decodes a HEIC/HEIF byte buffer into an in-memory raster.
///
/// Implementations must be cheap to share across requests; all per-call
/// state lives in the method body.
pub trait HeifDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError>;
}

/// Production decoder backed by libheif.
///
/// Decodes the primary image of the container (iPhone HEICs are often
/// multi-image files; the primary is the photo the user sees). Alpha is
/// preserved when the handle carries an alpha channel — the encoder side
/// decides what to do with it per target format.
pub struct LibheifDecoder;

impl HeifDecoder for LibheifDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        let ctx = HeifContext::read_from_bytes(bytes)
            .map_err(|e| DecodeError::Container(e.to_string()))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| DecodeError::Container(e.to_string()))?;

        let has_alpha = handle.has_alpha_channel();
        let chroma = if has_alpha {
            RgbChroma::Rgba
        } else {
            RgbChroma::Rgb
        };

        let lib_heif = LibHeif::new();
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(|e| DecodeError::Codec(e.to_string()))?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| DecodeError::Codec("decoder produced no interleaved plane".into()))?;

        let width = plane.width;
        let height = plane.height;
        let channels: usize = if has_alpha { 4 } else { 3 };
        let row_bytes = width as usize * channels;

        // The stride can exceed width * channels (row padding), so copy
        // row by row rather than taking the buffer whole.
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * plane.stride;
            let end = start + row_bytes;
            if end > plane.data.len() {
                return Err(DecodeError::Codec("decoded plane is truncated".into()));
            }
            pixels.extend_from_slice(&plane.data[start..end]);
        }

        let image = if has_alpha {
            RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| DecodeError::Codec("decoded plane has unexpected length".into()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock decoder that serves queued results in FIFO order and records
    /// the byte length of every call. Mutex so it is Sync and can sit in
    /// shared state during router tests.
    #[derive(Default)]
    pub struct MockDecoder {
        results: Mutex<VecDeque<Result<DynamicImage, DecodeError>>>,
        pub calls: Mutex<Vec<usize>>,
    }

    impl MockDecoder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue results to hand out, first-queued first-served.
        pub fn with_results(results: Vec<Result<DynamicImage, DecodeError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Shorthand: every call succeeds with a solid-color raster of the
        /// given size.
        pub fn always(width: u32, height: u32, count: usize) -> Self {
            Self::with_results(
                (0..count)
                    .map(|_| Ok(crate::test_helpers::rgb_fixture(width, height)))
                    .collect(),
            )
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl HeifDecoder for MockDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
            self.calls.lock().unwrap().push(bytes.len());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DecodeError::Codec("no mock result queued".into())))
        }
    }

    #[test]
    fn mock_serves_results_in_order() {
        let mock = MockDecoder::with_results(vec![
            Ok(crate::test_helpers::rgb_fixture(2, 3)),
            Err(DecodeError::Codec("boom".into())),
        ]);

        let first = mock.decode(b"aa").unwrap();
        assert_eq!((first.width(), first.height()), (2, 3));
        assert!(mock.decode(b"bbb").is_err());
        assert_eq!(*mock.calls.lock().unwrap(), vec![2, 3]);
    }

    #[test]
    fn mock_fails_when_queue_is_empty() {
        let mock = MockDecoder::new();
        let err = mock.decode(b"x").unwrap_err();
        assert!(matches!(err, DecodeError::Codec(_)));
    }

    #[test]
    fn libheif_rejects_garbage() {
        let err = LibheifDecoder.decode(b"definitely not heif").unwrap_err();
        assert!(matches!(err, DecodeError::Container(_)));
    }
}
