//! Output format policy: the two formats the service produces, and the
//! fixed quality settings used for each.
//!
//! Quality is deliberately not configurable per request. Every JPEG is
//! encoded at [`JPEG_QUALITY`]; every PNG uses the encoder's best
//! compression with adaptive filtering. Callers name the constants instead
//! of repeating literals.

use image::codecs::png::{CompressionType, FilterType};
use serde::Serialize;

/// JPEG encode quality (1-100). High-quality setting matching what photo
/// tools use for "maximum" export.
pub const JPEG_QUALITY: u8 = 95;

/// PNG compression level. Lossless either way; `Best` trades CPU for size.
pub const PNG_COMPRESSION: CompressionType = CompressionType::Best;

/// PNG row filter strategy paired with [`PNG_COMPRESSION`].
pub const PNG_FILTER: FilterType = FilterType::Adaptive;

/// Target format for a conversion. The service produces nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Parse the `format` form field. Case-insensitive; `jpg` is accepted
    /// as an alias for JPEG.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }

    /// File extension for output filenames.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type for the response `Content-Type`.
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    /// Upper-case name for user-facing messages and history records.
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
        }
    }
}
