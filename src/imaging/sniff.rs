//! Source-format detection from file content.
//!
//! An upload's real format decides whether conversion is even attempted, so
//! detection cannot trust the filename alone. This module inspects a bounded
//! prefix of the byte buffer:
//!
//! - HEIC/HEIF: ISO-BMFF `ftyp` box with a known HEIF brand.
//! - PNG / JPEG: magic bytes, so "already in PNG format" messages are
//!   accurate for files that were never HEIC to begin with.
//!
//! Unrecognized content falls back to the filename extension via
//! [`detect`]. Pure functions, no allocation.

use super::format::OutputFormat;

/// What the byte buffer (or, failing that, the filename) looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Heif,
    Png,
    Jpeg,
    Unknown,
}

impl SniffedFormat {
    /// True when the detected source already is the requested target.
    pub fn matches(self, target: OutputFormat) -> bool {
        matches!(
            (self, target),
            (SniffedFormat::Png, OutputFormat::Png) | (SniffedFormat::Jpeg, OutputFormat::Jpeg)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            SniffedFormat::Heif => "HEIC/HEIF",
            SniffedFormat::Png => "PNG",
            SniffedFormat::Jpeg => "JPEG",
            SniffedFormat::Unknown => "unknown",
        }
    }
}

/// HEIF brands accepted by libheif. Covers still images (`heic`, `heix`),
/// multi-image/sequence variants (`heim`, `heis`, `hevc`, `hevm`, `hevs`,
/// `hevx`) and the structural brands (`mif1`, `msf1`) iPhones write as the
/// major brand.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevm", b"hevs", b"hevx", b"mif1", b"msf1",
];

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Never read brands past this offset — a well-formed `ftyp` box is tiny,
/// and a huge declared size is a sign of garbage, not of more brands.
const MAX_FTYP_SCAN: usize = 256;

/// Detect the source format of an upload: content first, filename extension
/// as the fallback for unrecognized bytes.
pub fn detect(bytes: &[u8], filename: &str) -> SniffedFormat {
    match sniff_bytes(bytes) {
        SniffedFormat::Unknown => from_extension(filename),
        known => known,
    }
}

/// Detect a format from content alone.
pub fn sniff_bytes(bytes: &[u8]) -> SniffedFormat {
    if bytes.starts_with(PNG_MAGIC) {
        return SniffedFormat::Png;
    }
    if bytes.starts_with(JPEG_MAGIC) {
        return SniffedFormat::Jpeg;
    }
    if has_heif_ftyp(bytes) {
        return SniffedFormat::Heif;
    }
    SniffedFormat::Unknown
}

/// Check for an ISO-BMFF `ftyp` box carrying a HEIF brand.
///
/// Box layout (all offsets from the start of the file):
///   Bytes 0-3:   box size (big-endian u32, includes the 8-byte header)
///   Bytes 4-7:   box type, must be `ftyp`
///   Bytes 8-11:  major brand
///   Bytes 12-15: minor version (ignored)
///   Bytes 16+:   compatible brands, 4 bytes each, until the box ends
fn has_heif_ftyp(bytes: &[u8]) -> bool {
    if bytes.len() < 16 || &bytes[4..8] != b"ftyp" {
        return false;
    }

    let box_size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if box_size < 16 || box_size % 4 != 0 {
        return false;
    }

    let end = box_size.min(bytes.len()).min(MAX_FTYP_SCAN);
    if is_heif_brand(&bytes[8..12]) {
        return true;
    }

    let mut pos = 16;
    while pos + 4 <= end {
        if is_heif_brand(&bytes[pos..pos + 4]) {
            return true;
        }
        pos += 4;
    }
    false
}

fn is_heif_brand(brand: &[u8]) -> bool {
    HEIF_BRANDS.iter().any(|b| brand == &b[..])
}

/// Classify by filename extension. Only used when content sniffing fails,
/// e.g. truncated or corrupt uploads.
pub fn from_extension(filename: &str) -> SniffedFormat {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "heic" | "heif" => SniffedFormat::Heif,
        "png" => SniffedFormat::Png,
        "jpg" | "jpeg" => SniffedFormat::Jpeg,
        _ => SniffedFormat::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{heif_bytes, heif_bytes_with_brand, jpeg_bytes, png_bytes};

    #[test]
    fn detects_heic_major_brand() {
        assert_eq!(sniff_bytes(&heif_bytes()), SniffedFormat::Heif);
    }

    #[test]
    fn detects_mif1_major_brand() {
        let bytes = heif_bytes_with_brand(b"mif1", &[]);
        assert_eq!(sniff_bytes(&bytes), SniffedFormat::Heif);
    }

    #[test]
    fn detects_heif_compatible_brand_behind_other_major() {
        // iPhone files often carry an unknown major brand with `heic` only
        // in the compatible list.
        let bytes = heif_bytes_with_brand(b"qt  ", &[b"isom", b"heic"]);
        assert_eq!(sniff_bytes(&bytes), SniffedFormat::Heif);
    }

    #[test]
    fn rejects_non_heif_ftyp() {
        // A plain MP4: ftyp box, but no HEIF brand anywhere.
        let bytes = heif_bytes_with_brand(b"isom", &[b"iso2", b"avc1", b"mp41"]);
        assert_eq!(sniff_bytes(&bytes), SniffedFormat::Unknown);
    }

    #[test]
    fn detects_png_magic() {
        assert_eq!(sniff_bytes(&png_bytes()), SniffedFormat::Png);
    }

    #[test]
    fn detects_jpeg_magic() {
        assert_eq!(sniff_bytes(&jpeg_bytes()), SniffedFormat::Jpeg);
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(sniff_bytes(b"not an image at all"), SniffedFormat::Unknown);
        assert_eq!(sniff_bytes(&[]), SniffedFormat::Unknown);
    }

    #[test]
    fn truncated_ftyp_is_unknown() {
        let bytes = heif_bytes();
        assert_eq!(sniff_bytes(&bytes[..12]), SniffedFormat::Unknown);
    }

    #[test]
    fn ftyp_with_undersized_box_is_unknown() {
        let mut bytes = heif_bytes();
        // Declare a box too small to hold even the major brand.
        bytes[..4].copy_from_slice(&8u32.to_be_bytes());
        assert_eq!(sniff_bytes(&bytes), SniffedFormat::Unknown);
    }

    #[test]
    fn oversized_box_size_does_not_scan_past_limit() {
        let mut bytes = heif_bytes_with_brand(b"isom", &[]);
        bytes[..4].copy_from_slice(&(u32::MAX - 3).to_be_bytes());
        bytes.extend_from_slice(&[0u8; 512]);
        assert_eq!(sniff_bytes(&bytes), SniffedFormat::Unknown);
    }

    #[test]
    fn extension_fallback_when_content_unknown() {
        assert_eq!(detect(b"garbage", "photo.HEIC"), SniffedFormat::Heif);
        assert_eq!(detect(b"garbage", "shot.png"), SniffedFormat::Png);
        assert_eq!(detect(b"garbage", "pic.JPG"), SniffedFormat::Jpeg);
        assert_eq!(detect(b"garbage", "file.webp"), SniffedFormat::Unknown);
        assert_eq!(detect(b"garbage", "noextension"), SniffedFormat::Unknown);
    }

    #[test]
    fn content_wins_over_extension() {
        // A real PNG renamed to .heic is still a PNG.
        assert_eq!(detect(&png_bytes(), "photo.heic"), SniffedFormat::Png);
    }

    #[test]
    fn matches_pairs_sniffed_with_target() {
        assert!(SniffedFormat::Png.matches(OutputFormat::Png));
        assert!(SniffedFormat::Jpeg.matches(OutputFormat::Jpeg));
        assert!(!SniffedFormat::Png.matches(OutputFormat::Jpeg));
        assert!(!SniffedFormat::Heif.matches(OutputFormat::Png));
        assert!(!SniffedFormat::Unknown.matches(OutputFormat::Jpeg));
    }
}
