//! Image handling: detection, decoding, encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect source format** | custom `ftyp` / magic-byte sniffer |
//! | **Decode HEIC/HEIF** | libheif via `libheif-rs` |
//! | **Encode PNG** | `image` PNG encoder, best compression |
//! | **Encode JPEG** | `image` JPEG encoder at quality 95 |
//!
//! The module is split into:
//! - **Format**: [`OutputFormat`] and the named quality constants
//! - **Sniff**: content-first source-format detection
//! - **Decoder**: [`HeifDecoder`] trait + [`LibheifDecoder`]
//! - **Encode**: raster → output bytes at the fixed policy

pub mod decoder;
pub mod encode;
pub mod format;
pub mod sniff;

pub use decoder::{DecodeError, HeifDecoder, LibheifDecoder};
pub use encode::{EncodeError, encode};
pub use format::{JPEG_QUALITY, OutputFormat};
pub use sniff::SniffedFormat;
