//! # heifbox
//!
//! A small web service that converts HEIC/HEIF photos to PNG or JPEG.
//! Drop files on the page (or POST them), pick a format, get the converted
//! image back — one file as the image itself, several as a ZIP archive.
//!
//! # Architecture: One Request, One Batch
//!
//! Every conversion request moves through the same pipeline, one uploaded
//! file at a time:
//!
//! ```text
//! 1. Validate   bytes     →  cheap checks     (size, real format, not a no-op)
//! 2. Decode     HEIF      →  raster           (libheif, blocking pool)
//! 3. Encode     raster    →  PNG / JPEG       (image crate)
//! 4. Respond    batch     →  image or ZIP     (+ one history record per file)
//! ```
//!
//! The stages are separated for two reasons:
//!
//! - **Per-file failure**: a corrupt file fails alone; the rest of the batch
//!   still converts, and the failure is reported next to the result.
//! - **Testability**: validation and encoding are pure functions, and the
//!   decoder sits behind a trait, so the whole pipeline runs under test
//!   without the system codec.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`routes`] | HTTP surface — the converter page, `/convert`, `/history`, `/clear-history` |
//! | [`convert`] | The batch pipeline: per-file validation, decode, encode, outcome partitioning |
//! | [`imaging`] | Format types, content sniffing, the decoder trait, PNG/JPEG encoding |
//! | [`archive`] | ZIP bundling for multi-file batches |
//! | [`session`] | Per-browser conversion history with capacity and idle expiry |
//! | [`middleware`] | Request tracing and the session cookie |
//! | [`naming`] | Upload filename sanitization and output naming |
//! | [`config`] | `config.toml` loading, env and CLI overrides, validation |
//! | [`state`] | Shared application state handed to every handler |
//! | [`error`] | The one error type handlers return, mapped to HTTP responses |
//!
//! # Design Decisions
//!
//! ## Validation Before Decode
//!
//! Uploads are sniffed from their bytes (ISO-BMFF `ftyp` brands, PNG/JPEG
//! magic) before any codec runs. Asking for PNG output of a PNG is rejected
//! as a no-op, oversized and empty files never reach the decoder, and the
//! error messages can name what the file actually is rather than echoing
//! its extension.
//!
//! ## The Decoder Is a Trait
//!
//! HEVC payloads have no pure-Rust decoder, so decoding goes through
//! [libheif](https://github.com/strukturag/libheif) — the one system
//! library this service needs. It sits behind [`imaging::HeifDecoder`] and
//! is injected through [`state::AppState`], which keeps every piece of
//! request handling testable with a mock and leaves room to swap codecs
//! without touching a handler.
//!
//! ## Whole-File Responses
//!
//! `/convert` answers with the converted bytes themselves: a single
//! submitted file comes back as the image, two or more come back as one
//! ZIP. There is no staging directory, no download token, nothing to clean
//! up — the response is the deliverable. Files that failed inside an
//! otherwise successful batch are listed in the `X-Conversion-Failures`
//! header so the download still succeeds.
//!
//! ## Sessions Without Accounts
//!
//! History is per browser: an opaque cookie keyed to an in-memory store,
//! capped per session and swept after an idle TTL. Restarting the service
//! forgets everything, which is the point — this is a converter, not a
//! photo library.
//!
//! ## Maud Over Template Engines
//!
//! The page is generated with [Maud](https://maud.lambda.xyz/), a
//! compile-time HTML macro system, rather than Handlebars or Tera:
//! malformed HTML is a build error, interpolation is auto-escaped, and the
//! binary ships with no template directory. CSS and JavaScript are embedded
//! with `include_str!`, so the service is a single self-contained
//! executable plus one system codec.

pub mod archive;
pub mod config;
pub mod convert;
pub mod error;
pub mod imaging;
pub mod middleware;
pub mod naming;
pub mod routes;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
