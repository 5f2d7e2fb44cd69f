//! The conversion pipeline: validate → decode → encode, per file.
//!
//! [`convert_batch`] is the functional core of the service. It takes a
//! [`ConversionRequest`] (already parsed out of the multipart body), runs
//! every file through the same pipeline, and returns one [`FileOutcome`]
//! per file in submission order. A failure is data, not control flow: it
//! never aborts the rest of the batch, and the HTTP layer decides how to
//! present the aggregate.
//!
//! Validation happens before any decode work, most specific check first:
//! empty file → oversize → already-in-target-format → not HEIC/HEIF.

use std::collections::HashSet;

use thiserror::Error;

use crate::imaging::decoder::HeifDecoder;
use crate::imaging::{DecodeError, EncodeError, OutputFormat, encode, sniff};
use crate::naming;

/// One uploaded file plus the requested target format for the whole batch.
#[derive(Debug)]
pub struct ConversionRequest {
    pub files: Vec<UploadedFile>,
    pub format: OutputFormat,
}

/// A (filename, raw bytes) pair exactly as uploaded.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Rejections that happen before any decode work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file is empty")]
    Empty,
    #[error("file exceeds the {limit_mib} MiB limit")]
    TooLarge { limit_mib: u64 },
    #[error("file is already in {0} format")]
    SameFormat(&'static str),
    #[error("unsupported source format (expected HEIC/HEIF)")]
    NotHeif,
}

/// Everything that can go wrong for a single file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A successfully converted file, ready to ship.
#[derive(Debug)]
pub struct ConvertedFile {
    /// Sanitized upload name, for history records.
    pub source_name: String,
    /// Output name with the target extension, unique within the batch.
    pub output_name: String,
    pub bytes: Vec<u8>,
}

/// A file that did not convert, and why.
#[derive(Debug)]
pub struct FailedFile {
    pub source_name: String,
    pub reason: ConvertError,
}

/// Per-file result. Collected into the response, never thrown across the
/// batch boundary.
#[derive(Debug)]
pub enum FileOutcome {
    Converted(ConvertedFile),
    Failed(FailedFile),
}

impl FileOutcome {
    pub fn source_name(&self) -> &str {
        match self {
            FileOutcome::Converted(f) => &f.source_name,
            FileOutcome::Failed(f) => &f.source_name,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted(_))
    }
}

/// Convert every file in the request, returning outcomes in submission
/// order. `max_file_bytes` is the per-file size bound from configuration.
pub fn convert_batch(
    request: &ConversionRequest,
    decoder: &dyn HeifDecoder,
    max_file_bytes: usize,
) -> Vec<FileOutcome> {
    let mut taken = HashSet::new();

    request
        .files
        .iter()
        .map(|file| {
            let source_name = naming::sanitize(&file.filename);
            match convert_file(&file.bytes, &source_name, request.format, decoder, max_file_bytes) {
                Ok(bytes) => {
                    let renamed = naming::with_extension(&source_name, request.format.extension());
                    let output_name = naming::uniquify(&renamed, &mut taken);
                    FileOutcome::Converted(ConvertedFile {
                        source_name,
                        output_name,
                        bytes,
                    })
                }
                Err(reason) => FileOutcome::Failed(FailedFile {
                    source_name,
                    reason,
                }),
            }
        })
        .collect()
}

/// Split outcomes into successes and failures, preserving order within
/// each. The HTTP layer ships the first list and reports the second.
pub fn partition(outcomes: Vec<FileOutcome>) -> (Vec<ConvertedFile>, Vec<FailedFile>) {
    let mut converted = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Converted(f) => converted.push(f),
            FileOutcome::Failed(f) => failed.push(f),
        }
    }
    (converted, failed)
}

fn convert_file(
    bytes: &[u8],
    filename: &str,
    format: OutputFormat,
    decoder: &dyn HeifDecoder,
    max_file_bytes: usize,
) -> Result<Vec<u8>, ConvertError> {
    validate(bytes, filename, format, max_file_bytes)?;
    let raster = decoder.decode(bytes)?;
    let output = encode(&raster, format)?;
    Ok(output)
}

fn validate(
    bytes: &[u8],
    filename: &str,
    format: OutputFormat,
    max_file_bytes: usize,
) -> Result<(), ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::Empty);
    }
    if bytes.len() > max_file_bytes {
        return Err(ValidationError::TooLarge {
            limit_mib: (max_file_bytes / (1024 * 1024)) as u64,
        });
    }

    let detected = sniff::detect(bytes, filename);
    if detected.matches(format) {
        return Err(ValidationError::SameFormat(format.label()));
    }
    if detected != sniff::SniffedFormat::Heif {
        return Err(ValidationError::NotHeif);
    }
    Ok(())
}
