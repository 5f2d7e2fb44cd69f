//! ZIP bundling for multi-file conversions.
//!
//! A batch download is a single deflate-compressed archive built entirely
//! in memory — outputs are request-scoped, nothing touches disk.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::convert::ConvertedFile;

/// Download filename for batch archives.
pub const ARCHIVE_NAME: &str = "converted_images.zip";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("could not build archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("could not build archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Bundle converted files into one ZIP, entry names as produced by the
/// conversion step (already unique within the batch).
pub fn bundle(files: &[ConvertedFile]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        writer.start_file(file.output_name.as_str(), options)?;
        writer.write_all(&file.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
