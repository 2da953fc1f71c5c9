//! Shared error types.
//!
//! `ExifError` covers structural problems found while walking a JPEG/TIFF
//! container. Metadata extraction is informational only, so these never fail
//! a job; callers log them and move on.
//!
//! `OptimizeError` covers failures of the re-encode/compare pipeline and is
//! always contained at the job boundary: a failing file ends in a terminal
//! job state, the batch keeps going.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExifError {
    #[error("segment length {0} is smaller than the 2-byte length field")]
    BadSegmentLength(u16),

    #[error("TIFF header has invalid byte-order bytes 0x{0:02X} 0x{1:02X}")]
    BadByteOrder(u8, u8),

    #[error("TIFF header magic is 0x{0:04X}, expected 0x002A")]
    BadMagic(u16),

    #[error("IFD0 offset {0} points inside the 8-byte TIFF header")]
    BadIfdOffset(u32),

    #[error("IFD entry format {format} for tag 0x{tag:04X} is outside 1-13")]
    BadEntryFormat { tag: u16, format: u16 },

    #[error("ExifOffset tag 0x8769 has format {0}, expected 4 or 13")]
    BadExifOffsetFormat(u16),

    #[error("unexpected end of data at offset {0}")]
    UnexpectedEof(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("images have different sizes: {src_width}x{src_height} vs {other_width}x{other_height}")]
    DimensionMismatch {
        src_width: u32,
        src_height: u32,
        other_width: u32,
        other_height: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type ExifResult<T> = std::result::Result<T, ExifError>;
pub type OptimizeResult<T> = std::result::Result<T, OptimizeError>;
