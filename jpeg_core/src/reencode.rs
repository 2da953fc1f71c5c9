//! JPEG re-encoding with the private quality trailer.
//!
//! Standard JPEG carries no record of the quality it was encoded at, so one
//! byte holding `quality & 0x7F` is appended after the EOI marker of every
//! file this tool writes. A file that ends exactly at EOI carries no trailer
//! and its quality is unknown. Source metadata is passed through on a
//! best-effort basis: the raw APP1/EXIF segment is spliced verbatim after
//! the SOI of the new file, and filesystem timestamps are copied over.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::trace;

use crate::errors::OptimizeResult;
use crate::exif::locate_exif_segment;
use crate::types::Quality;

/// End-of-image marker bytes.
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Encodes `img` as a JPEG at `quality`, splicing in `exif_segment` when one
/// is supplied and appending the quality trailer. An existing destination is
/// truncated.
pub fn write_jpeg(
    img: &DynamicImage,
    dst: &Path,
    quality: Quality,
    exif_segment: Option<&[u8]>,
) -> OptimizeResult<()> {
    let mut encoded: Vec<u8> = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, quality.encoder_value());
    img.write_with_encoder(encoder)?;
    trace!(
        quality = quality.value(),
        bytes = encoded.len(),
        "encoded candidate"
    );

    let exif_len = exif_segment.map_or(0, <[u8]>::len);
    let mut out = Vec::with_capacity(encoded.len() + exif_len + 1);
    match exif_segment {
        Some(segment) if encoded.len() >= 2 => {
            out.extend_from_slice(&encoded[..2]); // SOI
            out.extend_from_slice(segment);
            out.extend_from_slice(&encoded[2..]);
        }
        _ => out.extend_from_slice(&encoded),
    }
    out.push(quality.trailer_byte());

    fs::write(dst, &out)?;
    Ok(())
}

/// Extracts the raw APP1/EXIF segment of an in-memory JPEG for passthrough.
pub fn extract_exif_segment(data: &[u8]) -> Option<&[u8]> {
    locate_exif_segment(data).map(|range| &data[range])
}

/// Reads the quality trailer of a JPEG file. `None` means the file ends
/// exactly at the EOI marker and carries no trailer.
pub fn read_quality(path: &Path) -> OptimizeResult<Option<u8>> {
    let mut file = fs::File::open(path)?;
    let len = file.metadata()?.len();
    if len < 2 {
        return Ok(None);
    }
    file.seek(SeekFrom::End(-2))?;
    let mut tail = [0u8; 2];
    file.read_exact(&mut tail)?;
    if tail == EOI {
        Ok(None)
    } else {
        Ok(Some(tail[1]))
    }
}

/// Copies access/modification times from `src` onto `dst`.
pub fn copy_file_times(src: &Path, dst: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(src)?;
    let atime = filetime::FileTime::from_last_access_time(&meta);
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dst, atime, mtime)
}
