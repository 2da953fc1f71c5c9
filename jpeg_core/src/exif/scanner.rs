//! JPEG segment walker.
//!
//! A one-token-lookahead, forward-only scan over the raw bytes: a sliding
//! two-byte window finds the start-of-image marker, then segments are walked
//! by their declared lengths until end-of-image. The stream position is
//! never rewound. Running out of bytes before EOI stops the scan silently;
//! partial metadata is acceptable because the output is informational only.

use std::ops::Range;

use tracing::trace;

use super::{tiff, ExifData};
use crate::errors::{ExifError, ExifResult};
use crate::markers::SegmentMarker;

/// Signature at the start of an APP1 payload that carries EXIF.
const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";

pub(super) fn scan(data: &[u8]) -> ExifResult<ExifData> {
    let mut exif = ExifData::default();

    let Some(mut pos) = find_soi(data) else {
        return Ok(exif);
    };
    trace!(position = pos, "found SOI");

    while pos + 1 < data.len() {
        let marker = match SegmentMarker::classify(data[pos], data[pos + 1]) {
            Some(marker) => marker,
            // Not a marker pair; slide the window one byte. This is how the
            // scan crosses entropy-coded data after SOS.
            None => {
                pos += 1;
                continue;
            }
        };
        pos += 2;

        match marker {
            SegmentMarker::Eoi => {
                trace!(position = pos, "reached EOI");
                break;
            }
            marker if marker.is_standalone() => continue,
            SegmentMarker::App(n) => {
                let Some(length) = read_segment_length(data, pos)? else {
                    return Ok(exif);
                };
                let payload = pos + 2;
                let next = pos + length as usize;
                if n == 1 && next <= data.len() && data[payload..next].starts_with(EXIF_SIGNATURE)
                {
                    trace!(position = pos, length, "found EXIF APP1 segment");
                    let tiff_start = payload + EXIF_SIGNATURE.len();
                    tiff::decode(data, tiff_start, &mut exif)?;
                }
                pos = next;
            }
            _ => {
                let Some(length) = read_segment_length(data, pos)? else {
                    return Ok(exif);
                };
                // Skip exactly length-2 payload bytes plus the length word.
                pos += length as usize;
            }
        }
    }

    Ok(exif)
}

/// Locates the raw APP1/EXIF segment (marker, length word and payload) so it
/// can be passed through verbatim into a re-encoded copy. Metadata segments
/// precede the scan data, so the walk gives up at SOS.
pub(crate) fn locate_exif_segment(data: &[u8]) -> Option<Range<usize>> {
    let mut pos = find_soi(data)?;

    while pos + 3 < data.len() {
        let marker = SegmentMarker::classify(data[pos], data[pos + 1])?;
        if marker.is_standalone() {
            if marker == SegmentMarker::Eoi {
                return None;
            }
            pos += 2;
            continue;
        }
        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if length < 2 {
            return None;
        }
        let end = pos + 2 + length;
        if end > data.len() {
            return None;
        }
        if marker == SegmentMarker::App(1) && data[pos + 4..end].starts_with(EXIF_SIGNATURE) {
            return Some(pos..end);
        }
        if marker == SegmentMarker::Sos {
            return None;
        }
        pos = end;
    }
    None
}

/// Sliding-window search for the SOI marker; returns the position just past
/// it.
fn find_soi(data: &[u8]) -> Option<usize> {
    let mut pos = 0;
    while pos + 1 < data.len() {
        if SegmentMarker::classify(data[pos], data[pos + 1]) == Some(SegmentMarker::Soi) {
            return Some(pos + 2);
        }
        pos += 1;
    }
    None
}

/// Reads the big-endian segment length at `pos`. The length counts its own
/// two bytes, so anything below 2 is malformed. `None` means the stream
/// ended first.
fn read_segment_length(data: &[u8], pos: usize) -> ExifResult<Option<u16>> {
    if pos + 2 > data.len() {
        return Ok(None);
    }
    let length = u16::from_be_bytes([data[pos], data[pos + 1]]);
    if length < 2 {
        return Err(ExifError::BadSegmentLength(length));
    }
    Ok(Some(length))
}
