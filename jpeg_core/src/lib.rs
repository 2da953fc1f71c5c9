//! Core engine for the JPEG batch optimizer.
//!
//! This crate provides the non-UI half of the application:
//! - EXIF metadata extraction: a forward-only JPEG segment walker plus a
//!   TIFF/IFD decoder with typed tag values
//! - Pixel-level similarity metric between decoded images
//! - JPEG re-encoding with a private quality trailer byte
//! - Binary quality search driven by the similarity metric
//! - Per-file job state machine and the parallel batch executor

pub mod errors;
pub mod executor;
pub mod exif;
pub mod job;
pub mod logging;
pub mod markers;
pub mod reencode;
pub mod report;
pub mod search;
pub mod similarity;
pub mod types;

pub use errors::{ExifError, ExifResult, OptimizeError, OptimizeResult};
pub use executor::{collect_jpeg_files, BatchExecutor, BatchReport, JPEG_EXTENSIONS};
pub use exif::{
    read_exif, read_exif_file, ExifData, ExifTag, ExifValue, Rational, SignedRational,
};
pub use job::{JobListener, JobState, OptimizationJob, OptimizeParams};
pub use markers::SegmentMarker;
pub use reencode::{extract_exif_segment, read_quality, write_jpeg};
pub use report::{format_bytes, format_duration, print_summary_report};
pub use search::{optimize_file, search_quality, MAX_PROBES, MAX_STEPS};
pub use similarity::{compare_files, compute_similarity};
pub use types::{Quality, QualityError};
