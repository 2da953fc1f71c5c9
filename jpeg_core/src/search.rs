//! Quality search controller.
//!
//! Integer binary search over the quality domain [0, 100]: each probe
//! re-encodes the source at the midpoint quality, measures the visual
//! difference against the original, and halves the interval. The lowest
//! quality whose difference stays strictly below the tolerance wins.
//! Probes are strictly sequential; each depends on the bound update of the
//! previous one.

use std::fs;
use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};

use crate::errors::OptimizeResult;
use crate::reencode;
use crate::similarity::compute_similarity;
use crate::types::Quality;

/// Worst-case probe count over the 101-value domain, ceil(log2(101)).
pub const MAX_PROBES: u32 = 7;

/// Each probe reports two sub-steps: candidate encode, then compare.
pub const MAX_STEPS: u32 = 2 * MAX_PROBES;

/// Finds the lowest quality whose re-encoding keeps the visual difference
/// (scaled to percent) strictly below `max_visual_diff`. The candidate
/// written to `tmp_path` for each probe is removed before returning.
/// `on_step` fires after every encode and every compare.
pub fn search_quality(
    source: &DynamicImage,
    tmp_path: &Path,
    max_visual_diff: f64,
    mut on_step: impl FnMut(),
) -> OptimizeResult<Option<Quality>> {
    let mut min_q: i32 = i32::from(Quality::MIN.value());
    let mut max_q: i32 = i32::from(Quality::MAX.value());
    let mut found: Option<Quality> = None;

    while min_q <= max_q {
        let quality = Quality::new(i64::from((min_q + max_q) / 2))
            .expect("midpoint stays inside the searched interval");
        debug!(min_q, max_q, quality = quality.value(), "probing quality");

        reencode::write_jpeg(source, tmp_path, quality, None)?;
        on_step();

        let candidate = image::open(tmp_path)?;
        let diff = compute_similarity(source, &candidate)? * 100.0;
        on_step();

        if diff < max_visual_diff {
            debug!(quality = quality.value(), diff, "difference within tolerance");
            found = Some(quality);
            max_q = i32::from(quality.value()) - 1;
        } else {
            debug!(quality = quality.value(), diff, "difference too high");
            min_q = i32::from(quality.value()) + 1;
        }
    }

    let _ = fs::remove_file(tmp_path);
    Ok(found)
}

/// Runs the search for `src` and, when a worthwhile quality exists, writes
/// the final re-encoding to `dst` with the source EXIF passed through.
/// Returns the quality written, or `None` when no quality below 100 meets
/// the tolerance; in that case `dst` is left untouched.
pub fn optimize_file(
    src: &Path,
    dst: &Path,
    tmp_path: &Path,
    max_visual_diff: f64,
    on_step: impl FnMut(),
) -> OptimizeResult<Option<Quality>> {
    let raw = fs::read(src)?;
    let source = image::load_from_memory(&raw)?;

    let found = search_quality(&source, tmp_path, max_visual_diff, on_step)?;

    match found {
        Some(quality) if quality.is_compressive() => {
            let exif = reencode::extract_exif_segment(&raw);
            reencode::write_jpeg(&source, dst, quality, exif)?;
            let _ = reencode::copy_file_times(src, dst);
            info!(
                src = %src.display(),
                dst = %dst.display(),
                quality = quality.value(),
                "wrote optimized file"
            );
            Ok(Some(quality))
        }
        _ => {
            debug!(src = %src.display(), ?found, "no worthwhile quality found");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    /// Textured source so recompression at low quality produces a visible
    /// difference while high quality stays close.
    fn textured_image(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            let checker = if (x / 4 + y / 4) % 2 == 0 { 200 } else { 40 };
            let noise = ((x.wrapping_mul(31) ^ y.wrapping_mul(17)) % 64) as u8;
            image::Rgb([checker, noise.wrapping_add(90), (x * 2 % 256) as u8])
        }))
    }

    #[test]
    fn test_search_respects_step_budget() {
        let dir = TempDir::new().unwrap();
        let tmp = dir.path().join("candidate.tmp.jpg");
        let source = textured_image(64);

        let mut steps = 0u32;
        let found = search_quality(&source, &tmp, 5.0, || steps += 1).unwrap();

        assert!(steps <= MAX_STEPS, "{} steps exceed the budget", steps);
        assert_eq!(steps % 2, 0, "encode and compare always pair up");
        assert!(found.is_some());
        assert!(!tmp.exists(), "candidate must be discarded");
    }

    #[test]
    fn test_found_quality_meets_tolerance() {
        let dir = TempDir::new().unwrap();
        let tmp = dir.path().join("candidate.tmp.jpg");
        let source = textured_image(64);
        let tolerance = 5.0;

        let found = search_quality(&source, &tmp, tolerance, || {})
            .unwrap()
            .expect("a generous tolerance always admits some quality");

        let check = dir.path().join("check.jpg");
        reencode::write_jpeg(&source, &check, found, None).unwrap();
        let candidate = image::open(&check).unwrap();
        let diff = compute_similarity(&source, &candidate).unwrap() * 100.0;
        assert!(
            diff < tolerance,
            "quality {} produced diff {} >= {}",
            found,
            diff,
            tolerance
        );
    }

    #[test]
    fn test_impossible_tolerance_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let tmp = dir.path().join("candidate.tmp.jpg");
        let source = textured_image(64);

        // Negative tolerance: even a perfect candidate (diff 0) fails the
        // strict comparison.
        let found = search_quality(&source, &tmp, -1.0, || {}).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_optimize_file_writes_smaller_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.jpg");
        let dst = dir.path().join("dst.jpg");
        let tmp = dir.path().join("task.tmp.jpg");

        reencode::write_jpeg(&textured_image(128), &src, Quality::new(95).unwrap(), None)
            .unwrap();
        let src_size = fs::metadata(&src).unwrap().len();

        let found = optimize_file(&src, &dst, &tmp, 10.0, || {})
            .unwrap()
            .expect("tolerant search must succeed");

        assert!(found.value() < 100);
        let dst_size = fs::metadata(&dst).unwrap().len();
        assert!(
            dst_size < src_size,
            "destination {} not smaller than source {}",
            dst_size,
            src_size
        );
        assert_eq!(
            reencode::read_quality(&dst).unwrap(),
            Some(found.trailer_byte())
        );
    }

    #[test]
    fn test_optimize_file_failure_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.jpg");
        let dst = dir.path().join("dst.jpg");
        let tmp = dir.path().join("task.tmp.jpg");

        reencode::write_jpeg(&textured_image(64), &src, Quality::new(90).unwrap(), None)
            .unwrap();

        let found = optimize_file(&src, &dst, &tmp, -1.0, || {}).unwrap();
        assert!(found.is_none());
        assert!(!dst.exists());
    }
}
