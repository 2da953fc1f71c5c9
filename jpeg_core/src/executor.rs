//! Batch executor.
//!
//! Fans a collection of jobs out across a fixed-size worker pool. Each job
//! runs start-to-finish on one worker; completion order is unrelated to
//! submission order, and the report is only assembled once every job has
//! finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::errors::OptimizeResult;
use crate::job::{JobState, OptimizationJob, OptimizeParams};

/// File extensions accepted as JPEG sources.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "jfif"];

/// Aggregated outcome of one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub optimized: usize,
    pub failed: usize,
    pub unnecessary: usize,
    pub overwrite_denied: usize,
    /// Bytes saved, counted only over jobs that produced a smaller, valid
    /// destination.
    pub bytes_saved: u64,
    pub input_bytes: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    fn collect(jobs: &[Arc<OptimizationJob>], elapsed: Duration) -> Self {
        let mut report = BatchReport {
            total: jobs.len(),
            elapsed,
            ..BatchReport::default()
        };
        for job in jobs {
            report.input_bytes += job.original_size();
            match job.state() {
                JobState::OptimizedOk => {
                    report.optimized += 1;
                    if let Some(earned) = job.earn_size() {
                        if earned > 0 {
                            report.bytes_saved += earned as u64;
                        }
                    }
                }
                JobState::OptimizedKo => report.failed += 1,
                JobState::OptimizedUnnecessary => report.unnecessary += 1,
                JobState::OptimizedOverwriteNotAllowed => report.overwrite_denied += 1,
                _ => {}
            }
        }
        report
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.optimized as f64 / self.total as f64) * 100.0
        }
    }
}

pub struct BatchExecutor {
    workers: usize,
}

impl BatchExecutor {
    pub fn new(workers: usize) -> Self {
        BatchExecutor {
            workers: workers.max(1),
        }
    }

    /// Worker count matched to the machine.
    pub fn with_default_workers() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every job to completion and aggregates the outcome.
    /// `on_job_done` fires once per job as it reaches a terminal state, in
    /// completion order.
    pub fn run(
        &self,
        jobs: &[Arc<OptimizationJob>],
        params: &OptimizeParams,
        on_job_done: impl Fn(&OptimizationJob) + Sync,
    ) -> OptimizeResult<BatchReport> {
        let started = Instant::now();
        info!(jobs = jobs.len(), workers = self.workers, "starting batch");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        pool.install(|| {
            jobs.par_iter().for_each(|job| {
                let state = job.optimize(params);
                debug!(id = job.id(), state = state.label(), "job finished");
                on_job_done(job);
            });
        });

        let report = BatchReport::collect(jobs, started.elapsed());
        info!(
            optimized = report.optimized,
            failed = report.failed,
            unnecessary = report.unnecessary,
            overwrite_denied = report.overwrite_denied,
            bytes_saved = report.bytes_saved,
            "batch finished"
        );
        Ok(report)
    }
}

/// Collects JPEG files under `dir`, optionally recursing into
/// subdirectories.
pub fn collect_jpeg_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    walker
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| JPEG_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reencode::write_jpeg;
    use crate::types::Quality;
    use image::{DynamicImage, RgbImage};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn textured_jpeg(path: &Path, size: u32) {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            let checker = if (x / 4 + y / 4) % 2 == 0 { 220 } else { 20 };
            image::Rgb([checker, (x * 7 % 256) as u8, (y * 11 % 256) as u8])
        }));
        write_jpeg(&img, path, Quality::new(95).unwrap(), None).unwrap();
    }

    #[test]
    fn test_collect_jpeg_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("b.JPEG"), b"x").unwrap();
        fs::write(dir.path().join("c.png"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.jpe"), b"x").unwrap();

        let flat = collect_jpeg_files(dir.path(), false);
        assert_eq!(flat.len(), 2);

        let recursive = collect_jpeg_files(dir.path(), true);
        assert_eq!(recursive.len(), 3);
    }

    #[test]
    fn test_batch_runs_all_jobs_and_aggregates() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        // Two real sources plus one that will be denied by overwrite.
        let mut jobs = Vec::new();
        for (i, name) in ["a.jpg", "b.jpg", "c.jpg"].iter().enumerate() {
            let src = dir.path().join(name);
            textured_jpeg(&src, 96);
            let dst = out.join(name);
            jobs.push(Arc::new(OptimizationJob::new(i as u64, src, dst)));
        }
        fs::write(out.join("c.jpg"), b"already here").unwrap();

        let params = OptimizeParams {
            max_visual_diff: 10.0,
            min_file_size: 0,
            overwrite: false,
        };
        let completed = AtomicUsize::new(0);
        let executor = BatchExecutor::new(2);
        let report = executor
            .run(&jobs, &params, |_| {
                completed.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(completed.load(Ordering::SeqCst), 3);
        assert_eq!(report.total, 3);
        assert_eq!(report.optimized, 2);
        assert_eq!(report.overwrite_denied, 1);
        assert_eq!(report.failed, 0);
        assert!(report.bytes_saved > 0);
        assert!(jobs.iter().all(|job| job.state().is_terminal()));
    }

    #[test]
    fn test_empty_batch() {
        let params = OptimizeParams {
            max_visual_diff: 2.0,
            min_file_size: 0,
            overwrite: true,
        };
        let report = BatchExecutor::new(4).run(&[], &params, |_| {}).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.success_rate(), 100.0);
    }

    #[test]
    fn test_worker_floor() {
        assert_eq!(BatchExecutor::new(0).workers(), 1);
    }
}
