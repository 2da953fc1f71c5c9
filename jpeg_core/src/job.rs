//! Per-file optimization job.
//!
//! A job owns the full state machine for one source file. Mutable fields are
//! atomics: the owning worker thread is the only writer, while the surrounding
//! app reads them concurrently for display, so every read is a consistent
//! snapshot without locks. Listener notifications are synchronous, delivered
//! on the worker thread.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::OptimizeResult;
use crate::reencode;
use crate::search;
use crate::types::Quality;

/// Lifecycle of a job. `NotYetOptimized` and `Optimizing` are transient;
/// the remaining states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobState {
    NotYetOptimized = 0,
    Optimizing = 1,
    OptimizedOk = 2,
    OptimizedKo = 3,
    OptimizedUnnecessary = 4,
    OptimizedOverwriteNotAllowed = 5,
}

impl JobState {
    fn from_u8(raw: u8) -> JobState {
        match raw {
            1 => JobState::Optimizing,
            2 => JobState::OptimizedOk,
            3 => JobState::OptimizedKo,
            4 => JobState::OptimizedUnnecessary,
            5 => JobState::OptimizedOverwriteNotAllowed,
            _ => JobState::NotYetOptimized,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::NotYetOptimized | JobState::Optimizing)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobState::NotYetOptimized => "not yet optimized",
            JobState::Optimizing => "optimizing",
            JobState::OptimizedOk => "optimized",
            JobState::OptimizedKo => "failed",
            JobState::OptimizedUnnecessary => "unnecessary",
            JobState::OptimizedOverwriteNotAllowed => "overwrite not allowed",
        }
    }
}

/// Receiver for job progress. Called synchronously from the worker thread on
/// every state change and every step increment.
pub trait JobListener: Send + Sync {
    fn state_change(&self, job: &OptimizationJob);
}

/// Resolved tuning parameters for a run.
#[derive(Debug, Clone)]
pub struct OptimizeParams {
    /// Tolerated visual difference, in percent of the similarity scale.
    pub max_visual_diff: f64,
    /// Sources at or below this many bytes are copied through untouched.
    pub min_file_size: u64,
    /// Whether an existing destination may be replaced.
    pub overwrite: bool,
}

pub struct OptimizationJob {
    id: u64,
    src: PathBuf,
    dst: PathBuf,
    original_size: AtomicU64,
    state: AtomicU8,
    quality_found: AtomicI32,
    current_step: AtomicU32,
    started_at_ms: AtomicI64,
    finished_at_ms: AtomicI64,
    listener: Option<Arc<dyn JobListener>>,
}

impl OptimizationJob {
    pub fn new(id: u64, src: PathBuf, dst: PathBuf) -> Self {
        let original_size = fs::metadata(&src).map(|m| m.len()).unwrap_or(0);
        OptimizationJob {
            id,
            src,
            dst,
            original_size: AtomicU64::new(original_size),
            state: AtomicU8::new(JobState::NotYetOptimized as u8),
            quality_found: AtomicI32::new(-1),
            current_step: AtomicU32::new(0),
            started_at_ms: AtomicI64::new(0),
            finished_at_ms: AtomicI64::new(0),
            listener: None,
        }
    }

    /// Attaches the progress listener. Must happen before the job is shared
    /// with the executor.
    pub fn set_listener(&mut self, listener: Arc<dyn JobListener>) {
        self.listener = Some(listener);
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn dst(&self) -> &Path {
        &self.dst
    }

    pub fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn original_size(&self) -> u64 {
        self.original_size.load(Ordering::Acquire)
    }

    pub fn quality_found(&self) -> Option<Quality> {
        let raw = self.quality_found.load(Ordering::Acquire);
        Quality::new(i64::from(raw)).ok()
    }

    pub fn current_step(&self) -> u32 {
        self.current_step.load(Ordering::Acquire)
    }

    pub fn max_steps(&self) -> u32 {
        search::MAX_STEPS
    }

    /// Wall time of the last run, once it has finished.
    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.started_at_ms.load(Ordering::Acquire);
        let end = self.finished_at_ms.load(Ordering::Acquire);
        if start > 0 && end >= start {
            Some(Duration::from_millis((end - start) as u64))
        } else {
            None
        }
    }

    /// Bytes saved by this job, when both files exist.
    pub fn earn_size(&self) -> Option<i64> {
        if !self.src.exists() || !self.dst.exists() {
            return None;
        }
        let dst_size = fs::metadata(&self.dst).ok()?.len();
        Some(self.original_size() as i64 - dst_size as i64)
    }

    /// Fraction of the original size saved, when both files exist.
    pub fn earn_rate(&self) -> Option<f64> {
        let original = self.original_size();
        if original == 0 {
            return None;
        }
        let earned = self.earn_size()?;
        Some(earned as f64 / original as f64)
    }

    /// Resets the job for a re-run and refreshes the recorded source size
    /// from the filesystem.
    pub fn reinit_state(&self) {
        self.set_state(JobState::NotYetOptimized);
        let size = fs::metadata(&self.src).map(|m| m.len()).unwrap_or(0);
        self.original_size.store(size, Ordering::Release);
        self.quality_found.store(-1, Ordering::Release);
    }

    /// Runs the full state machine. Per-file failures are contained here:
    /// the job always ends in a terminal state and errors are logged, never
    /// propagated.
    pub fn optimize(&self, params: &OptimizeParams) -> JobState {
        self.started_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
        self.set_state(JobState::Optimizing);
        info!(
            src = %self.src.display(),
            size = self.original_size(),
            "optimizing"
        );

        let state = match self.run(params) {
            Ok(state) => state,
            Err(err) => {
                warn!(src = %self.src.display(), error = %err, "optimization failed");
                JobState::OptimizedKo
            }
        };

        self.set_state(state);
        self.finished_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);

        match state {
            JobState::OptimizedOk => info!(
                src = %self.src.display(),
                saved = self.earn_size().unwrap_or(0),
                quality = ?self.quality_found().map(|q| q.value()),
                "optimization done"
            ),
            JobState::OptimizedKo => warn!(
                src = %self.src.display(),
                "unable to optimize (too much visual difference when compressing)"
            ),
            JobState::OptimizedUnnecessary => info!(
                src = %self.src.display(),
                "optimization unnecessary (file already small enough)"
            ),
            JobState::OptimizedOverwriteNotAllowed => warn!(
                dst = %self.dst.display(),
                "destination exists and overwrite is not allowed"
            ),
            _ => {}
        }
        state
    }

    fn run(&self, params: &OptimizeParams) -> OptimizeResult<JobState> {
        if self.dst.exists() && !params.overwrite {
            return Ok(JobState::OptimizedOverwriteNotAllowed);
        }

        if self.original_size() <= params.min_file_size {
            if self.src != self.dst {
                fs::copy(&self.src, &self.dst)?;
                let _ = reencode::copy_file_times(&self.src, &self.dst);
            }
            return Ok(JobState::OptimizedUnnecessary);
        }

        let tmp = self.temp_candidate_path();
        let found = search::optimize_file(
            &self.src,
            &self.dst,
            &tmp,
            params.max_visual_diff,
            || self.increment_step(),
        )?;

        match found {
            Some(quality) => {
                self.quality_found
                    .store(i32::from(quality.value()), Ordering::Release);
                Ok(JobState::OptimizedOk)
            }
            None => Ok(JobState::OptimizedKo),
        }
    }

    /// Candidate path derived from the job id, so concurrent workers never
    /// collide on temp files.
    fn temp_candidate_path(&self) -> PathBuf {
        let dir = self.dst.parent().unwrap_or_else(|| Path::new("."));
        dir.join(format!("JpegOptimizer.task-{}.tmp.jpg", self.id))
    }

    fn set_state(&self, state: JobState) {
        if state == JobState::Optimizing {
            self.current_step.store(0, Ordering::Release);
        }
        self.state.store(state as u8, Ordering::Release);
        self.notify();
    }

    fn increment_step(&self) {
        self.current_step.fetch_add(1, Ordering::AcqRel);
        self.notify();
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener.state_change(self);
        }
    }
}

impl std::fmt::Debug for OptimizationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizationJob")
            .field("id", &self.id)
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("state", &self.state())
            .finish()
    }
}
