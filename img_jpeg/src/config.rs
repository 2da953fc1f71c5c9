//! Settings-file persistence.
//!
//! The last-used run parameters live in a plain line-oriented text file,
//! one value per line in fixed order: source directory, destination
//! directory, then the selector indices for minimum size, overwrite, max
//! visual difference and thread count. Indices address the same discrete
//! value tables the chooser widgets of the original app exposed, so the
//! file stays interchangeable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

pub const SETTINGS_FILE: &str = "JpegOptimizer.ini";

/// Minimum-size selector: index k selects k * 0.5 MB, up to 100 MB.
const MIN_SIZE_STEP_MB: f64 = 0.5;
const MIN_SIZE_MAX_INDEX: usize = 200;

/// Max-visual-diff selector: index k selects (k + 1) * 0.25 percent, up to
/// 5.00 percent.
const DIFF_STEP_PERCENT: f64 = 0.25;
const DIFF_MAX_INDEX: usize = 19;

/// Thread-count selector: index k selects k + 1 workers.
const THREADS_MAX_INDEX: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub min_size_index: usize,
    pub overwrite_index: usize,
    pub max_diff_index: usize,
    pub threads_index: usize,
}

impl Settings {
    /// Quantizes resolved run values onto the selector tables.
    pub fn from_values(
        source_dir: &Path,
        dest_dir: &Path,
        min_size_mb: f64,
        overwrite: bool,
        max_diff_percent: f64,
        threads: usize,
    ) -> Self {
        let min_size_index =
            ((min_size_mb / MIN_SIZE_STEP_MB).round().max(0.0) as usize).min(MIN_SIZE_MAX_INDEX);
        let max_diff_index = ((max_diff_percent / DIFF_STEP_PERCENT).round() as isize - 1)
            .clamp(0, DIFF_MAX_INDEX as isize) as usize;
        let threads_index = threads.saturating_sub(1).min(THREADS_MAX_INDEX);
        Settings {
            source_dir: source_dir.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            min_size_index,
            // true sits first in the selector
            overwrite_index: usize::from(!overwrite),
            max_diff_index,
            threads_index,
        }
    }

    pub fn min_file_size_bytes(&self) -> u64 {
        (self.min_size_index as f64 * MIN_SIZE_STEP_MB * 1024.0 * 1024.0) as u64
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite_index == 0
    }

    pub fn max_visual_diff(&self) -> f64 {
        (self.max_diff_index as f64 + 1.0) * DIFF_STEP_PERCENT
    }

    pub fn threads(&self) -> usize {
        self.threads_index + 1
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut lines = text.lines();
        let mut next_line = |what: &str| -> Result<String> {
            match lines.next() {
                Some(line) => Ok(line.trim().to_string()),
                None => bail!("settings file {} is missing the {} line", path.display(), what),
            }
        };

        let source_dir = PathBuf::from(next_line("source directory")?);
        let dest_dir = PathBuf::from(next_line("destination directory")?);
        let parse_index = |raw: String, what: &str, max: usize| -> Result<usize> {
            let index: usize = raw
                .parse()
                .with_context(|| format!("invalid {} selector index '{}'", what, raw))?;
            Ok(index.min(max))
        };
        let min_size_index =
            parse_index(next_line("minimum size")?, "minimum size", MIN_SIZE_MAX_INDEX)?;
        let overwrite_index = parse_index(next_line("overwrite")?, "overwrite", 1)?;
        let max_diff_index = parse_index(
            next_line("max visual difference")?,
            "max visual difference",
            DIFF_MAX_INDEX,
        )?;
        let threads_index =
            parse_index(next_line("thread count")?, "thread count", THREADS_MAX_INDEX)?;

        Ok(Settings {
            source_dir,
            dest_dir,
            min_size_index,
            overwrite_index,
            max_diff_index,
            threads_index,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            self.source_dir.display(),
            self.dest_dir.display(),
            self.min_size_index,
            self.overwrite_index,
            self.max_diff_index,
            self.threads_index,
        );
        fs::write(path, text)
            .with_context(|| format!("Failed to write settings file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("JpegOptimizer.ini");

        let settings = Settings::from_values(
            Path::new("/photos/in"),
            Path::new("/photos/out"),
            1.0,
            false,
            2.0,
            8,
        );
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.min_file_size_bytes(), 1024 * 1024);
        assert!(!loaded.overwrite());
        assert_eq!(loaded.max_visual_diff(), 2.0);
        assert_eq!(loaded.threads(), 8);
    }

    #[test]
    fn test_quantization_clamps_to_tables() {
        let settings = Settings::from_values(
            Path::new("a"),
            Path::new("b"),
            1000.0, // beyond the selector range
            true,
            99.0,
            500,
        );
        assert_eq!(settings.min_size_index, MIN_SIZE_MAX_INDEX);
        assert_eq!(settings.max_diff_index, DIFF_MAX_INDEX);
        assert_eq!(settings.threads_index, THREADS_MAX_INDEX);
        assert!(settings.overwrite());
    }

    #[test]
    fn test_file_layout_is_line_oriented() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("JpegOptimizer.ini");
        Settings::from_values(Path::new("/src"), Path::new("/dst"), 0.5, true, 0.25, 1)
            .save(&path)
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["/src", "/dst", "1", "0", "0", "0"]);
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("JpegOptimizer.ini");
        fs::write(&path, "/src\n/dst\n2\n").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_garbage_index_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("JpegOptimizer.ini");
        fs::write(&path, "/src\n/dst\nnot-a-number\n0\n7\n3\n").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
