//! CLI for the JPEG batch optimizer.
//!
//! `run` recompresses every JPEG under a source directory into a destination
//! directory, keeping the measured visual difference of each file below the
//! requested budget. `analyze` dumps the decoded EXIF metadata and the
//! recorded trailer quality of one file; `verify` compares two images.

mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::warn;

use jpeg_core::{
    collect_jpeg_files, format_bytes, print_summary_report, BatchExecutor, JobListener, JobState,
    OptimizationJob, OptimizeParams,
};

#[derive(Parser)]
#[command(name = "img-jpeg")]
#[command(version, about = "Batch JPEG recompressor driven by a visual difference budget", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompress every JPEG under INPUT into the output directory.
    Run {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Tolerated visual difference, in percent.
        #[arg(long, default_value_t = 2.0)]
        max_diff: f64,

        /// Copy files at or below this size (MB) through untouched.
        #[arg(long, default_value_t = 0.0)]
        min_size: f64,

        /// Overwrite existing destination files.
        #[arg(short, long)]
        force: bool,

        /// Recurse into subdirectories.
        #[arg(short, long, default_value_t = true)]
        recursive: bool,

        /// Worker threads; 0 picks the machine default.
        #[arg(short, long, default_value_t = 0)]
        threads: usize,
    },

    /// Repeat a previous run from the saved settings file.
    Rerun {
        /// Settings file written by a previous run.
        #[arg(long, default_value = config::SETTINGS_FILE)]
        settings: PathBuf,
    },

    /// Print the EXIF metadata and recorded quality of a JPEG file.
    Analyze {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "human")]
        output: OutputFormat,
    },

    /// Print the visual difference between two images.
    Verify {
        original: PathBuf,

        converted: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() -> Result<()> {
    let _ = jpeg_core::logging::init_logging(
        "img_jpeg",
        jpeg_core::logging::LogConfig::default(),
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            max_diff,
            min_size,
            force,
            recursive,
            threads,
        } => {
            let workers = if threads == 0 { num_cpus::get() } else { threads };
            let settings =
                config::Settings::from_values(&input, &output, min_size, force, max_diff, workers);
            if let Err(err) = settings.save(Path::new(config::SETTINGS_FILE)) {
                warn!(error = %err, "could not persist settings");
            }
            let min_size_bytes = (min_size * 1024.0 * 1024.0) as u64;
            execute_batch(&input, &output, max_diff, min_size_bytes, force, recursive, workers)
        }
        Commands::Rerun { settings } => {
            let settings = config::Settings::load(&settings)?;
            execute_batch(
                &settings.source_dir,
                &settings.dest_dir,
                settings.max_visual_diff(),
                settings.min_file_size_bytes(),
                settings.overwrite(),
                true,
                settings.threads(),
            )
        }
        Commands::Analyze { input, output } => analyze(&input, output),
        Commands::Verify {
            original,
            converted,
        } => verify(&original, &converted),
    }
}

/// Per-job console feedback, driven by the synchronous job notifications.
struct ConsoleListener {
    bar: ProgressBar,
}

impl JobListener for ConsoleListener {
    fn state_change(&self, job: &OptimizationJob) {
        let state = job.state();
        match state {
            JobState::Optimizing => {
                if let Some(name) = job.src().file_name() {
                    self.bar.set_message(name.to_string_lossy().into_owned());
                }
            }
            JobState::OptimizedOk => {
                let saved = job.earn_size().unwrap_or(0).max(0) as u64;
                let quality = job
                    .quality_found()
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "?".into());
                self.bar.println(format!(
                    "{} {} (quality {}, saved {})",
                    style("✓").green(),
                    job.src().display(),
                    quality,
                    format_bytes(saved),
                ));
            }
            JobState::OptimizedKo => {
                self.bar.println(format!(
                    "{} {} ({})",
                    style("✗").red(),
                    job.src().display(),
                    state.label(),
                ));
            }
            JobState::OptimizedUnnecessary | JobState::OptimizedOverwriteNotAllowed => {
                self.bar.println(format!(
                    "{} {} ({})",
                    style("-").dim(),
                    job.src().display(),
                    state.label(),
                ));
            }
            JobState::NotYetOptimized => {}
        }
    }
}

fn execute_batch(
    input: &Path,
    output: &Path,
    max_diff: f64,
    min_size_bytes: u64,
    overwrite: bool,
    recursive: bool,
    workers: usize,
) -> Result<()> {
    if !input.is_dir() {
        bail!("source {} is not a directory", input.display());
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let files = collect_jpeg_files(input, recursive);
    if files.is_empty() {
        println!("No JPEG files found under {}", input.display());
        return Ok(());
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:32.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    let listener: Arc<dyn JobListener> = Arc::new(ConsoleListener { bar: bar.clone() });

    let mut jobs = Vec::with_capacity(files.len());
    for (id, src) in files.iter().enumerate() {
        let relative = src.strip_prefix(input).unwrap_or(src.as_path());
        let dst = output.join(relative);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut job = OptimizationJob::new(id as u64, src.clone(), dst);
        job.set_listener(listener.clone());
        jobs.push(Arc::new(job));
    }

    let params = OptimizeParams {
        max_visual_diff: max_diff,
        min_file_size: min_size_bytes,
        overwrite,
    };
    let executor = BatchExecutor::new(workers);
    let report = executor.run(&jobs, &params, |_| bar.inc(1))?;
    bar.finish_and_clear();

    print_summary_report(&report);
    Ok(())
}

fn analyze(input: &Path, output: OutputFormat) -> Result<()> {
    let size = fs::metadata(input)
        .with_context(|| format!("Failed to read {}", input.display()))?
        .len();
    let quality = jpeg_core::read_quality(input)?;
    let exif = jpeg_core::read_exif_file(input);

    match output {
        OutputFormat::Human => {
            println!("File:             {}", input.display());
            println!("Size:             {}", format_bytes(size));
            match quality {
                Some(q) => println!("Recorded quality: {}%", q),
                None => println!("Recorded quality: unknown (no trailer)"),
            }
            match exif {
                Ok(exif) if !exif.is_empty() => {
                    println!("EXIF tags ({}):", exif.len());
                    for tag in exif.sorted_tags() {
                        match &tag.value {
                            Some(value) => println!("  {} = {}", tag.full_title(), value),
                            None => println!("  {} (undecoded)", tag.full_title()),
                        }
                    }
                }
                Ok(_) => println!("No EXIF metadata."),
                Err(err) => println!("EXIF unreadable: {}", err),
            }
        }
        OutputFormat::Json => {
            let (tags, exif_error) = match exif {
                Ok(exif) => (
                    Some(exif.sorted_tags().into_iter().cloned().collect::<Vec<_>>()),
                    None,
                ),
                Err(err) => (None, Some(err.to_string())),
            };
            let value = json!({
                "file": input.display().to_string(),
                "size": size,
                "recorded_quality": quality,
                "exif": tags,
                "exif_error": exif_error,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn verify(original: &Path, converted: &Path) -> Result<()> {
    let diff = jpeg_core::similarity::compare_files(original, converted)? * 100.0;
    println!("Visual difference: {:.4}%", diff);
    println!("Assessment:        {}", diff_description(diff));
    Ok(())
}

fn diff_description(diff_percent: f64) -> &'static str {
    if diff_percent == 0.0 {
        "identical"
    } else if diff_percent < 0.5 {
        "visually identical"
    } else if diff_percent < 2.0 {
        "minimal difference"
    } else if diff_percent < 5.0 {
        "noticeable difference"
    } else {
        "strong difference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_description_thresholds() {
        assert_eq!(diff_description(0.0), "identical");
        assert_eq!(diff_description(0.3), "visually identical");
        assert_eq!(diff_description(1.5), "minimal difference");
        assert_eq!(diff_description(3.0), "noticeable difference");
        assert_eq!(diff_description(10.0), "strong difference");
    }
}
