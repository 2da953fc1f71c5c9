//! Summary reporting for batch runs.

use std::time::Duration;

use crate::executor::BatchReport;

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

pub fn print_summary_report(report: &BatchReport) {
    let reduction = if report.input_bytes > 0 {
        (report.bytes_saved as f64 / report.input_bytes as f64) * 100.0
    } else {
        0.0
    };

    println!();
    println!("╔══════════════════════════════════════════════╗");
    println!("║           Optimization Summary               ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Files processed:      {:>10}            ║", report.total);
    println!("║  Optimized:            {:>10}            ║", report.optimized);
    println!("║  Failed:               {:>10}            ║", report.failed);
    println!("║  Unnecessary:          {:>10}            ║", report.unnecessary);
    println!(
        "║  Overwrite denied:     {:>10}            ║",
        report.overwrite_denied
    );
    println!("╠══════════════════════════════════════════════╣");
    println!(
        "║  Input size:           {:>10}            ║",
        format_bytes(report.input_bytes)
    );
    println!(
        "║  Saved:                {:>10}            ║",
        format_bytes(report.bytes_saved)
    );
    println!("║  Reduction:            {:>9.1}%            ║", reduction);
    println!("╠══════════════════════════════════════════════╣");
    println!(
        "║  Total time:           {:>10}            ║",
        format_duration(report.elapsed)
    );
    println!("╚══════════════════════════════════════════════╝");
}
