use crate::error::{FileMetaError, UserFriendlyError};
use crate::report::MetadataReport;
use crate::scanner::ScanStatistics;
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

/// Console rendering of run results. Diagnostics go through `tracing`;
/// this only prints what the user asked for.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = mode == OutputMode::Human
            && !quiet
            && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    /// Fatal errors are printed even in quiet mode.
    pub fn print_user_friendly_error(&self, error: &FileMetaError) {
        let message = error.user_message();
        let suggestion = error.suggestion();

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    eprintln!("{}{}", CROSS, style(&message).red().bold());
                } else {
                    eprintln!("✗ {}", message);
                }
                if let Some(suggestion) = suggestion {
                    eprintln!();
                    if self.use_colors {
                        eprintln!("{}{}", INFO, style(format!("Suggestion: {}", suggestion)).cyan());
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
            }
            OutputMode::Json => print_json(&serde_json::json!({
                "type": "error",
                "message": message,
                "suggestion": suggestion,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
            OutputMode::Plain => {
                eprintln!("ERROR: {}", message);
                if let Some(suggestion) = suggestion {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Completion message printed once the report file has been written.
    pub fn print_report_summary(&self, report: &MetadataReport, output: &Path) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(report, output),
            OutputMode::Json => print_json(&summary_json(report, output)),
            OutputMode::Plain => {
                println!("COMPLETED: {}", output.display());
                println!("Files processed: {}", report.len());
                println!("Duration: {}", format_duration(report.duration));
                println!("Failures: {}", report.failures.len());
                println!("Scan errors: {}", report.scan_errors.len());
            }
        }
    }

    /// Per-type counts for a dry run.
    pub fn print_scan_statistics(&self, root: &Path, stats: &ScanStatistics) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style("Dry Run").bold().cyan());
                } else {
                    println!("=== Dry Run ===");
                }
                println!("Root: {}", root.display());
                print!("{}", stats.display_summary());
            }
            OutputMode::Json => {
                let by_type: serde_json::Map<String, serde_json::Value> = stats
                    .files_by_type
                    .iter()
                    .map(|(file_type, count)| (file_type.to_string(), (*count).into()))
                    .collect();
                print_json(&serde_json::json!({
                    "type": "dry_run",
                    "root": root.display().to_string(),
                    "total_files": stats.total_files,
                    "files_by_type": by_type,
                }));
            }
            OutputMode::Plain => {
                println!("DRY RUN: {}", root.display());
                println!("Files: {}", stats.total_files);
                for (file_type, count) in &stats.files_by_type {
                    println!("{}: {}", file_type, count);
                }
            }
        }
    }

    fn print_human_summary(&self, report: &MetadataReport, output: &Path) {
        let rule = if self.use_colors {
            style("─".repeat(60)).dim().to_string()
        } else {
            "-".repeat(60)
        };

        println!();
        println!("{}", rule);
        let done = format!("Metadata extraction complete. Output saved to {}", output.display());
        if self.use_colors {
            println!("{}{}", CHECKMARK, style(done).green().bold());
        } else {
            println!("✓ {}", done);
        }

        println!();
        println!("  Files processed: {}", self.highlight(report.len()));
        for (file_type, count) in report.files_by_type() {
            println!("    {}: {}", file_type, count);
        }
        println!("  Time taken:      {}", self.highlight(format_duration(report.duration)));

        if !report.failures.is_empty() {
            println!("  Extraction failures: {}", report.failures.len());
            if self.verbose_level >= 1 {
                for failure in &report.failures {
                    println!("    - [{}] {}: {}", failure.kind, failure.path, failure.reason);
                }
            }
        }
        if !report.scan_errors.is_empty() {
            println!("  Unreadable entries: {}", report.scan_errors.len());
        }
        println!("{}", rule);
    }

    fn highlight(&self, value: impl ToString) -> String {
        if self.use_colors {
            style(value.to_string()).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }
}

fn summary_json(report: &MetadataReport, output: &Path) -> serde_json::Value {
    let by_type: serde_json::Map<String, serde_json::Value> = report
        .files_by_type()
        .into_iter()
        .map(|(file_type, count)| (file_type.to_string(), count.into()))
        .collect();

    serde_json::json!({
        "type": "summary",
        "root": report.root,
        "output": output.display().to_string(),
        "files_processed": report.len(),
        "files_by_type": by_type,
        "duration_ms": report.duration.as_millis(),
        "failures": report.failures,
        "scan_errors": report.scan_errors,
        "started_at": report.started_at.to_rfc3339(),
    })
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode, OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::ZERO), "0ms");
    }
}
