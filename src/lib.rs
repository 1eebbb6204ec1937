pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod report;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ConvertConfig, ReportConfig, ScanConfig};
pub use error::{ExtractError, FileMetaError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    CommandConverter, DisabledConverter, DocConverter, DocumentDates, EmailFields,
    ExtractedMetadata, MetadataExtractor,
};
pub use report::{ExtractionFailure, FileRecord, MetadataReport, ReportFormat, ReportWriter};
pub use scanner::{DirectoryWalker, DocumentFormat, FileFilter, FileType, ScanStatistics, ScannedFile};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main library interface: walk, extract, report.
pub struct FileMeta {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    extractor: MetadataExtractor,
}

impl FileMeta {
    /// Create a new FileMeta instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Create a FileMeta instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(config, output_mode, verbose, quiet, GracefulShutdown::new_for_test())
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let extractor = build_extractor(&config, &shutdown);

        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(!quiet),
            shutdown,
            extractor,
        }
    }

    /// Create FileMeta instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Replace the legacy document converter.
    pub fn with_converter(mut self, converter: Box<dyn DocConverter>) -> Self {
        self.extractor = MetadataExtractor::new(converter);
        self
    }

    /// Scan `root`, extract metadata from every file and write the report.
    pub fn run<P: AsRef<Path>>(&self, root: P) -> Result<MetadataReport> {
        let root = root.as_ref();

        let report = self.collect_records(root)?;

        let writer = ReportWriter::new(&self.config.report.output_path, self.config.report.format);
        writer.write(&report.records)?;
        info!(
            path = %writer.path().display(),
            rows = report.len(),
            "report written"
        );

        self.output_formatter.print_report_summary(&report, writer.path());
        Ok(report)
    }

    /// Walk `root` and build one record per discovered file, in discovery order.
    ///
    /// Per-file extraction failures are logged and leave that row's metadata
    /// absent. Only an invalid root or cancellation abort the run.
    pub fn collect_records<P: AsRef<Path>>(&self, root: P) -> Result<MetadataReport> {
        let root = root.as_ref();
        let started = Instant::now();
        self.shutdown.check_shutdown()?;

        let walker = DirectoryWalker::new(&self.config.scan);
        let mut walk = walker.walk(root)?;
        let mut report = MetadataReport::new(root);

        let spinner = self.progress_manager.create_scan_spinner("Scanning files...");

        for file in walk.by_ref() {
            if let Err(e) = self.shutdown.check_shutdown() {
                spinner.abandon_with_message("Cancelled");
                return Err(e);
            }

            let display_path = file.display_path();
            ui::progress::update_scan_progress(&spinner, &display_path);
            debug!(path = %display_path, file_type = %file.file_type(), "reading metadata");

            let metadata = match self.extractor.extract(file.format, &file.source_path) {
                Ok(metadata) => Some(metadata),
                Err(ExtractError::ConversionCancelled { .. }) => {
                    spinner.abandon_with_message("Cancelled");
                    return Err(FileMetaError::Cancelled);
                }
                Err(e) => {
                    self.progress_manager.suspend(|| {
                        warn!(path = %display_path, kind = e.kind(), "{}", e);
                    });
                    report.push_failure(ExtractionFailure {
                        path: display_path,
                        kind: e.kind().to_string(),
                        reason: e.to_string(),
                    });
                    None
                }
            };

            report.push(FileRecord::assemble(&file, metadata.as_ref()));
        }

        report.scan_errors = walk.into_errors();
        report.duration = started.elapsed();

        ui::progress::finish_progress_with_summary(
            &spinner,
            &format!("Scanned {} files", report.len()),
            report.duration,
        );

        Ok(report)
    }

    /// Walk and classify only; nothing is read, converted or written.
    pub fn dry_run<P: AsRef<Path>>(&self, root: P) -> Result<ScanStatistics> {
        let root = root.as_ref();
        let walker = DirectoryWalker::new(&self.config.scan);
        let files = walker.scan_directory(root)?;
        let stats = walker.get_statistics(&files);

        self.output_formatter.print_scan_statistics(root, &stats);
        Ok(stats)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &FileMetaError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn build_extractor(config: &Config, shutdown: &GracefulShutdown) -> MetadataExtractor {
    if config.convert.enabled {
        let converter = CommandConverter::from_config(&config.convert)
            .with_running_flag(shutdown.running_flag());
        MetadataExtractor::new(Box::new(converter))
    } else {
        MetadataExtractor::default()
    }
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "filemeta {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
