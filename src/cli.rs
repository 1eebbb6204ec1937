use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::report::ReportFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filemeta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect document metadata from a directory tree into a spreadsheet")]
#[command(
    long_about = "filemeta walks a directory tree, reads creation/modification dates from \
                  PDF, JPEG, Word and Excel files and sender/recipient fields from Outlook \
                  .msg files, and writes one row per file to a single report."
)]
#[command(after_help = "EXAMPLES:\n  \
    filemeta ~/Documents\n  \
    filemeta /srv/archive --output archive.xlsx --verbose\n  \
    filemeta ./case-files --format csv --exclude .git,node_modules\n  \
    filemeta ./legacy --no-convert --config my-config.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Root directory to scan
    #[arg(required_unless_present = "generate_config")]
    pub root: Option<PathBuf>,

    /// Report file path (defaults to file_metadata.xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report file format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for console messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Directories to exclude from the scan
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum directory depth to descend
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Skip converting legacy .doc files
    #[arg(long, help = "Do not run the document converter on .doc files")]
    pub no_convert: bool,

    /// Converter executable
    #[arg(long, help = "Converter command used for .doc files (default: libreoffice)")]
    pub converter: Option<String>,

    /// Converter timeout in seconds
    #[arg(long, help = "Timeout for a single .doc conversion (seconds)")]
    pub timeout: Option<u64>,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (classify files without reading metadata)
    #[arg(long, help = "Count files by type without extracting metadata or writing a report")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_exclude(self.exclude.clone())
            .with_max_depth(self.max_depth)
            .with_output_path(self.output.clone())
            .with_format(self.format)
            .with_no_convert(self.no_convert)
            .with_converter(self.converter.clone())
            .with_timeout(self.timeout)
    }

    /// Default `tracing` directive for this verbosity.
    pub fn log_directive(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "filemeta=error",
            (false, 0) => "filemeta=warn",
            (false, 1) => "filemeta=info",
            (false, _) => "filemeta=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["filemeta", "/data"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/data")));
        assert!(cli.output.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.no_convert);
        assert_eq!(cli.log_directive(), "filemeta=warn");
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "filemeta",
            "/data",
            "--output",
            "out.csv",
            "--format",
            "csv",
            "--exclude",
            ".git,node_modules",
            "--max-depth",
            "3",
            "--no-convert",
            "--timeout",
            "30",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.format, Some(ReportFormat::Csv));
        assert_eq!(
            cli.exclude,
            Some(vec![".git".to_string(), "node_modules".to_string()])
        );
        assert_eq!(cli.max_depth, Some(3));
        assert!(cli.no_convert);
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_directive(), "filemeta=debug");
    }

    #[test]
    fn test_root_required() {
        assert!(Cli::try_parse_from(["filemeta", "--dry-run"]).is_err());

        let cli = Cli::try_parse_from(["filemeta", "--generate-config"]).unwrap();
        assert!(cli.generate_config);
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["filemeta", "/data", "-q", "-v"]).is_err());

        let cli = Cli::try_parse_from(["filemeta", "/data", "-q"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.log_directive(), "filemeta=error");
    }

    #[test]
    fn test_overrides_applied_to_config() {
        let cli = Cli::try_parse_from([
            "filemeta",
            "/data",
            "--format",
            "json",
            "--converter",
            "soffice",
            "--no-convert",
        ])
        .unwrap();

        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());

        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.convert.command, "soffice");
        assert!(!config.convert.enabled);
    }
}
