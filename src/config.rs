use crate::error::{FileMetaError, Result};
use crate::report::ReportFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const INPUT_PLACEHOLDER: &str = "{input}";
pub const OUTDIR_PLACEHOLDER: &str = "{outdir}";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub report: ReportConfig,
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: Option<usize>,
    pub follow_links: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    pub format: ReportFormat,
}

/// Headless converter used to turn legacy `.doc` files into `.docx`.
///
/// `{input}` and `{outdir}` in `args` are replaced with the legacy file
/// and its parent directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
    pub timeout: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("file_metadata.xlsx"),
            format: ReportFormat::Xlsx,
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "libreoffice".to_string(),
            args: vec![
                "--headless".to_string(),
                "--convert-to".to_string(),
                "docx".to_string(),
                INPUT_PLACEHOLDER.to_string(),
                "--outdir".to_string(),
                OUTDIR_PLACEHOLDER.to_string(),
            ],
            timeout: 120, // 2 minutes
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FileMetaError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FileMetaError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| FileMetaError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["filemeta.toml", ".filemeta.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref exclude) = cli_args.exclude {
            self.scan.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.scan.max_depth = Some(max_depth);
        }

        if let Some(ref output_path) = cli_args.output_path {
            self.report.output_path = output_path.clone();
        }

        // An explicit --format wins; otherwise `-o report.csv` means CSV.
        let inferred = cli_args
            .output_path
            .as_deref()
            .and_then(ReportFormat::from_path);
        if let Some(format) = cli_args.format.or(inferred) {
            self.report.format = format;
        }

        if cli_args.no_convert {
            self.convert.enabled = false;
        }

        if let Some(ref command) = cli_args.converter {
            self.convert.command = command.clone();
        }

        if let Some(timeout) = cli_args.timeout {
            self.convert.timeout = timeout;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| FileMetaError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| FileMetaError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.max_depth == Some(0) {
            return Err(FileMetaError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.scan.exclude_patterns {
            Regex::new(pattern).map_err(|e| FileMetaError::Config {
                message: format!("Invalid exclude pattern '{}': {}", pattern, e),
            })?;
        }

        if self.convert.enabled {
            if self.convert.command.trim().is_empty() {
                return Err(FileMetaError::Config {
                    message: "Converter command must not be empty".to_string(),
                });
            }

            if !self.convert.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
                return Err(FileMetaError::Config {
                    message: format!(
                        "Converter arguments must reference the input file with {}",
                        INPUT_PLACEHOLDER
                    ),
                });
            }

            if self.convert.timeout == 0 {
                return Err(FileMetaError::Config {
                    message: "Converter timeout must be greater than 0".to_string(),
                });
            }
        }

        if self.report.output_path.as_os_str().is_empty() {
            return Err(FileMetaError::Config {
                message: "Report output path must not be empty".to_string(),
            });
        }

        if let Some(parent) = self.report.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(FileMetaError::Config {
                    message: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }

        Ok(())
    }

    pub fn convert_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.convert.timeout)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub exclude: Option<Vec<String>>,
    pub max_depth: Option<usize>,
    pub output_path: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub no_convert: bool,
    pub converter: Option<String>,
    pub timeout: Option<u64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_output_path(mut self, output_path: Option<PathBuf>) -> Self {
        self.output_path = output_path;
        self
    }

    pub fn with_format(mut self, format: Option<ReportFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_no_convert(mut self, no_convert: bool) -> Self {
        self.no_convert = no_convert;
        self
    }

    pub fn with_converter(mut self, converter: Option<String>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.scan.exclude_dirs.is_empty());
        assert_eq!(config.scan.max_depth, None);
        assert!(!config.scan.follow_links);
        assert_eq!(config.report.output_path, PathBuf::from("file_metadata.xlsx"));
        assert_eq!(config.report.format, ReportFormat::Xlsx);
        assert!(config.convert.enabled);
        assert_eq!(config.convert.command, "libreoffice");
        assert_eq!(config.convert.timeout, 120);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.scan.max_depth = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.exclude_patterns = vec!["[unclosed".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.convert.args = vec!["--headless".to_string()];
        assert!(config.validate().is_err());

        // Converter settings are irrelevant once conversion is off.
        config.convert.enabled = false;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.report.output_path = PathBuf::from("/definitely/missing/dir/report.xlsx");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.convert.timeout = 42;
        config.report.format = ReportFormat::Csv;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.convert.timeout, 42);
        assert_eq!(loaded_config.report.format, ReportFormat::Csv);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[convert]\nenabled = false\n").unwrap();
        assert!(!config.convert.enabled);
        assert_eq!(config.convert.command, "libreoffice");
        assert_eq!(config.report.format, ReportFormat::Xlsx);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/no/such/filemeta.toml");
        assert!(matches!(result, Err(FileMetaError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_timeout(Some(5))
            .with_exclude(Some(vec!["node_modules".to_string()]))
            .with_format(Some(ReportFormat::Json))
            .with_no_convert(true);

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.convert.timeout, 5);
        assert!(!config.convert.enabled);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.scan.exclude_dirs, vec!["node_modules"]);
    }

    #[test]
    fn test_output_extension_selects_format() {
        let mut config = Config::default();
        config.merge_with_cli_args(
            &CliOverrides::new().with_output_path(Some(PathBuf::from("out/Report.CSV"))),
        );
        assert_eq!(config.report.format, ReportFormat::Csv);

        // An explicit format beats the extension.
        let mut config = Config::default();
        config.merge_with_cli_args(
            &CliOverrides::new()
                .with_output_path(Some(PathBuf::from("report.csv")))
                .with_format(Some(ReportFormat::Json)),
        );
        assert_eq!(config.report.format, ReportFormat::Json);

        // Unknown extensions keep the configured format.
        let mut config = Config::default();
        config.report.format = ReportFormat::Json;
        config.merge_with_cli_args(
            &CliOverrides::new().with_output_path(Some(PathBuf::from("report.txt"))),
        );
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[scan]"));
        assert!(sample.contains("[report]"));
        assert!(sample.contains("[convert]"));
        assert!(sample.contains("{input}"));
    }
}
