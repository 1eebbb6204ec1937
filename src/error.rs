use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileMetaError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("Failed to write report {path}: {message}")]
    ReportWrite { path: String, message: String },
}

/// Failure while reading one file's metadata.
///
/// Never propagates past the per-file boundary: the pipeline records it
/// and emits a row with absent values instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {kind} file {}: {reason}", path.display())]
    Malformed {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("document converter `{command}` is not available")]
    ConverterUnavailable { command: String },

    #[error("conversion of {} failed: {reason}", path.display())]
    ConversionFailed { path: PathBuf, reason: String },

    #[error("conversion of {} timed out after {seconds}s", path.display())]
    ConversionTimedOut { path: PathBuf, seconds: u64 },

    #[error("conversion of {} was cancelled", path.display())]
    ConversionCancelled { path: PathBuf },
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(kind: &'static str, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ExtractError::Malformed {
            kind,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-friendly tag for the failure reason.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Io { .. } => "io",
            ExtractError::Malformed { .. } => "malformed",
            ExtractError::ConverterUnavailable { .. } => "converter-unavailable",
            ExtractError::ConversionFailed { .. } => "conversion-failed",
            ExtractError::ConversionTimedOut { .. } => "conversion-timeout",
            ExtractError::ConversionCancelled { .. } => "conversion-cancelled",
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for FileMetaError {
    fn user_message(&self) -> String {
        match self {
            FileMetaError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            FileMetaError::InvalidPath { path } => {
                format!("Invalid root directory: {}", path)
            }
            FileMetaError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            FileMetaError::Cancelled => "Operation was cancelled by user".to_string(),
            FileMetaError::ReportWrite { path, message } => {
                format!("Could not write report {}: {}", path, message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            FileMetaError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            FileMetaError::InvalidPath { .. } => Some(
                "Pass an existing directory as the ROOT argument.".to_string()
            ),
            FileMetaError::Permission { .. } => Some(
                "Ensure you have read permission for the directory tree being scanned.".to_string()
            ),
            FileMetaError::ReportWrite { .. } => Some(
                "Check that the output location is writable and the file is not open in another program, or choose another path with --output.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for FileMetaError {
    fn from(error: toml::de::Error) -> Self {
        FileMetaError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FileMetaError>;
