pub mod writer;

pub use writer::ReportWriter;

use crate::extractor::ExtractedMetadata;
use crate::scanner::{FileType, ScannedFile};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Report column headers, in output order.
pub const COLUMNS: [&str; 9] = [
    "Filename",
    "Creation Date",
    "Modification Date",
    "File Type",
    "Path",
    "Folder Name",
    "From Email",
    "To Email",
    "CC Email",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Excel workbook
    Xlsx,
    /// Comma-separated values
    Csv,
    /// JSON array of row objects
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    /// Format implied by a report path's extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        [ReportFormat::Xlsx, ReportFormat::Csv, ReportFormat::Json]
            .into_iter()
            .find(|format| format.extension() == extension)
    }
}

/// One report row. Built once per discovered file and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Creation Date")]
    pub creation_date: Option<String>,
    #[serde(rename = "Modification Date")]
    pub modification_date: Option<String>,
    #[serde(rename = "File Type")]
    pub file_type: FileType,
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Folder Name")]
    pub folder_name: String,
    #[serde(rename = "From Email")]
    pub from_email: Option<String>,
    #[serde(rename = "To Email")]
    pub to_email: Option<String>,
    #[serde(rename = "CC Email")]
    pub cc_email: Option<String>,
}

impl FileRecord {
    /// Combine a scanned file with whatever its extractor produced.
    /// `None` (a failed extraction) leaves every metadata field absent.
    pub fn assemble(file: &ScannedFile, metadata: Option<&ExtractedMetadata>) -> Self {
        let dates = metadata.and_then(ExtractedMetadata::dates);
        let email = metadata.and_then(ExtractedMetadata::email);

        Self {
            filename: file.filename.clone(),
            creation_date: dates.and_then(|d| d.created.clone()),
            modification_date: dates.and_then(|d| d.modified.clone()),
            file_type: file.file_type(),
            path: file.relative_dir.clone(),
            folder_name: file.folder_name.clone(),
            from_email: email.and_then(|e| e.from.clone()),
            to_email: email.and_then(|e| e.to.clone()),
            cc_email: email.and_then(|e| e.cc.clone()),
        }
    }

    /// Cell values in [`COLUMNS`] order; absent fields are `None`.
    pub fn cells(&self) -> [Option<&str>; 9] {
        [
            Some(self.filename.as_str()),
            self.creation_date.as_deref(),
            self.modification_date.as_deref(),
            Some(self.file_type.as_str()),
            Some(self.path.as_str()),
            Some(self.folder_name.as_str()),
            self.from_email.as_deref(),
            self.to_email.as_deref(),
            self.cc_email.as_deref(),
        ]
    }
}

/// A per-file extraction failure, downgraded to absent values in the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub path: String,
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataReport {
    pub root: String,
    pub records: Vec<FileRecord>,
    pub failures: Vec<ExtractionFailure>,
    pub scan_errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl MetadataReport {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().display().to_string(),
            records: Vec::new(),
            failures: Vec::new(),
            scan_errors: Vec::new(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn push(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    pub fn push_failure(&mut self, failure: ExtractionFailure) {
        self.failures.push(failure);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn files_by_type(&self) -> BTreeMap<FileType, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.file_type).or_insert(0) += 1;
        }
        counts
    }
}
