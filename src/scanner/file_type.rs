use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic file type shown in the report's `File Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "PDF")]
    Pdf,
    Image,
    Word,
    Excel,
    Email,
    Other,
}

impl FileType {
    pub const ALL: [FileType; 6] = [
        FileType::Pdf,
        FileType::Image,
        FileType::Word,
        FileType::Excel,
        FileType::Email,
        FileType::Other,
    ];

    /// Classify by case-insensitive filename suffix. Content is never inspected.
    pub fn from_filename(filename: &str) -> Self {
        DocumentFormat::from_filename(filename).file_type()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Image => "Image",
            FileType::Word => "Word",
            FileType::Excel => "Excel",
            FileType::Email => "Email",
            FileType::Other => "Other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete on-disk format, one step finer than [`FileType`]: it tells
/// the extractor whether a Word file needs conversion first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Jpeg,
    Docx,
    LegacyDoc,
    Xlsx,
    Msg,
    Unknown,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Self {
        // Suffix match on the whole name, not Path::extension, so a file
        // literally named ".pdf" still counts as a PDF.
        let name = filename.to_lowercase();

        if name.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if name.ends_with(".jpg") || name.ends_with(".jpeg") {
            DocumentFormat::Jpeg
        } else if name.ends_with(".docx") {
            DocumentFormat::Docx
        } else if name.ends_with(".doc") {
            DocumentFormat::LegacyDoc
        } else if name.ends_with(".xlsx") {
            DocumentFormat::Xlsx
        } else if name.ends_with(".msg") {
            DocumentFormat::Msg
        } else {
            DocumentFormat::Unknown
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            DocumentFormat::Pdf => FileType::Pdf,
            DocumentFormat::Jpeg => FileType::Image,
            DocumentFormat::Docx | DocumentFormat::LegacyDoc => FileType::Word,
            DocumentFormat::Xlsx => FileType::Excel,
            DocumentFormat::Msg => FileType::Email,
            DocumentFormat::Unknown => FileType::Other,
        }
    }
}
