pub mod converter;
pub mod dates;
pub mod email;
pub mod image;
pub mod office;
pub mod pdf;

#[cfg(test)]
pub(crate) mod fixtures;

pub use converter::{CommandConverter, DisabledConverter, DocConverter};

use crate::error::ExtractError;
use crate::scanner::DocumentFormat;
use std::path::Path;

/// Normalised creation/modification dates; `None` is the absence value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentDates {
    pub created: Option<String>,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailFields {
    pub from: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
}

/// What an extractor found for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedMetadata {
    Dates(DocumentDates),
    Email(EmailFields),
    /// The format has no extractor.
    Nothing,
}

impl ExtractedMetadata {
    pub fn dates(&self) -> Option<&DocumentDates> {
        match self {
            ExtractedMetadata::Dates(dates) => Some(dates),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&EmailFields> {
        match self {
            ExtractedMetadata::Email(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Dispatches each file to the reader for its format.
///
/// Every call is independent; a failure is returned as a tagged
/// [`ExtractError`] and never affects other files.
pub struct MetadataExtractor {
    converter: Box<dyn DocConverter>,
}

impl MetadataExtractor {
    pub fn new(converter: Box<dyn DocConverter>) -> Self {
        Self { converter }
    }

    pub fn extract(
        &self,
        format: DocumentFormat,
        path: &Path,
    ) -> Result<ExtractedMetadata, ExtractError> {
        match format {
            DocumentFormat::Pdf => pdf::read_pdf_dates(path).map(ExtractedMetadata::Dates),
            DocumentFormat::Jpeg => image::read_image_dates(path).map(ExtractedMetadata::Dates),
            DocumentFormat::Docx => {
                office::read_core_dates(path, "Word").map(ExtractedMetadata::Dates)
            }
            DocumentFormat::LegacyDoc => {
                let converted = self.converter.convert(path)?;
                office::read_core_dates(&converted, "Word").map(ExtractedMetadata::Dates)
            }
            DocumentFormat::Xlsx => {
                office::read_core_dates(path, "Excel").map(ExtractedMetadata::Dates)
            }
            DocumentFormat::Msg => email::read_message_fields(path).map(ExtractedMetadata::Email),
            DocumentFormat::Unknown => Ok(ExtractedMetadata::Nothing),
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(Box::new(DisabledConverter))
    }
}
