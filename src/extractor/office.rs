use crate::error::ExtractError;
use crate::extractor::dates::format_office_date;
use crate::extractor::DocumentDates;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const PACKAGE_RELATIONSHIPS: &str = "_rels/.rels";
const DEFAULT_CORE_PART: &str = "docProps/core.xml";
const CORE_PROPERTIES_REL: &str = "/metadata/core-properties";

/// Read `dcterms:created` / `dcterms:modified` from the core-properties
/// part of an Office Open XML package (`.docx`, `.xlsx`).
///
/// Only the two small XML parts are inflated; the document body is never
/// loaded. A package without a core-properties part yields absent dates.
pub fn read_core_dates(path: &Path, kind: &'static str) -> Result<DocumentDates, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ExtractError::malformed(kind, path, e))?;

    let core_part = match read_part(&mut archive, PACKAGE_RELATIONSHIPS) {
        Ok(Some(rels)) => core_part_from_relationships(&rels)
            .unwrap_or_else(|| DEFAULT_CORE_PART.to_string()),
        Ok(None) => DEFAULT_CORE_PART.to_string(),
        Err(e) => return Err(ExtractError::malformed(kind, path, e)),
    };

    let xml = match read_part(&mut archive, &core_part) {
        Ok(Some(xml)) => xml,
        Ok(None) => return Ok(DocumentDates::default()),
        Err(e) => return Err(ExtractError::malformed(kind, path, e)),
    };

    parse_core_properties(&xml).map_err(|e| ExtractError::malformed(kind, path, e))
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>, String> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(format!("{}: {}", name, e)),
    };

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| format!("{}: {}", name, e))?;
    Ok(Some(content))
}

/// Locate the core-properties target in the package relationships.
fn core_part_from_relationships(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    if let Some(target) = core_target(&e) {
                        return Some(target);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

fn core_target(element: &BytesStart<'_>) -> Option<String> {
    let mut is_core = false;
    let mut target = None;

    for attr in element.attributes().flatten() {
        let value = attr.unescape_value().ok()?;
        match attr.key.local_name().as_ref() {
            b"Type" => is_core = value.ends_with(CORE_PROPERTIES_REL),
            b"Target" => target = Some(value.trim_start_matches('/').to_string()),
            _ => {}
        }
    }

    if is_core {
        target
    } else {
        None
    }
}

#[derive(Clone, Copy)]
enum CoreField {
    Created,
    Modified,
}

fn parse_core_properties(xml: &str) -> Result<DocumentDates, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut dates = DocumentDates::default();
    let mut current = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = match e.local_name().as_ref() {
                    b"created" => Some(CoreField::Created),
                    b"modified" => Some(CoreField::Modified),
                    _ => None,
                };
            }
            Event::Text(text) => {
                if let Some(field) = current {
                    let value = format_office_date(&text.unescape()?);
                    match field {
                        CoreField::Created => dates.created = value,
                        CoreField::Modified => dates.modified = value,
                    }
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(dates)
}
