use crate::error::ExtractError;
use crate::extractor::dates::format_pdf_date;
use crate::extractor::DocumentDates;
use lopdf::{Dictionary, Document, Object};
use std::fs::File;
use std::path::Path;

const KIND: &str = "PDF";
const MAX_REFERENCE_DEPTH: usize = 32;

/// Read `CreationDate` / `ModDate` from the document information dictionary.
///
/// A PDF without an `/Info` entry yields absent dates, not an error.
pub fn read_pdf_dates(path: &Path) -> Result<DocumentDates, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let document =
        Document::load_from(file).map_err(|e| ExtractError::malformed(KIND, path, e))?;

    let info = match document.trailer.get(b"Info") {
        Ok(object) => object,
        Err(_) => return Ok(DocumentDates::default()),
    };

    let info = resolve(&document, info)
        .and_then(|object| object.as_dict().map_err(|e| e.to_string()))
        .map_err(|reason| ExtractError::malformed(KIND, path, format!("document info: {}", reason)))?;

    Ok(DocumentDates {
        created: info_date(&document, info, b"CreationDate"),
        modified: info_date(&document, info, b"ModDate"),
    })
}

fn info_date(document: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    let value = info.get(key).ok()?;
    match resolve(document, value).ok()? {
        Object::String(bytes, _) => format_pdf_date(&decode_text_string(bytes)),
        _ => None,
    }
}

fn resolve<'a>(document: &'a Document, mut object: &'a Object) -> Result<&'a Object, String> {
    for _ in 0..MAX_REFERENCE_DEPTH {
        match object {
            Object::Reference(id) => {
                object = document
                    .get_object(*id)
                    .map_err(|e| format!("unresolvable reference {} {}: {}", id.0, id.1, e))?;
            }
            _ => return Ok(object),
        }
    }

    Err("reference chain too deep".to_string())
}

/// PDF text strings are either UTF-16BE with a BOM or single-byte encoded.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
