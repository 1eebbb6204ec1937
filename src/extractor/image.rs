use crate::error::ExtractError;
use crate::extractor::dates::format_exif_date;
use crate::extractor::DocumentDates;
use exif::{In, Reader, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const KIND: &str = "image";

/// Read `DateTimeOriginal` (creation) and `DateTime` (modification) from
/// the primary EXIF IFD. An image without EXIF yields absent dates.
pub fn read_image_dates(path: &Path) -> Result<DocumentDates, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(DocumentDates::default()),
        Err(exif::Error::Io(e)) => return Err(ExtractError::io(path, e)),
        Err(e) => return Err(ExtractError::malformed(KIND, path, e)),
    };

    let tags: HashMap<String, String> = exif
        .fields()
        .filter(|field| field.ifd_num == In::PRIMARY)
        .filter_map(|field| ascii_value(&field.value).map(|v| (field.tag.to_string(), v)))
        .collect();

    Ok(DocumentDates {
        created: tags.get("DateTimeOriginal").and_then(|v| format_exif_date(v)),
        modified: tags.get("DateTime").and_then(|v| format_exif_date(v)),
    })
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::fixtures::{jpeg_with_exif, JPEG_WITHOUT_EXIF};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reads_exif_dates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        fs::write(&path, jpeg_with_exif("2021:03:04 05:06:07", "2020:01:02 03:04:05")).unwrap();

        let dates = read_image_dates(&path).unwrap();
        assert_eq!(dates.created.as_deref(), Some("01/02/2020 03:04:05"));
        assert_eq!(dates.modified.as_deref(), Some("03/04/2021 05:06:07"));
    }

    #[test]
    fn test_unparseable_exif_date_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        fs::write(&path, jpeg_with_exif("    :  :     :  :  ", "2022:01:05 09:00:00")).unwrap();

        let dates = read_image_dates(&path).unwrap();
        assert_eq!(dates.created.as_deref(), Some("01/05/2022 09:00:00"));
        assert_eq!(dates.modified, None);
    }

    #[test]
    fn test_jpeg_without_exif() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");
        fs::write(&path, JPEG_WITHOUT_EXIF).unwrap();

        let dates = read_image_dates(&path).unwrap();
        assert_eq!(dates, DocumentDates::default());
    }

    #[test]
    fn test_not_an_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.jpg");
        fs::write(&path, b"this is plain text").unwrap();

        assert!(read_image_dates(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_image_dates(&temp_dir.path().join("gone.jpg"));
        assert!(matches!(result, Err(ExtractError::Io { .. })));
    }
}
