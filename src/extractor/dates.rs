//! Normalisation of the three source date encodings into the report's
//! `MM/DD/YYYY HH:MM:SS` form. Every function returns `None` (the absence
//! value) instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const REPORT_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Format an already-structured timestamp.
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(REPORT_DATE_FORMAT).to_string()
}

/// `D:YYYYMMDDHHmmSS[...]` → `MM/DD/YYYY HH:MM:SS`.
///
/// Fields are sliced at fixed offsets and are not calendar-checked; the
/// fourteen characters after the prefix must all be ASCII digits.
pub fn format_pdf_date(raw: &str) -> Option<String> {
    let digits = raw.trim().strip_prefix("D:")?;
    let head = digits.get(..14)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!(
        "{}/{}/{} {}:{}:{}",
        &head[4..6],
        &head[6..8],
        &head[0..4],
        &head[8..10],
        &head[10..12],
        &head[12..14]
    ))
}

/// EXIF `YYYY:MM:DD HH:MM:SS` → `MM/DD/YYYY HH:MM:SS`.
pub fn format_exif_date(raw: &str) -> Option<String> {
    let raw = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(raw, EXIF_DATE_FORMAT)
        .ok()
        .map(|dt| format_datetime(&dt))
}

/// W3CDTF as found in Office core properties (`2023-06-15T14:30:22Z`).
///
/// The wall-clock value is kept as written; any UTC offset is dropped
/// rather than converted.
pub fn format_office_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_datetime(&dt.naive_local()));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(format_datetime(&dt));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| format_datetime(&dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_date() {
        assert_eq!(
            format_pdf_date("D:20230615143022").as_deref(),
            Some("06/15/2023 14:30:22")
        );
        assert_eq!(
            format_pdf_date("D:20230615143022+02'00'").as_deref(),
            Some("06/15/2023 14:30:22")
        );
        assert_eq!(
            format_pdf_date("  D:19991231235959Z ").as_deref(),
            Some("12/31/1999 23:59:59")
        );
    }

    #[test]
    fn test_pdf_date_rejects_bad_input() {
        assert_eq!(format_pdf_date("20230615143022"), None);
        assert_eq!(format_pdf_date("D:2023"), None);
        assert_eq!(format_pdf_date("D:2023061514302x"), None);
        assert_eq!(format_pdf_date(""), None);
        assert_eq!(format_pdf_date("D:2023é0615143022"), None);
    }

    #[test]
    fn test_exif_date() {
        assert_eq!(
            format_exif_date("2022:01:05 09:00:00").as_deref(),
            Some("01/05/2022 09:00:00")
        );
        assert_eq!(
            format_exif_date("2022:01:05 09:00:00\0").as_deref(),
            Some("01/05/2022 09:00:00")
        );
        assert_eq!(format_exif_date("0000:00:00 00:00:00"), None);
        assert_eq!(format_exif_date("2022-01-05 09:00:00"), None);
        assert_eq!(format_exif_date(""), None);
    }

    #[test]
    fn test_office_date() {
        assert_eq!(
            format_office_date("2023-06-15T14:30:22Z").as_deref(),
            Some("06/15/2023 14:30:22")
        );
        assert_eq!(
            format_office_date("2023-06-15T14:30:22+05:00").as_deref(),
            Some("06/15/2023 14:30:22")
        );
        assert_eq!(
            format_office_date("2023-06-15T14:30:22").as_deref(),
            Some("06/15/2023 14:30:22")
        );
        assert_eq!(
            format_office_date("2023-06-15").as_deref(),
            Some("06/15/2023 00:00:00")
        );
        assert_eq!(format_office_date("yesterday"), None);
        assert_eq!(format_office_date("   "), None);
    }
}
