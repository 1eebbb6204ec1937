use crate::error::{FileMetaError, Result};
use crate::report::{FileRecord, ReportFormat, COLUMNS};
use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Serialises the collected rows to a single tabular file.
///
/// Always writes a header row, one row per record, and silently replaces
/// any existing file at the output path.
pub struct ReportWriter {
    path: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(path: P, format: ReportFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, records: &[FileRecord]) -> Result<()> {
        match self.format {
            ReportFormat::Xlsx => self.write_xlsx(records),
            ReportFormat::Csv => self.write_csv(records),
            ReportFormat::Json => self.write_json(records),
        }
    }

    fn write_xlsx(&self, records: &[FileRecord]) -> Result<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, name) in COLUMNS.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *name, &header)
                .map_err(|e| self.write_error(e))?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = (index + 1) as u32;
            for (col, cell) in record.cells().iter().enumerate() {
                // Absent values stay as empty cells.
                if let Some(value) = cell {
                    worksheet
                        .write_string(row, col as u16, *value)
                        .map_err(|e| self.write_error(e))?;
                }
            }
        }

        workbook.save(&self.path).map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn write_csv(&self, records: &[FileRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path).map_err(|e| self.write_error(e))?;

        writer.write_record(COLUMNS).map_err(|e| self.write_error(e))?;
        for record in records {
            writer
                .write_record(record.cells().iter().map(|cell| cell.unwrap_or("")))
                .map_err(|e| self.write_error(e))?;
        }

        writer.flush().map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn write_json(&self, records: &[FileRecord]) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| self.write_error(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records).map_err(|e| self.write_error(e))?;
        // BufWriter drops flush errors silently.
        writer.flush().map_err(|e| self.write_error(e))
    }

    fn write_error(&self, error: impl std::fmt::Display) -> FileMetaError {
        FileMetaError::ReportWrite {
            path: self.path.display().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileType;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn sample_records() -> Vec<FileRecord> {
        vec![
            FileRecord {
                filename: "a.pdf".to_string(),
                creation_date: Some("06/15/2023 14:30:22".to_string()),
                modification_date: None,
                file_type: FileType::Pdf,
                path: "Reports".to_string(),
                folder_name: "Reports".to_string(),
                from_email: None,
                to_email: None,
                cc_email: None,
            },
            FileRecord {
                filename: "c.msg".to_string(),
                creation_date: None,
                modification_date: None,
                file_type: FileType::Email,
                path: String::new(),
                folder_name: String::new(),
                from_email: Some("Alice <alice@example.com>".to_string()),
                to_email: Some("bob@example.com".to_string()),
                cc_email: None,
            },
        ]
    }

    #[test]
    fn test_csv_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");

        ReportWriter::new(&path, ReportFormat::Csv)
            .write(&sample_records())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Filename,Creation Date,Modification Date,File Type,Path,Folder Name,From Email,To Email,CC Email"
        );
        assert_eq!(lines[1], "a.pdf,06/15/2023 14:30:22,,PDF,Reports,Reports,,,");
        assert_eq!(
            lines[2],
            "c.msg,,,Email,,,Alice <alice@example.com>,bob@example.com,"
        );
    }

    #[test]
    fn test_json_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        ReportWriter::new(&path, ReportFormat::Json)
            .write(&sample_records())
            .unwrap();

        let rows: Vec<FileRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows, sample_records());
    }

    #[test]
    fn test_xlsx_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.xlsx");

        ReportWriter::new(&path, ReportFormat::Xlsx)
            .write(&sample_records())
            .unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut strings = String::new();
        archive
            .by_name("xl/sharedStrings.xml")
            .unwrap()
            .read_to_string(&mut strings)
            .unwrap();

        for column in COLUMNS {
            assert!(strings.contains(column), "missing header {}", column);
        }
        assert!(strings.contains("06/15/2023 14:30:22"));
        assert!(strings.contains("alice@example.com"));
    }

    #[test]
    fn test_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");
        fs::write(&path, "stale content that is much longer than the header line\n".repeat(50)).unwrap();

        ReportWriter::new(&path, ReportFormat::Csv).write(&[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("Filename,"));
    }

    #[test]
    fn test_unwritable_location() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("report.json");

        let result = ReportWriter::new(&path, ReportFormat::Json).write(&sample_records());
        assert!(matches!(result, Err(FileMetaError::ReportWrite { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_full_device_is_a_write_error() {
        // Small reports stay in the buffer until the final flush.
        for format in [ReportFormat::Json, ReportFormat::Csv] {
            let result = ReportWriter::new("/dev/full", format).write(&sample_records());
            assert!(
                matches!(result, Err(FileMetaError::ReportWrite { .. })),
                "{:?} reported success on a full device",
                format
            );
        }
    }
}
