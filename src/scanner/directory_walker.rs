use crate::config::ScanConfig;
use crate::error::{FileMetaError, Result};
use crate::scanner::file_filter::FileFilter;
use crate::scanner::file_type::{DocumentFormat, FileType};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// One regular file found under the scan root.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    /// Directory of the file relative to the root, empty for root-level files.
    pub relative_dir: String,
    /// Last component of `relative_dir`.
    pub folder_name: String,
    pub format: DocumentFormat,
}

impl ScannedFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let relative_dir_path = relative_path.parent().unwrap_or_else(|| Path::new(""));
        let relative_dir = relative_dir_path.to_string_lossy().into_owned();
        let folder_name = relative_dir_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let format = DocumentFormat::from_filename(&filename);

        Self {
            source_path,
            relative_path,
            filename,
            relative_dir,
            folder_name,
            format,
        }
    }

    pub fn file_type(&self) -> FileType {
        self.format.file_type()
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

pub struct DirectoryWalker {
    filter: FileFilter,
    max_depth: Option<usize>,
    follow_links: bool,
}

impl DirectoryWalker {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
            follow_links: config.follow_links,
        }
    }

    /// Start a lazy walk of `root`.
    ///
    /// A missing, non-directory or unreadable root is fatal. Errors on
    /// entries below the root are collected on the returned [`FileWalk`].
    pub fn walk<P: AsRef<Path>>(&self, root: P) -> Result<FileWalk<'_>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(FileMetaError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(FileMetaError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        if let Err(e) = std::fs::read_dir(root_path) {
            return Err(match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileMetaError::Permission {
                    path: root_path.display().to_string(),
                },
                _ => FileMetaError::Io(e),
            });
        }

        let mut walker = WalkDir::new(root_path)
            .follow_links(self.follow_links)
            // Sorting makes walkdir read each directory fully before yielding
            // from it, so .docx files produced by conversion are not rediscovered.
            .sort_by_file_name();

        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let filter = &self.filter;
        let entries = walker
            .into_iter()
            .filter_entry(move |e| should_traverse(filter, e));

        Ok(FileWalk {
            root: root_path.to_path_buf(),
            entries: Box::new(entries),
            filter,
            errors: Vec::new(),
        })
    }

    /// Walk eagerly and return every file found.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<ScannedFile>> {
        Ok(self.walk(root)?.collect())
    }

    pub fn get_statistics(&self, files: &[ScannedFile]) -> ScanStatistics {
        ScanStatistics::from_files(files)
    }
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

fn should_traverse(filter: &FileFilter, entry: &DirEntry) -> bool {
    // The root itself is always walked.
    if entry.depth() == 0 {
        return true;
    }

    if entry.file_type().is_dir() {
        return filter.should_traverse_directory(entry.path());
    }

    true
}

/// Lazy sequence of the regular files under a root, in discovery order.
pub struct FileWalk<'a> {
    root: PathBuf,
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
    filter: &'a FileFilter,
    errors: Vec<String>,
}

impl FileWalk<'_> {
    /// Entries that could not be read.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn record_error(&mut self, message: String) {
        warn!(error = %message, "skipping unreadable entry");
        self.errors.push(message);
    }
}

impl Iterator for FileWalk<'_> {
    type Item = ScannedFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let message = if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        format!("Permission denied: {}", err)
                    } else {
                        format!("Scan error: {}", err)
                    };
                    self.record_error(message);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                // Unfollowed link: a link to a file is listed like the file,
                // a link to a directory is not descended into.
                match std::fs::metadata(entry.path()) {
                    Ok(target) if target.is_file() => {}
                    Ok(_) => continue,
                    Err(e) => {
                        self.record_error(format!(
                            "Broken link {}: {}",
                            entry.path().display(),
                            e
                        ));
                        continue;
                    }
                }
            } else if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            if !self.filter.should_include_file(path) {
                continue;
            }

            match path.strip_prefix(&self.root) {
                Ok(relative) => {
                    return Some(ScannedFile::new(path.to_path_buf(), relative.to_path_buf()));
                }
                Err(_) => {
                    let message = format!(
                        "Cannot calculate relative path for {} from root {}",
                        path.display(),
                        self.root.display()
                    );
                    self.record_error(message);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub files_by_type: BTreeMap<FileType, usize>,
}

impl ScanStatistics {
    pub fn from_files(files: &[ScannedFile]) -> Self {
        let mut files_by_type = BTreeMap::new();
        for file in files {
            *files_by_type.entry(file.file_type()).or_insert(0) += 1;
        }

        Self {
            total_files: files.len(),
            files_by_type,
        }
    }

    pub fn display_summary(&self) -> String {
        let mut summary = format!("Scan Results:\n  Total files: {}\n", self.total_files);

        if !self.files_by_type.is_empty() {
            summary.push_str("  Files by type:\n");
            for (file_type, count) in &self.files_by_type {
                summary.push_str(&format!("    {}: {} files\n", file_type, count));
            }
        }

        summary
    }
}
