use crate::config::ScanConfig;
use regex::Regex;
use std::path::Path;

/// Optional pruning of the walk. With the default [`ScanConfig`] nothing
/// is excluded and every directory is traversed.
pub struct FileFilter {
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &ScanConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        }
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            let dir_name_lower = dir_name.to_lowercase();

            if self
                .exclude_dirs
                .iter()
                .any(|exclude| exclude.to_lowercase() == dir_name_lower)
            {
                return false;
            }
        }

        !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn should_include_file(&self, path: &Path) -> bool {
        !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

    pub fn is_empty(&self) -> bool {
        self.exclude_dirs.is_empty() && self.exclude_patterns.is_empty()
    }

    pub fn get_exclude_dirs(&self) -> &Vec<String> {
        &self.exclude_dirs
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}
