pub mod directory_walker;
pub mod file_filter;
pub mod file_type;

pub use directory_walker::{DirectoryWalker, FileWalk, ScanStatistics, ScannedFile};
pub use file_filter::FileFilter;
pub use file_type::{DocumentFormat, FileType};
