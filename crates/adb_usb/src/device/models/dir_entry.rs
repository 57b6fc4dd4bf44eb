use chrono::{DateTime, Utc};

use super::adb_stat_response::{is_directory_mode, is_file_mode, timestamp};

/// One record of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub mode: u32,
    pub size: u32,
    pub modified: DateTime<Utc>,
    pub filename: String,
}

impl DirEntry {
    pub fn new(mode: u32, size: u32, mtime: u32, filename: String) -> Self {
        Self {
            mode,
            size,
            modified: timestamp(mtime),
            filename,
        }
    }

    pub fn is_directory(&self) -> bool {
        is_directory_mode(self.mode)
    }

    pub fn is_file(&self) -> bool {
        is_file_mode(self.mode)
    }
}
