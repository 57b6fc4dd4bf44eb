use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Display;

const S_IFMT: u32 = 0o170_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFREG: u32 = 0o100_000;

pub(crate) fn is_directory_mode(mode: u32) -> bool {
    mode & S_IFMT == S_IFDIR
}

pub(crate) fn is_file_mode(mode: u32) -> bool {
    mode & S_IFMT == S_IFREG
}

pub(crate) fn timestamp(mtime: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(i64::from(mtime), 0).unwrap_or_default()
}

/// Reply to a sync STAT request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AdbStatResponse {
    /// File type and permission bits, zero when the path does not exist
    pub mode: u32,
    pub size: u32,
    /// Seconds since the epoch
    pub mtime: u32,
}

impl AdbStatResponse {
    pub fn exists(&self) -> bool {
        self.mode != 0
    }

    pub fn is_directory(&self) -> bool {
        is_directory_mode(self.mode)
    }

    pub fn is_file(&self) -> bool {
        is_file_mode(self.mode)
    }

    pub fn modified(&self) -> DateTime<Utc> {
        timestamp(self.mtime)
    }
}

impl Display for AdbStatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "File permissions: {:o}", self.mode)?;
        writeln!(f, "File size: {} bytes", self.size)?;
        write!(f, "Modification time: {}", self.modified())
    }
}
