use crate::platform;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Point-in-time snapshot of a file's metadata.
///
/// Records are taken fresh for every policy; a record from one policy is never
/// reused by the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    /// Low nine permission bits.
    pub mode: u32,
}

impl FileRecord {
    pub fn read(path: &Path) -> io::Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified()?,
            mode: platform::permission_bits(&metadata),
        })
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }
}
