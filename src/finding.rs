use crate::hasher::ContentDigest;
use crate::policy::{PermissionMode, Policy};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// What would be done to the flagged file once authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Delete,
    SetMode(PermissionMode),
    /// New file name inside the same directory.
    RenameTo(OsString),
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Delete => "Delete",
            Action::SetMode(_) => "Change permissions",
            Action::RenameTo(_) => "Rename",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Delete => f.write_str("delete"),
            Action::SetMode(mode) => write!(f, "chmod {}", mode.octal()),
            Action::RenameTo(name) => write!(f, "rename to {}", name.to_string_lossy()),
        }
    }
}

/// A path and its modification time, as seen when its group was ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Policy-specific context shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Empty,
    Temp {
        suffix: String,
    },
    Duplicate {
        digest: ContentDigest,
        retained: GroupMember,
        modified: SystemTime,
        group_size: usize,
    },
    SameName {
        retained: GroupMember,
        modified: SystemTime,
        group_size: usize,
    },
    Permissions {
        current: PermissionMode,
        desired: PermissionMode,
    },
    Name {
        current: OsString,
        proposed: OsString,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub policy: Policy,
    pub path: PathBuf,
    pub size: u64,
    pub action: Action,
    pub detail: Detail,
}

impl Finding {
    /// One-line summary of the policy-specific detail.
    pub fn summary(&self) -> String {
        match &self.detail {
            Detail::Empty => "empty file".to_string(),
            Detail::Temp { suffix } => format!("matches '{}', {} bytes", suffix, self.size),
            Detail::Duplicate {
                digest, retained, ..
            } => format!("copy of {} ({})", retained.path.display(), digest),
            Detail::SameName { retained, .. } => {
                format!("older than {}", retained.path.display())
            }
            Detail::Permissions { current, desired } => {
                format!("{} -> {}", current.octal(), desired.octal())
            }
            Detail::Name { current, proposed } => format!(
                "{} -> {}",
                current.to_string_lossy(),
                proposed.to_string_lossy()
            ),
        }
    }
}

pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.detail {
            Detail::Empty => write!(f, "Empty file: {}", path),
            Detail::Temp { suffix } => write!(
                f,
                "Temporary file: {} (matches '{}', {} bytes)",
                path, suffix, self.size
            ),
            Detail::Duplicate {
                retained,
                modified,
                group_size,
                ..
            } => {
                writeln!(
                    f,
                    "Duplicates found ({} files, {} bytes each), oldest retained: {} (modified {})",
                    group_size,
                    self.size,
                    retained.path.display(),
                    format_time(retained.modified)
                )?;
                write!(f, "  Copy: {} (modified {})", path, format_time(*modified))
            }
            Detail::SameName {
                retained,
                modified,
                group_size,
            } => {
                let name = self
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                writeln!(f, "Files named {} ({} files)", name, group_size)?;
                writeln!(
                    f,
                    "  Retained version (newest): {} (modified {})",
                    retained.path.display(),
                    format_time(retained.modified)
                )?;
                write!(
                    f,
                    "  Older version: {} (modified {})",
                    path,
                    format_time(*modified)
                )
            }
            Detail::Permissions { current, desired } => {
                writeln!(f, "File: {}", path)?;
                write!(
                    f,
                    "  Current permissions: {} ({})  Expected: {} ({})",
                    current.octal(),
                    current,
                    desired.octal(),
                    desired
                )
            }
            Detail::Name { proposed, .. } => {
                writeln!(f, "File with problematic name: {}", path)?;
                write!(f, "  Proposed new name: {}", proposed.to_string_lossy())
            }
        }
    }
}
