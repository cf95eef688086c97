use super::{ModeParseError, PermissionMode, Policy};
use crate::finding::{Action, Detail, Finding};
use crate::record::FileRecord;
use std::ffi::{OsStr, OsString};
use thiserror::Error;

/// A stateless per-file check.
pub trait Evaluator {
    fn policy(&self) -> Policy;
    fn evaluate(&self, record: &FileRecord) -> Option<Finding>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyPolicy;

impl Evaluator for EmptyPolicy {
    fn policy(&self) -> Policy {
        Policy::Empty
    }

    fn evaluate(&self, record: &FileRecord) -> Option<Finding> {
        (record.size == 0).then(|| Finding {
            policy: Policy::Empty,
            path: record.path.clone(),
            size: 0,
            action: Action::Delete,
            detail: Detail::Empty,
        })
    }
}

/// Flags names ending in any configured suffix (exact, case-sensitive).
#[derive(Debug, Clone)]
pub struct TempPolicy {
    extensions: Vec<String>,
}

impl TempPolicy {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .filter(|ext| !ext.is_empty())
                .cloned()
                .collect(),
        }
    }
}

impl Evaluator for TempPolicy {
    fn policy(&self) -> Policy {
        Policy::Temp
    }

    fn evaluate(&self, record: &FileRecord) -> Option<Finding> {
        // raw bytes, so names that are not UTF-8 still match
        let name = record.file_name()?.as_encoded_bytes();
        let suffix = self
            .extensions
            .iter()
            .find(|ext| name.ends_with(ext.as_bytes()))?;
        Some(Finding {
            policy: Policy::Temp,
            path: record.path.clone(),
            size: record.size,
            action: Action::Delete,
            detail: Detail::Temp {
                suffix: suffix.clone(),
            },
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributePolicy {
    desired: PermissionMode,
}

impl AttributePolicy {
    pub fn new(desired: PermissionMode) -> Self {
        Self { desired }
    }

    /// Parses the symbolic `desired_mode` setting.
    pub fn from_symbolic(desired_mode: &str) -> Result<Self, ModeParseError> {
        desired_mode.parse().map(Self::new)
    }

    pub fn desired(&self) -> PermissionMode {
        self.desired
    }
}

impl Evaluator for AttributePolicy {
    fn policy(&self) -> Policy {
        Policy::Attributes
    }

    fn evaluate(&self, record: &FileRecord) -> Option<Finding> {
        let current = PermissionMode::from_bits(record.mode);
        (current != self.desired).then(|| Finding {
            policy: Policy::Attributes,
            path: record.path.clone(),
            size: record.size,
            action: Action::SetMode(self.desired),
            detail: Detail::Permissions {
                current,
                desired: self.desired,
            },
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenameConfigError {
    #[error("substitute_char must be exactly one character, got {0:?}")]
    Substitute(String),

    #[error("substitute_char {0:?} cannot appear in a file name")]
    UnsafeSubstitute(char),
}

#[derive(Debug, Clone)]
pub struct RenamePolicy {
    problematic: Vec<char>,
    substitute: char,
}

impl RenamePolicy {
    pub fn new(problematic_chars: &str, substitute_char: &str) -> Result<Self, RenameConfigError> {
        let mut chars = substitute_char.chars();
        let substitute = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(RenameConfigError::Substitute(substitute_char.to_string())),
        };
        if std::path::is_separator(substitute) || substitute == '\0' {
            return Err(RenameConfigError::UnsafeSubstitute(substitute));
        }
        Ok(Self {
            problematic: problematic_chars.chars().collect(),
            substitute,
        })
    }
}

/// Replace every problematic character with `substitute` in a single pass over
/// `name`. Substituted characters are never re-examined.
pub fn sanitize_name(name: &str, problematic: &[char], substitute: char) -> String {
    name.chars()
        .map(|c| if problematic.contains(&c) { substitute } else { c })
        .collect()
}

/// [`sanitize_name`] over a raw file name. Byte runs that are not valid UTF-8
/// are carried over unchanged.
#[cfg(unix)]
pub fn sanitize_os_name(name: &OsStr, problematic: &[char], substitute: char) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let mut sanitized = Vec::with_capacity(name.len());
    for chunk in name.as_bytes().utf8_chunks() {
        let clean = sanitize_name(chunk.valid(), problematic, substitute);
        sanitized.extend_from_slice(clean.as_bytes());
        sanitized.extend_from_slice(chunk.invalid());
    }
    OsString::from_vec(sanitized)
}

/// Names that are not valid Unicode come back unchanged and are never renamed.
#[cfg(not(unix))]
pub fn sanitize_os_name(name: &OsStr, problematic: &[char], substitute: char) -> OsString {
    match name.to_str() {
        Some(name) => OsString::from(sanitize_name(name, problematic, substitute)),
        None => {
            tracing::warn!("Cannot sanitize non-Unicode file name {:?}", name);
            name.to_os_string()
        }
    }
}

impl Evaluator for RenamePolicy {
    fn policy(&self) -> Policy {
        Policy::Rename
    }

    fn evaluate(&self, record: &FileRecord) -> Option<Finding> {
        let name = record.file_name()?;
        let proposed = sanitize_os_name(name, &self.problematic, self.substitute);
        // a substitute that is itself "problematic" would otherwise propose a self-rename
        if proposed.as_os_str() == name {
            return None;
        }
        Some(Finding {
            policy: Policy::Rename,
            path: record.path.clone(),
            size: record.size,
            action: Action::RenameTo(proposed.clone()),
            detail: Detail::Name {
                current: name.to_os_string(),
                proposed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn record(path: &str, size: u64, mode: u32) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size,
            modified: SystemTime::UNIX_EPOCH,
            mode,
        }
    }

    #[test]
    fn test_empty_policy() {
        assert!(EmptyPolicy.evaluate(&record("/d/empty.txt", 0, 0o644)).is_some());
        assert!(EmptyPolicy.evaluate(&record("/d/full.txt", 1, 0o644)).is_none());
    }

    #[test]
    fn test_temp_policy_suffix_is_exact_and_case_sensitive() {
        let policy = TempPolicy::new(&[".tmp".to_string(), "~".to_string(), String::new()]);

        let hit = policy.evaluate(&record("/d/temp_file.tmp", 25, 0o644)).unwrap();
        assert_eq!(hit.action, Action::Delete);
        assert_eq!(
            hit.detail,
            Detail::Temp {
                suffix: ".tmp".to_string()
            }
        );
        assert!(policy.evaluate(&record("/d/notes.txt~", 1, 0o644)).is_some());
        assert!(policy.evaluate(&record("/d/REPORT.TMP", 1, 0o644)).is_none());
        assert!(policy.evaluate(&record("/d/tmp.txt", 1, 0o644)).is_none());
    }

    #[test]
    fn test_attribute_policy_flags_mismatch() {
        let policy = AttributePolicy::from_symbolic("rw-r--r--").unwrap();
        let finding = policy.evaluate(&record("/d/bad.txt", 3, 0o777)).unwrap();
        assert_eq!(
            finding.action,
            Action::SetMode(PermissionMode::from_bits(0o644))
        );
        assert_eq!(
            finding.detail,
            Detail::Permissions {
                current: PermissionMode::from_bits(0o777),
                desired: PermissionMode::from_bits(0o644),
            }
        );
        assert!(policy.evaluate(&record("/d/good.txt", 3, 0o644)).is_none());
    }

    #[test]
    fn test_attribute_policy_rejects_malformed_mode() {
        assert_eq!(
            AttributePolicy::from_symbolic("rw-r--r-").unwrap_err(),
            ModeParseError::WrongLength(8)
        );
    }

    #[test]
    fn test_sanitize_replaces_each_character_once() {
        assert_eq!(sanitize_name("a:b?c.txt", &[':', '?'], '.'), "a.b.c.txt");
        assert_eq!(sanitize_name("x::?y", &[':', '?'], '_'), "x___y");
        assert_eq!(sanitize_name("clean.txt", &[':', '?'], '.'), "clean.txt");
    }

    #[test]
    fn test_rename_policy() {
        let policy = RenamePolicy::new(":?", ".").unwrap();
        let finding = policy
            .evaluate(&record("/d/problematic:file?name.txt", 10, 0o644))
            .unwrap();
        assert_eq!(
            finding.action,
            Action::RenameTo("problematic.file.name.txt".into())
        );
        assert!(policy.evaluate(&record("/d/fine.txt", 10, 0o644)).is_none());
    }

    #[test]
    fn test_rename_policy_skips_self_rename() {
        let policy = RenamePolicy::new(".:", ".").unwrap();
        assert!(policy.evaluate(&record("/d/plain.txt", 1, 0o644)).is_none());
        assert!(policy.evaluate(&record("/d/a:b.txt", 1, 0o644)).is_some());
    }

    #[test]
    fn test_rename_policy_requires_single_substitute() {
        assert!(RenamePolicy::new(":", "").is_err());
        assert!(RenamePolicy::new(":", "__").is_err());
        assert!(RenamePolicy::new(":", "é").is_ok());
    }

    #[test]
    fn test_rename_policy_rejects_separator_and_nul() {
        assert_eq!(
            RenamePolicy::new(":", "/").unwrap_err(),
            RenameConfigError::UnsafeSubstitute('/')
        );
        assert_eq!(
            RenamePolicy::new(":", "\0").unwrap_err(),
            RenameConfigError::UnsafeSubstitute('\0')
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_still_evaluated() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let temp = TempPolicy::new(&[".tmp".to_string()]);
        let draft = FileRecord {
            path: PathBuf::from(OsStr::from_bytes(b"/d/draft\xff.tmp")),
            ..record("/", 4, 0o644)
        };
        assert!(temp.evaluate(&draft).is_some());

        let rename = RenamePolicy::new(":", ".").unwrap();
        let bad = FileRecord {
            path: PathBuf::from(OsStr::from_bytes(b"/d/bad:\xffname")),
            ..record("/", 4, 0o644)
        };
        let finding = rename.evaluate(&bad).unwrap();
        assert_eq!(
            finding.action,
            Action::RenameTo(OsString::from_vec(b"bad.\xffname".to_vec()))
        );
    }
}
