use crate::finding::{Action, Finding};
use crate::platform;
use crate::policy::PermissionMode;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure of a single authorized action. Never aborts the run.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to change permissions of {}: {source}", path.display())]
    Chmod {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rename {} to {}: {source}", path.display(), target.display())]
    Rename {
        path: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sanitized name is already taken. Nothing was touched.
    #[error("cannot rename {} to {}: target already exists", path.display(), target.display())]
    Collision { path: PathBuf, target: PathBuf },
}

impl ActionError {
    pub fn is_collision(&self) -> bool {
        matches!(self, ActionError::Collision { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Deleted,
    ModeChanged {
        from: PermissionMode,
        to: PermissionMode,
    },
    Renamed {
        to: PathBuf,
    },
}

/// Applies authorized findings to the filesystem, one file at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionExecutor;

impl ActionExecutor {
    pub fn apply(&self, finding: &Finding) -> Result<Outcome, ActionError> {
        let path = &finding.path;
        match &finding.action {
            Action::Delete => delete(path),
            Action::SetMode(mode) => set_mode(path, *mode),
            Action::RenameTo(name) => rename(path, name),
        }
    }
}

fn delete(path: &Path) -> Result<Outcome, ActionError> {
    fs::remove_file(path).map_err(|source| ActionError::Delete {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Deleted {}", path.display());
    Ok(Outcome::Deleted)
}

fn set_mode(path: &Path, mode: PermissionMode) -> Result<Outcome, ActionError> {
    let chmod_error = |source| ActionError::Chmod {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(chmod_error)?;
    let from = PermissionMode::from_bits(platform::permission_bits(&metadata));
    platform::set_permission_bits(path, mode.bits()).map_err(chmod_error)?;
    debug!("Changed {} from {} to {}", path.display(), from.octal(), mode.octal());
    Ok(Outcome::ModeChanged { from, to: mode })
}

fn rename(path: &Path, name: &OsStr) -> Result<Outcome, ActionError> {
    let target = path.with_file_name(name);
    let rename_error = |source| ActionError::Rename {
        path: path.to_path_buf(),
        target: target.clone(),
        source,
    };

    if target.parent() != path.parent() {
        return Err(rename_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "new name would leave the directory",
        )));
    }

    // link + unlink: the link fails with AlreadyExists instead of replacing a target
    match fs::hard_link(path, &target) {
        Ok(()) => {
            if let Err(source) = fs::remove_file(path) {
                let _ = fs::remove_file(&target);
                return Err(rename_error(source));
            }
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ActionError::Collision {
                path: path.to_path_buf(),
                target,
            });
        }
        Err(e) => {
            debug!("Hard link unavailable for {} ({}), renaming", path.display(), e);
            // symlink_metadata so a dangling symlink also counts as taken
            if fs::symlink_metadata(&target).is_ok() {
                return Err(ActionError::Collision {
                    path: path.to_path_buf(),
                    target,
                });
            }
            fs::rename(path, &target).map_err(rename_error)?;
        }
    }

    debug!("Renamed {} to {}", path.display(), target.display());
    Ok(Outcome::Renamed { to: target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Detail;
    use crate::policy::Policy;

    fn finding(path: PathBuf, action: Action) -> Finding {
        Finding {
            policy: Policy::Empty,
            path,
            size: 0,
            action,
            detail: Detail::Empty,
        }
    }

    #[test]
    fn test_delete_and_delete_again() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        let finding = finding(path.clone(), Action::Delete);

        assert_eq!(ActionExecutor.apply(&finding).unwrap(), Outcome::Deleted);
        assert!(!path.exists());

        let err = ActionExecutor.apply(&finding).unwrap_err();
        assert!(matches!(err, ActionError::Delete { .. }));
        assert!(!err.is_collision());
    }

    #[test]
    fn test_rename_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a:b?c.txt");
        fs::write(&path, "payload").unwrap();

        let outcome = ActionExecutor
            .apply(&finding(path.clone(), Action::RenameTo("a.b.c.txt".into())))
            .unwrap();

        let target = tmp.path().join("a.b.c.txt");
        assert_eq!(outcome, Outcome::Renamed { to: target.clone() });
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(target).unwrap(), "payload");
    }

    #[test]
    fn test_rename_collision_does_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a:b.txt");
        let existing = tmp.path().join("a.b.txt");
        fs::write(&path, "new").unwrap();
        fs::write(&existing, "existing").unwrap();

        let err = ActionExecutor
            .apply(&finding(path.clone(), Action::RenameTo("a.b.txt".into())))
            .unwrap_err();

        assert!(err.is_collision());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "existing");
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_rename_of_vanished_file_is_generic_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ActionExecutor
            .apply(&finding(
                tmp.path().join("gone:file"),
                Action::RenameTo("gone.file".into()),
            ))
            .unwrap_err();
        assert!(matches!(err, ActionError::Rename { .. }));
    }

    #[test]
    fn test_rename_never_leaves_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a:b");
        fs::create_dir(tmp.path().join("a")).unwrap();
        fs::write(&path, "payload").unwrap();

        let err = ActionExecutor
            .apply(&finding(path.clone(), Action::RenameTo("a/b".into())))
            .unwrap_err();

        assert!(matches!(err, ActionError::Rename { .. }));
        assert!(path.exists());
        assert!(!tmp.path().join("a").join("b").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_rename_onto_dangling_symlink_is_collision() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x:y");
        let target = tmp.path().join("x.y");
        fs::write(&path, "data").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("nowhere"), &target).unwrap();

        let err = ActionExecutor
            .apply(&finding(path.clone(), Action::RenameTo("x.y".into())))
            .unwrap_err();

        assert!(err.is_collision());
        assert!(path.exists());
        assert!(fs::symlink_metadata(&target).unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn test_set_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad_permissions.txt");
        fs::write(&path, "x").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o777)).unwrap();

        let outcome = ActionExecutor
            .apply(&finding(
                path.clone(),
                Action::SetMode(PermissionMode::from_bits(0o644)),
            ))
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::ModeChanged {
                from: PermissionMode::from_bits(0o777),
                to: PermissionMode::from_bits(0o644),
            }
        );
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o644);
    }
}
