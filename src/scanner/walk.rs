use super::FileSource;
use crate::config::non_overlapping_directories;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Depth-first traversal over a set of root directories.
///
/// Yields regular files only. Symlinks are not followed, unreadable subtrees
/// are logged and skipped, and anything matching an ignore glob is pruned.
#[derive(Debug, Clone)]
pub struct PathScanner {
    roots: Vec<PathBuf>,
    ignore_patterns: Vec<Pattern>,
}

impl PathScanner {
    pub fn new(roots: &[PathBuf], ignore_globs: &[String]) -> Self {
        let absolute: Vec<PathBuf> = roots
            .iter()
            .map(|root| match fs::canonicalize(root) {
                Ok(path) => path,
                Err(err) => {
                    warn!("Cannot resolve root {}: {}", root.display(), err);
                    root.clone()
                }
            })
            .collect();
        let roots = non_overlapping_directories(absolute);
        debug!("Scanning roots: {:?}", roots);

        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            roots,
            ignore_patterns,
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }
}

impl FileSource for PathScanner {
    fn files(&self) -> Box<dyn Iterator<Item = PathBuf> + '_> {
        Box::new(self.roots.iter().flat_map(move |root| {
            WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(move |entry| !self.is_ignored(entry.path()))
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        let location = err
                            .path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default();
                        warn!("Skipping unreadable entry {}: {}", location, err);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
        }))
    }
}
