mod walk;

pub use walk::PathScanner;

use std::path::PathBuf;

/// Anything that can hand out candidate file paths for one policy pass.
///
/// Every call to [`FileSource::files`] starts a fresh single pass; nothing is
/// remembered between passes.
pub trait FileSource {
    fn files(&self) -> Box<dyn Iterator<Item = PathBuf> + '_>;
}

/// A fixed listing, mostly useful for pinning discovery order in tests.
impl FileSource for Vec<PathBuf> {
    fn files(&self) -> Box<dyn Iterator<Item = PathBuf> + '_> {
        Box::new(self.iter().cloned())
    }
}
