mod content;
mod prefix;

pub use content::{hash_file, hash_reader, ContentDigest};
pub use prefix::{prefix_hash, PREFIX_LENGTH};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A file could not be read (or stat'ed) while it was being considered.
/// The file is dropped from the current operation only.
#[derive(Error, Debug)]
#[error("cannot read {}: {source}", path.display())]
pub struct ReadFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
