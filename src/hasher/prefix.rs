use super::ReadFailure;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

pub const PREFIX_LENGTH: usize = 1024; // 1KB

/// XxHash64 of the first [`PREFIX_LENGTH`] bytes. Cheap pre-filter before a
/// full content digest.
pub fn prefix_hash(path: &Path) -> Result<u64, ReadFailure> {
    read_portion(path)
        .map(|data| hash_data(&data))
        .map_err(|source| ReadFailure {
            path: path.to_path_buf(),
            source,
        })
}

fn read_portion(file: &Path) -> io::Result<Vec<u8>> {
    let f = File::open(file)?;
    let mut buffer = Vec::with_capacity(PREFIX_LENGTH);
    f.take(PREFIX_LENGTH as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn hash_data(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}
