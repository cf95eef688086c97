use super::ReadFailure;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// BLAKE3 digest of a file's full content.
///
/// Equal digests are treated as equal content; no byte-for-byte comparison
/// follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; blake3::OUT_LEN]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; blake3::OUT_LEN] {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", blake3::Hash::from(self.0).to_hex())
    }
}

/// Stream `path` through BLAKE3 in fixed-size chunks.
pub fn hash_file(path: &Path) -> Result<ContentDigest, ReadFailure> {
    File::open(path)
        .and_then(hash_reader)
        .map_err(|source| ReadFailure {
            path: path.to_path_buf(),
            source,
        })
}

pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<ContentDigest> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(ContentDigest(*hasher.finalize().as_bytes()))
}
