#[cfg(unix)]
pub mod unix;

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// The nine `rwxrwxrwx` bits.
pub const PERMISSION_MASK: u32 = 0o777;

#[cfg(unix)]
pub fn permission_bits(metadata: &Metadata) -> u32 {
    unix::permission_bits(metadata)
}

#[cfg(not(unix))]
pub fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

/// Replace the low nine permission bits of `path` with `bits`.
#[cfg(unix)]
pub fn set_permission_bits(path: &Path, bits: u32) -> io::Result<()> {
    unix::set_permission_bits(path, bits)
}

/// Only the owner-write bit is representable here; it maps onto the read-only flag.
#[cfg(not(unix))]
pub fn set_permission_bits(path: &Path, bits: u32) -> io::Result<()> {
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_readonly(bits & 0o200 == 0);
    std::fs::set_permissions(path, permissions)
}
