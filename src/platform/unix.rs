use super::PERMISSION_MASK;
use std::fs::{self, Metadata, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

// setuid, setgid and sticky
const SPECIAL_BITS: u32 = 0o7000;

pub fn permission_bits(metadata: &Metadata) -> u32 {
    metadata.permissions().mode() & PERMISSION_MASK
}

pub fn set_permission_bits(path: &Path, bits: u32) -> io::Result<()> {
    let current = fs::metadata(path)?.permissions().mode();
    let mode = (current & SPECIAL_BITS) | (bits & PERMISSION_MASK);
    fs::set_permissions(path, Permissions::from_mode(mode))
}
