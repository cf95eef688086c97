use super::groups::{group_by_key, order_groups, EquivalenceGroup, Order};
use crate::record::FileRecord;
use std::ffi::OsString;

/// Group by base name regardless of directory; the newest member is retained.
pub fn find_same_name_groups(records: Vec<FileRecord>) -> Vec<EquivalenceGroup<OsString>> {
    let groups = group_by_key(records, |r| r.file_name().map(|name| name.to_os_string()));
    order_groups(groups, Order::NewestFirst)
}
