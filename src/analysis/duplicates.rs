use super::groups::{bucket, group_by_key, order_groups, EquivalenceGroup, Order};
use crate::hasher::{self, ContentDigest};
use crate::progress::ProgressReporter;
use crate::record::FileRecord;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Three-tier duplicate detection:
/// 1. Bucket by file size (free, from the records)
/// 2. XxHash64 of the first 1KB to eliminate most non-matches
/// 3. Full BLAKE3 content digest on prefix collisions only
///
/// Hashing runs on the rayon pool but results are gathered in discovery
/// order, so groups and their members come out in a stable order. Unreadable
/// files are logged and left out; they never group with each other.
/// Returned groups are ordered oldest first.
pub fn find_duplicate_groups(
    records: Vec<FileRecord>,
    reporter: &dyn ProgressReporter,
) -> Vec<EquivalenceGroup<ContentDigest>> {
    let same_size: Vec<FileRecord> = group_by_key(records, |r| Some(r.size))
        .into_iter()
        .flat_map(|group| group.members)
        .collect();
    debug!("{} files share a size with another file", same_size.len());

    let prefixed: Vec<(FileRecord, Option<u64>)> = same_size
        .into_par_iter()
        .map(|record| {
            let hash = hasher::prefix_hash(&record.path)
                .map_err(|e| warn!("Error processing file: {}", e))
                .ok();
            (record, hash)
        })
        .collect();

    let prefix_matches: Vec<FileRecord> = bucket(prefixed, |(record, hash)| {
        hash.map(|hash| (record.size, hash))
    })
    .into_iter()
    .filter(|(_, members)| members.len() > 1)
    .flat_map(|(_, members)| members.into_iter().map(|(record, _)| record))
    .collect();

    let total = prefix_matches.len();
    debug!("{} files need a full content hash", total);
    reporter.on_hash_start(total);

    let hashed_count = AtomicUsize::new(0);
    let digested: Vec<(FileRecord, Option<ContentDigest>)> = prefix_matches
        .into_par_iter()
        .map(|record| {
            let digest = hasher::hash_file(&record.path)
                .map_err(|e| warn!("Error processing file: {}", e))
                .ok();
            let done = hashed_count.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.on_hash_progress(done, total);
            (record, digest)
        })
        .collect();

    let groups: Vec<EquivalenceGroup<ContentDigest>> = bucket(digested, |(_, digest)| *digest)
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(key, members)| EquivalenceGroup {
            key,
            members: members.into_iter().map(|(record, _)| record).collect(),
        })
        .collect();

    order_groups(groups, Order::OldestFirst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &[u8], mtime: i64) -> FileRecord {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        FileRecord::read(&path).unwrap()
    }

    #[test]
    fn test_identical_content_forms_one_group_oldest_retained() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let records = vec![
            write(dir, "copy_b", b"shared content xyz", 3_000),
            write(dir, "unique", b"unique content ab", 1_000),
            write(dir, "original", b"shared content xyz", 1_000),
            write(dir, "copy_a", b"shared content xyz", 2_000),
        ];

        let groups = find_duplicate_groups(records, &SilentReporter);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.len(), 3);
        assert!(group.retained().path.ends_with("original"));
        assert!(group.candidates()[0].path.ends_with("copy_a"));
        assert!(group.candidates()[1].path.ends_with("copy_b"));
    }

    #[test]
    fn test_same_prefix_different_tail_is_not_a_duplicate() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let mut first = vec![0xAAu8; 4096];
        let mut second = first.clone();
        first.push(1);
        second.push(2);
        let records = vec![
            write(dir, "first", &first, 1_000),
            write(dir, "second", &second, 1_000),
        ];

        assert!(find_duplicate_groups(records, &SilentReporter).is_empty());
    }

    #[test]
    fn test_empty_files_share_content() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let records = vec![
            write(dir, "empty_1", b"", 2_000),
            write(dir, "empty_2", b"", 1_000),
        ];

        let groups = find_duplicate_groups(records, &SilentReporter);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].retained().path.ends_with("empty_2"));
    }

    #[test]
    fn test_unreadable_files_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let records = vec![
            write(dir, "gone_1", b"same bytes", 1_000),
            write(dir, "gone_2", b"same bytes", 1_000),
            write(dir, "kept", b"other bytes", 1_000),
        ];
        fs::remove_file(dir.join("gone_1")).unwrap();
        fs::remove_file(dir.join("gone_2")).unwrap();

        assert!(find_duplicate_groups(records, &SilentReporter).is_empty());
    }

    #[test]
    fn test_groups_follow_discovery_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let records = vec![
            write(dir, "b_1", b"bbbb", 1_000),
            write(dir, "a_1", b"aaaa", 1_000),
            write(dir, "a_2", b"aaaa", 1_000),
            write(dir, "b_2", b"bbbb", 1_000),
        ];

        let groups = find_duplicate_groups(records, &SilentReporter);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].retained().path.ends_with("b_1"));
        assert!(groups[1].retained().path.ends_with("a_1"));
    }
}
