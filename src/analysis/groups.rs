use crate::record::FileRecord;
use ahash::AHashMap;
use std::hash::Hash;
use tracing::{debug, warn};

/// Files sharing a key (content digest or base name). Actionable groups always
/// hold at least two members; index 0 is the retained one once ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceGroup<K> {
    pub key: K,
    pub members: Vec<FileRecord>,
}

impl<K> EquivalenceGroup<K> {
    pub fn retained(&self) -> &FileRecord {
        &self.members[0]
    }

    /// Members proposed for deletion.
    pub fn candidates(&self) -> &[FileRecord] {
        &self.members[1..]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Ascending modification time: the oldest member is retained.
    OldestFirst,
    /// Descending modification time: the newest member is retained.
    NewestFirst,
}

/// Bucket `items` by key, keeping both bucket order and the order inside each
/// bucket equal to first-seen order. Items without a key are dropped.
pub(crate) fn bucket<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> Option<K>,
{
    let mut index: AHashMap<K, usize> = AHashMap::new();
    let mut buckets: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let Some(k) = key(&item) else {
            continue;
        };
        match index.get(&k) {
            Some(&slot) => buckets[slot].1.push(item),
            None => {
                index.insert(k.clone(), buckets.len());
                buckets.push((k, vec![item]));
            }
        }
    }

    buckets
}

/// Build equivalence groups, discarding singletons.
pub fn group_by_key<K, F>(records: impl IntoIterator<Item = FileRecord>, key: F) -> Vec<EquivalenceGroup<K>>
where
    K: Eq + Hash + Clone,
    F: FnMut(&FileRecord) -> Option<K>,
{
    bucket(records, key)
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(key, members)| EquivalenceGroup { key, members })
        .collect()
}

/// Re-stat every member and sort by modification time.
///
/// Members that can no longer be stat'ed are dropped with a warning; a group
/// left with fewer than two members is dropped entirely. The sort is stable,
/// so members with equal timestamps keep discovery order and the earliest
/// discovered of them wins the retained slot.
pub fn order_group<K>(group: EquivalenceGroup<K>, order: Order) -> Option<EquivalenceGroup<K>> {
    let EquivalenceGroup { key, members } = group;

    let mut members: Vec<FileRecord> = members
        .into_iter()
        .filter_map(|member| match FileRecord::read(&member.path) {
            Ok(fresh) => Some(fresh),
            Err(e) => {
                warn!(
                    "Dropping {} from its group, stat failed: {}",
                    member.path.display(),
                    e
                );
                None
            }
        })
        .collect();

    if members.len() < 2 {
        debug!("Group shrank to {} member(s), dropping it", members.len());
        return None;
    }

    match order {
        Order::OldestFirst => members.sort_by(|a, b| a.modified.cmp(&b.modified)),
        Order::NewestFirst => members.sort_by(|a, b| b.modified.cmp(&a.modified)),
    }

    Some(EquivalenceGroup { key, members })
}

pub fn order_groups<K>(groups: Vec<EquivalenceGroup<K>>, order: Order) -> Vec<EquivalenceGroup<K>> {
    groups
        .into_iter()
        .filter_map(|group| order_group(group, order))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::SystemTime;

    fn file_at(dir: &Path, name: &str, mtime: i64) -> FileRecord {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
        FileRecord::read(&path).unwrap()
    }

    fn names<K>(group: &EquivalenceGroup<K>) -> Vec<String> {
        group
            .members
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_bucket_preserves_first_seen_order() {
        let buckets = bucket(vec![3, 1, 4, 1, 5, 9, 2, 6], |n| Some(n % 3));
        assert_eq!(
            buckets,
            vec![(0, vec![3, 9, 6]), (1, vec![1, 4, 1]), (2, vec![5, 2])]
        );
    }

    #[test]
    fn test_group_by_key_drops_singletons_and_keyless() {
        let records: Vec<FileRecord> = ["a", "b", "a", "c"]
            .iter()
            .enumerate()
            .map(|(i, key)| FileRecord {
                path: PathBuf::from(format!("/{}/{}", i, key)),
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
                mode: 0o644,
            })
            .collect();

        let groups = group_by_key(records, |r| {
            let name = r.path.file_name()?.to_string_lossy().into_owned();
            (name != "c").then_some(name)
        });

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "a");
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_order_oldest_first_with_stable_ties() {
        let tmp = tempfile::tempdir().unwrap();
        let group = EquivalenceGroup {
            key: (),
            members: vec![
                file_at(tmp.path(), "newer", 2_000),
                file_at(tmp.path(), "tie_first", 1_000),
                file_at(tmp.path(), "tie_second", 1_000),
            ],
        };

        let ordered = order_group(group, Order::OldestFirst).unwrap();
        assert_eq!(names(&ordered), vec!["tie_first", "tie_second", "newer"]);
        assert!(ordered.retained().path.ends_with("tie_first"));
        assert_eq!(ordered.candidates().len(), 2);
    }

    #[test]
    fn test_order_newest_first_with_stable_ties() {
        let tmp = tempfile::tempdir().unwrap();
        let group = EquivalenceGroup {
            key: (),
            members: vec![
                file_at(tmp.path(), "old", 1_000),
                file_at(tmp.path(), "tie_first", 3_000),
                file_at(tmp.path(), "tie_second", 3_000),
            ],
        };

        let ordered = order_group(group, Order::NewestFirst).unwrap();
        assert_eq!(names(&ordered), vec!["tie_first", "tie_second", "old"]);
    }

    #[test]
    fn test_order_uses_fresh_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let a = file_at(tmp.path(), "a", 1_000);
        let b = file_at(tmp.path(), "b", 2_000);
        // a is touched after discovery
        set_file_mtime(&a.path, FileTime::from_unix_time(3_000, 0)).unwrap();

        let ordered = order_group(EquivalenceGroup { key: (), members: vec![a, b] }, Order::OldestFirst)
            .unwrap();
        assert_eq!(names(&ordered), vec!["b", "a"]);
    }

    #[test]
    fn test_vanished_member_is_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let a = file_at(tmp.path(), "a", 1_000);
        let b = file_at(tmp.path(), "b", 2_000);
        let c = file_at(tmp.path(), "c", 3_000);
        fs::remove_file(&a.path).unwrap();

        let ordered = order_group(
            EquivalenceGroup {
                key: (),
                members: vec![a, b, c],
            },
            Order::OldestFirst,
        )
        .unwrap();
        assert_eq!(names(&ordered), vec!["b", "c"]);
    }

    #[test]
    fn test_group_degenerating_to_one_is_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let a = file_at(tmp.path(), "a", 1_000);
        let b = file_at(tmp.path(), "b", 2_000);
        fs::remove_file(&b.path).unwrap();

        let groups = order_groups(
            vec![EquivalenceGroup {
                key: (),
                members: vec![a, b],
            }],
            Order::NewestFirst,
        );
        assert!(groups.is_empty());
    }
}
