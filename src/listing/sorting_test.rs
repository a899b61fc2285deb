use std::cmp::Ordering;
use std::path::PathBuf;

use super::sorting::{compare_by_role, sort_ascending};
use crate::config::SortRole;
use crate::metadata::SortFileInfo;

fn item(name: &str, size: u64, mtime: i64) -> SortFileInfo {
    SortFileInfo {
        url: PathBuf::from("/test").join(name),
        is_directory: false,
        is_file: true,
        is_symlink: false,
        can_read: true,
        can_write: true,
        can_execute: false,
        size,
        device: 1,
        inode: 1,
        uid: 1000,
        gid: 1000,
        modified: (mtime, 0),
        accessed: (mtime, 0),
        changed: (mtime, 0),
        symlink_target: None,
    }
}

#[test]
fn test_name_role_uses_natural_order() {
    let a = item("file2", 0, 0);
    let b = item("file10", 0, 0);
    assert_eq!(compare_by_role(&a, &b, SortRole::Name), Ordering::Less);
    assert_eq!(compare_by_role(&b, &a, SortRole::Name), Ordering::Greater);
}

#[test]
fn test_size_role_ascending_with_name_tiebreak() {
    let small = item("z", 10, 0);
    let large = item("a", 20, 0);
    assert_eq!(compare_by_role(&small, &large, SortRole::Size), Ordering::Less);

    let tie_a = item("a", 10, 0);
    let tie_b = item("b", 10, 0);
    assert_eq!(compare_by_role(&tie_a, &tie_b, SortRole::Size), Ordering::Less);
}

#[test]
fn test_modified_role_compares_timestamp_pairs() {
    let old = item("b", 0, 100);
    let new = item("a", 0, 200);
    assert_eq!(compare_by_role(&old, &new, SortRole::Modified), Ordering::Less);

    // Nanosecond part breaks second-level ties.
    let mut fine = item("a", 0, 100);
    fine.modified = (100, 5);
    assert_eq!(compare_by_role(&old, &fine, SortRole::Modified), Ordering::Less);
}

#[test]
fn test_accessed_role_is_ascending() {
    let mut early = item("b", 0, 0);
    early.accessed = (50, 0);
    let mut late = item("a", 0, 0);
    late.accessed = (60, 0);
    assert_eq!(compare_by_role(&early, &late, SortRole::Accessed), Ordering::Less);
}

#[test]
fn test_nosort_compares_equal_and_keeps_order() {
    let a = item("b", 1, 1);
    let b = item("a", 2, 2);
    assert_eq!(compare_by_role(&a, &b, SortRole::NoSort), Ordering::Equal);

    let mut level = vec![item("c", 0, 0), item("a", 0, 0), item("b", 0, 0)];
    sort_ascending(&mut level, SortRole::NoSort);
    let names: Vec<_> = level.iter().map(|e| e.file_name().into_owned()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_sort_ascending_by_name() {
    let mut level = vec![
        item("file10", 0, 0),
        item("a", 0, 0),
        item("file2", 0, 0),
        item(".cfg", 0, 0),
    ];
    sort_ascending(&mut level, SortRole::Name);
    let names: Vec<_> = level.iter().map(|e| e.file_name().into_owned()).collect();
    assert_eq!(names, vec![".cfg", "a", "file2", "file10"]);
}
