use std::sync::Arc;

use super::enumerator::DirEnumerator;
use crate::config::{
    DirFilterFlags, EnumeratorConfig, IteratorFlags, SortOrder, SortRole,
};
use crate::error::EnumeratorError;
use crate::metadata::SortFileInfo;
use crate::volume::InMemoryVolume;

fn names(list: &[SortFileInfo]) -> Vec<String> {
    list.iter().map(|e| e.file_name().into_owned()).collect()
}

fn fixture() -> Arc<InMemoryVolume> {
    let volume = Arc::new(InMemoryVolume::new("test"));
    volume.add_dir("/beta");
    volume.add_dir("/alpha");
    volume.add_file("/file10.txt", 30);
    volume.add_file("/file2.txt", 20);
    volume.add_file("/a.txt", 10);
    volume
}

fn snapshot(volume: Arc<InMemoryVolume>, config: EnumeratorConfig) -> Vec<SortFileInfo> {
    DirEnumerator::with_config(volume, "/", config)
        .sort_file_info_list()
        .unwrap()
}

#[test]
fn test_directories_sort_before_files() {
    let list = snapshot(fixture(), EnumeratorConfig::default());
    assert_eq!(
        names(&list),
        vec!["alpha", "beta", "a.txt", "file2.txt", "file10.txt"]
    );
}

#[test]
fn test_descending_reverses_within_buckets() {
    let config = EnumeratorConfig {
        sort_order: SortOrder::Descending,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(fixture(), config);
    assert_eq!(
        names(&list),
        vec!["beta", "alpha", "file10.txt", "file2.txt", "a.txt"]
    );
}

#[test]
fn test_mixing_produces_single_sorted_list() {
    let config = EnumeratorConfig {
        mix_dirs_and_files: true,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(fixture(), config);
    assert_eq!(
        names(&list),
        vec!["a.txt", "alpha", "beta", "file2.txt", "file10.txt"]
    );
}

#[test]
fn test_size_role_orders_files_by_size() {
    let config = EnumeratorConfig {
        sort_role: SortRole::Size,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(fixture(), config);
    assert_eq!(
        names(&list),
        vec!["alpha", "beta", "a.txt", "file2.txt", "file10.txt"]
    );

    let volume = fixture();
    volume.set_size("/a.txt", 100);
    let config = EnumeratorConfig {
        sort_role: SortRole::Size,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(volume, config);
    assert_eq!(
        names(&list),
        vec!["alpha", "beta", "file2.txt", "file10.txt", "a.txt"]
    );
}

#[test]
fn test_nosort_keeps_backend_order_with_buckets() {
    let config = EnumeratorConfig {
        sort_role: SortRole::NoSort,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(fixture(), config);
    assert_eq!(
        names(&list),
        vec!["beta", "alpha", "file10.txt", "file2.txt", "a.txt"]
    );
}

#[test]
fn test_hidden_entries_excluded_from_snapshot() {
    let volume = fixture();
    volume.add_file("/.secret", 1);
    volume.add_file("/listed.txt", 1);
    volume.set_hidden_manifest("/", &["listed.txt"]);
    let list = snapshot(volume, EnumeratorConfig::default());
    assert_eq!(
        names(&list),
        vec!["alpha", "beta", "a.txt", "file2.txt", "file10.txt"]
    );
}

#[test]
fn test_symlink_takes_target_size_and_type() {
    let volume = Arc::new(InMemoryVolume::new("test"));
    volume.add_file("/big.bin", 1_000);
    volume.add_file("/small.bin", 1);
    volume.add_symlink("/link", "/big.bin");
    volume.add_dir("/real_dir");
    volume.add_symlink("/dir_link", "/real_dir");

    let config = EnumeratorConfig {
        sort_role: SortRole::Size,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(volume, config);
    // dir_link lands in the directory bucket; link sorts by the target's
    // 1000 bytes, after small.bin and alongside big.bin.
    assert_eq!(
        names(&list),
        vec!["dir_link", "real_dir", "small.bin", "big.bin", "link"]
    );
    let link = list.iter().find(|e| e.file_name() == "link").unwrap();
    assert_eq!(link.size, 1_000);
    assert_eq!(link.symlink_target, Some("/big.bin".into()));
}

#[test]
fn test_network_volume_keeps_link_attributes() {
    let volume = Arc::new(InMemoryVolume::new("test"));
    volume.add_file("/big.bin", 1_000);
    volume.add_symlink("/link", "/big.bin");
    volume.set_network(true);

    let config = EnumeratorConfig {
        sort_role: SortRole::Size,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(volume, config);
    // No substitution: the link keeps its own zero size and sorts first.
    assert_eq!(names(&list), vec!["link", "big.bin"]);
}

#[test]
fn test_broken_link_keeps_own_attributes() {
    let volume = Arc::new(InMemoryVolume::new("test"));
    volume.add_file("/a.txt", 5);
    volume.add_symlink("/dangling", "/nowhere");

    let list = snapshot(volume, EnumeratorConfig::default());
    assert_eq!(names(&list), vec!["a.txt", "dangling"]);
    let dangling = list.iter().find(|e| e.file_name() == "dangling").unwrap();
    assert!(!dangling.is_directory);
    assert_eq!(dangling.size, 0);
}

#[test]
fn test_recursive_snapshot_appends_levels_breadth_first() {
    let volume = Arc::new(InMemoryVolume::new("test"));
    volume.add_file("/r.txt", 1);
    volume.add_dir("/sub");
    volume.add_file("/sub/c.txt", 1);
    volume.add_dir("/sub/deep");
    volume.add_file("/sub/deep/d.txt", 1);

    let config = EnumeratorConfig {
        iterator_flags: IteratorFlags::SUBDIRECTORIES,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(volume, config);
    // Directories of every level come before files of every level.
    assert_eq!(names(&list), vec!["sub", "deep", "r.txt", "c.txt", "d.txt"]);
}

#[test]
fn test_recursive_snapshot_rejected_dirs_still_descended() {
    let volume = Arc::new(InMemoryVolume::new("test"));
    volume.add_dir("/sub");
    volume.add_file("/sub/c.txt", 1);

    let config = EnumeratorConfig {
        dir_filters: DirFilterFlags::FILES,
        iterator_flags: IteratorFlags::SUBDIRECTORIES,
        ..EnumeratorConfig::default()
    };
    let list = snapshot(volume, config);
    assert_eq!(names(&list), vec!["c.txt"]);
}

#[test]
fn test_fresh_sessions_produce_identical_snapshots() {
    let volume = fixture();
    volume.add_file("/sub/x.txt", 1);

    let config = EnumeratorConfig {
        iterator_flags: IteratorFlags::SUBDIRECTORIES,
        ..EnumeratorConfig::default()
    };
    let first = snapshot(Arc::clone(&volume), config.clone());
    let second = snapshot(volume, config);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_missing_root_fails_snapshot() {
    let volume = Arc::new(InMemoryVolume::new("test"));
    let mut cursor = DirEnumerator::new(volume, "/gone");
    assert!(matches!(
        cursor.sort_file_info_list(),
        Err(EnumeratorError::TreeWalkOpenFailed(_))
    ));
}

#[test]
fn test_cancelled_snapshot_reports_canceled() {
    let volume = fixture();
    let mut cursor = DirEnumerator::new(volume, "/");
    cursor.cancel();
    assert!(matches!(
        cursor.sort_file_info_list(),
        Err(EnumeratorError::Canceled)
    ));
}
