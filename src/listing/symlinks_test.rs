use std::path::Path;

use super::symlinks::{ResolvedLink, resolve_symlink};
use crate::volume::InMemoryVolume;

#[test]
fn test_resolves_direct_link() {
    let volume = InMemoryVolume::new("test");
    volume.add_file("/target.txt", 42);
    volume.add_symlink("/link", "/target.txt");

    match resolve_symlink(&volume, Path::new("/link")) {
        ResolvedLink::Target(info) => {
            assert_eq!(info.path, Path::new("/target.txt"));
            assert_eq!(info.size, 42);
            assert!(info.is_file);
        }
        other => panic!("expected target, got {:?}", other),
    }
}

#[test]
fn test_resolves_chain_to_final_target() {
    let volume = InMemoryVolume::new("test");
    volume.add_dir("/real");
    volume.add_symlink("/hop2", "/real");
    volume.add_symlink("/hop1", "/hop2");

    let resolved = resolve_symlink(&volume, Path::new("/hop1"));
    assert!(resolved.is_directory());
    assert_eq!(
        resolved.target().map(|info| info.path.clone()),
        Some("/real".into())
    );
}

#[test]
fn test_relative_target_resolves_against_link_parent() {
    let volume = InMemoryVolume::new("test");
    volume.add_dir("/dir/sub");
    volume.add_symlink("/dir/link", "sub");

    let resolved = resolve_symlink(&volume, Path::new("/dir/link"));
    assert!(resolved.is_directory());
    assert_eq!(
        resolved.target().map(|info| info.path.clone()),
        Some("/dir/sub".into())
    );
}

#[test]
fn test_cycle_detected() {
    let volume = InMemoryVolume::new("test");
    volume.add_symlink("/a", "/b");
    volume.add_symlink("/b", "/c");
    volume.add_symlink("/c", "/a");

    assert!(matches!(
        resolve_symlink(&volume, Path::new("/a")),
        ResolvedLink::Cycle
    ));
}

#[test]
fn test_self_link_is_a_cycle() {
    let volume = InMemoryVolume::new("test");
    volume.add_symlink("/selfie", "/selfie");

    assert!(matches!(
        resolve_symlink(&volume, Path::new("/selfie")),
        ResolvedLink::Cycle
    ));
}

#[test]
fn test_broken_link_reports_dangling_path() {
    let volume = InMemoryVolume::new("test");
    volume.add_symlink("/dangling", "/nowhere");

    match resolve_symlink(&volume, Path::new("/dangling")) {
        ResolvedLink::Broken(path) => assert_eq!(path, Path::new("/nowhere")),
        other => panic!("expected broken, got {:?}", other),
    }
}

#[test]
fn test_non_symlink_is_broken_at_itself() {
    // read_link on a regular file fails, so resolution reports it broken.
    let volume = InMemoryVolume::new("test");
    volume.add_file("/plain.txt", 1);

    assert!(matches!(
        resolve_symlink(&volume, Path::new("/plain.txt")),
        ResolvedLink::Broken(_)
    ));
}
