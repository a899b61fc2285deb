use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::metadata::FileInfo;
use crate::volume::Volume;

/// Outcome of chasing a symlink chain to its end.
#[derive(Debug)]
pub enum ResolvedLink {
    /// The chain ends at a real entry.
    Target(FileInfo),
    /// The chain ends at a path the volume has no entry for.
    Broken(PathBuf),
    /// The chain revisits one of its own links.
    Cycle,
}

impl ResolvedLink {
    pub fn is_directory(&self) -> bool {
        match self {
            ResolvedLink::Target(info) => info.is_directory,
            _ => false,
        }
    }

    pub fn target(&self) -> Option<&FileInfo> {
        match self {
            ResolvedLink::Target(info) => Some(info),
            _ => None,
        }
    }
}

/// Follows a symlink chain starting at `link`, one hop at a time, keeping
/// the set of visited link paths to detect cycles. A dangling link (or a
/// chain that leaves the volume) resolves to `Broken`.
pub fn resolve_symlink(volume: &dyn Volume, link: &Path) -> ResolvedLink {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut current = link.to_path_buf();

    loop {
        if !visited.insert(current.clone()) {
            log::warn!("symlink cycle at {}", current.display());
            return ResolvedLink::Cycle;
        }
        let target = match volume.read_link(&current) {
            Ok(target) => target,
            Err(_) => return ResolvedLink::Broken(current),
        };
        match volume.query_info(&target) {
            Ok(info) if info.is_symlink => current = target,
            Ok(info) => return ResolvedLink::Target(info),
            Err(_) => return ResolvedLink::Broken(target),
        }
    }
}
