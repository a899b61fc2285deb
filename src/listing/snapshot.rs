//! Bulk sorted snapshot of a single directory level.
//!
//! The cursor walks one entry at a time; the snapshot path instead drains
//! a whole level from the volume's presorted tree walk, substitutes
//! symlink targets, filters, and buckets directories ahead of files.
//! Recursion is driven by the enumerator, which feeds the subdirectory
//! paths reported here back through `collect_level` breadth-first.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{EnumeratorConfig, SortOrder};
use crate::error::EnumeratorError;
use crate::listing::filtering::FilterChain;
use crate::listing::hidden_cache::HiddenListCache;
use crate::listing::sorting::sort_ascending;
use crate::listing::symlinks::{ResolvedLink, resolve_symlink};
use crate::metadata::SortFileInfo;
use crate::volume::{TreeEntryKind, Volume};

/// One level's accepted entries, bucketed, plus the subdirectories to
/// descend into (reported regardless of filter acceptance).
pub(crate) struct LevelBuckets {
    pub dirs: VecDeque<SortFileInfo>,
    pub files: VecDeque<SortFileInfo>,
    pub subdirs: Vec<PathBuf>,
}

pub(crate) fn collect_level(
    volume: &dyn Volume,
    dir: &Path,
    config: &EnumeratorConfig,
    chain: &FilterChain,
    hidden: &mut HiddenListCache,
    cancel: &AtomicBool,
) -> Result<LevelBuckets, EnumeratorError> {
    let mut walk = volume
        .open_tree_walk(dir, config.follow_symlinks(), config.sort_role)
        .map_err(|err| EnumeratorError::TreeWalkOpenFailed(err.to_string()))?;

    let mut level: Vec<SortFileInfo> = Vec::new();
    let mut subdirs: Vec<PathBuf> = Vec::new();
    loop {
        if cancel.load(Ordering::Relaxed) {
            walk.close();
            return Err(EnumeratorError::Canceled);
        }
        let Some(entry) = walk.next_entry() else {
            break;
        };
        match entry.kind {
            // The walk re-announces the root; a single level never descends.
            TreeEntryKind::DirPreVisit if entry.depth == 0 => continue,
            TreeEntryKind::DirPreVisit => walk.skip_descent(),
            TreeEntryKind::DirPostVisit => continue,
            _ => {}
        }
        let info = match volume.query_info(&entry.path) {
            Ok(info) => info,
            Err(err) => {
                log::debug!("skipping {}: {}", entry.path.display(), err);
                continue;
            }
        };
        let mut item = SortFileInfo::from_info(&info);
        // On local volumes a symlink takes on its target's type and size;
        // network volumes keep the link's own attributes, and a broken or
        // cyclic chain leaves them untouched as well.
        if info.is_symlink && !volume.is_network() {
            if let ResolvedLink::Target(target) = resolve_symlink(volume, &info.path) {
                item.size = target.size;
                item.is_directory = target.is_directory;
                item.is_file = target.is_file;
                item.symlink_target = Some(target.path.clone());
            }
        }
        // Descent is decided here but performed by the caller; it is
        // independent of whether the filter chain accepts the entry.
        if config.recurse() {
            if info.is_directory {
                subdirs.push(info.path.clone());
            } else if info.is_symlink
                && item.is_directory
                && config.follow_symlinks()
                && let Some(target) = &item.symlink_target
            {
                subdirs.push(target.clone());
            }
        }
        if !chain.accepts(volume, hidden, &info) {
            continue;
        }
        level.push(item);
    }
    walk.close();

    // The walk presorts by the requested role, but symlink substitution can
    // change sort keys; re-sorting is stable so NoSort keeps arrival order.
    sort_ascending(&mut level, config.sort_role);

    let descending = config.sort_order == SortOrder::Descending;
    let mut buckets = LevelBuckets {
        dirs: VecDeque::with_capacity(level.len()),
        files: VecDeque::new(),
        subdirs,
    };
    for item in level {
        let bucket = if item.is_directory && !config.mix_dirs_and_files {
            &mut buckets.dirs
        } else {
            &mut buckets.files
        };
        if descending {
            bucket.push_front(item);
        } else {
            bucket.push_back(item);
        }
    }
    Ok(buckets)
}

/// Joins global buckets into the final list, directories first.
pub(crate) fn concat_buckets(
    dirs: Vec<SortFileInfo>,
    files: Vec<SortFileInfo>,
) -> Vec<SortFileInfo> {
    let mut out = dirs;
    out.extend(files);
    out
}
