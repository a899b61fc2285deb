//! Directory enumeration: cursor, filter chain, sorting, and snapshots.

pub mod enumerator;
pub mod filtering;
pub mod hidden_cache;
pub mod natural_sort;
pub mod snapshot;
pub mod sorting;
pub mod streaming;
pub mod symlinks;

#[cfg(test)]
mod natural_sort_test;
#[cfg(test)]
mod snapshot_test;
#[cfg(test)]
mod sorting_test;
#[cfg(test)]
mod symlinks_test;

pub use enumerator::DirEnumerator;
pub use filtering::FilterChain;
pub use hidden_cache::HiddenListCache;
pub use natural_sort::compare_natural;
pub use streaming::StreamState;
pub use symlinks::{ResolvedLink, resolve_symlink};

use std::path::Path;

use crate::metadata::FileInfo;
use crate::volume::{RawEntry, Volume};

/// Builds the attribute view of a raw listing entry.
///
/// The name comes from the raw entry, not the path: for the synthetic
/// "." and ".." entries the path points at the directory itself (or its
/// parent), so deriving the name from it would be wrong. An entry whose
/// attributes cannot be queried is dropped from the enumeration.
pub(crate) fn candidate_info(
    volume: &dyn Volume,
    raw: &RawEntry,
    parent: &Path,
) -> Option<FileInfo> {
    match volume.query_info(&raw.path) {
        Ok(mut info) => {
            info.name = raw.name.clone();
            info.parent = Some(parent.to_path_buf());
            Some(info)
        }
        Err(err) => {
            log::debug!("dropping {}: {}", raw.path.display(), err);
            None
        }
    }
}
