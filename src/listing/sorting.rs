//! Sibling comparators for the bulk sorted path.
//!
//! Every comparator here orders ascending; descending output is produced by
//! the snapshot's insertion direction, which relies on this property (see
//! `sorting_test` for the per-role checks).

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::config::SortRole;
use crate::listing::natural_sort::compare_natural;
use crate::metadata::SortFileInfo;

/// Levels at least this large are sorted on the rayon pool.
const PARALLEL_SORT_THRESHOLD: usize = 10_000;

fn compare_names(a: &SortFileInfo, b: &SortFileInfo) -> Ordering {
    compare_natural(&a.file_name(), &b.file_name())
}

/// Ascending comparator for `role`. Non-name roles tie-break on the natural
/// name order so every role stays a strict weak ordering.
pub fn compare_by_role(a: &SortFileInfo, b: &SortFileInfo, role: SortRole) -> Ordering {
    match role {
        SortRole::NoSort => Ordering::Equal,
        SortRole::Name => compare_names(a, b),
        SortRole::Size => a.size.cmp(&b.size).then_with(|| compare_names(a, b)),
        SortRole::Modified => a.modified.cmp(&b.modified).then_with(|| compare_names(a, b)),
        SortRole::Accessed => a.accessed.cmp(&b.accessed).then_with(|| compare_names(a, b)),
    }
}

/// Sorts one sibling level ascending by `role`. `NoSort` keeps backend order.
pub fn sort_ascending(entries: &mut [SortFileInfo], role: SortRole) {
    if role == SortRole::NoSort || entries.len() < 2 {
        return;
    }
    if entries.len() >= PARALLEL_SORT_THRESHOLD {
        entries.par_sort_by(|a, b| compare_by_role(a, b, role));
    } else {
        entries.sort_by(|a, b| compare_by_role(a, b, role));
    }
}
