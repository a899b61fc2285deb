//! Enumerator configuration: filter flags, iterator flags, and sort settings.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

bitflags! {
    /// Entry filters applied by the filter chain, in its declared order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirFilterFlags: u32 {
        /// Accept directories.
        const DIRS = 0x001;
        /// Accept regular (non-directory) entries.
        const FILES = 0x002;
        /// Accept drive entries. No effect on POSIX volumes.
        const DRIVES = 0x004;
        /// Reject symlinks outright.
        const NO_SYMLINKS = 0x008;
        /// Require the readable permission bit.
        const READABLE = 0x010;
        /// Require the writable permission bit.
        const WRITABLE = 0x020;
        /// Require the executable permission bit.
        const EXECUTABLE = 0x040;
        /// Accept hidden entries (dot names and manifest-hidden names).
        const HIDDEN = 0x100;
        /// Accept directories regardless of name patterns; a symlink counts
        /// as a directory when its resolved target is one.
        const ALL_DIRS = 0x400;
        /// Match name patterns case-sensitively.
        const CASE_SENSITIVE = 0x800;
        /// Reject the "." entry.
        const NO_DOT = 0x2000;
        /// Reject the ".." entry.
        const NO_DOT_DOT = 0x4000;
        /// Sentinel: bypass the whole filter chain.
        const NO_FILTER = 0x8000_0000;
    }
}

impl DirFilterFlags {
    pub const ALL_ENTRIES: DirFilterFlags =
        DirFilterFlags::DIRS.union(DirFilterFlags::FILES).union(DirFilterFlags::DRIVES);
    pub const NO_DOT_AND_DOT_DOT: DirFilterFlags =
        DirFilterFlags::NO_DOT.union(DirFilterFlags::NO_DOT_DOT);
}

impl Default for DirFilterFlags {
    fn default() -> Self {
        Self::ALL_ENTRIES
    }
}

bitflags! {
    /// Iteration behavior of the cursor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct IteratorFlags: u32 {
        /// Descend through symlinked directories during recursion.
        const FOLLOW_SYMLINKS = 0x1;
        /// Recurse into subdirectories.
        const SUBDIRECTORIES = 0x2;
    }
}

/// Attribute the sort comparators order by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortRole {
    #[default]
    Name,
    Size,
    Modified,
    Accessed,
    /// Keep the backend walk order; entries are still bucketed.
    NoSort,
}

/// Sort order (ascending or descending).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Scheduling hint forwarded to backends when starting async iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IoPriority {
    Low,
    #[default]
    Default,
    High,
}

/// Full configuration of one enumerator session.
#[derive(Debug, Clone)]
pub struct EnumeratorConfig {
    /// Glob patterns an entry name must match (empty set matches everything).
    pub name_filters: Vec<String>,
    pub dir_filters: DirFilterFlags,
    pub iterator_flags: IteratorFlags,
    pub sort_role: SortRole,
    pub sort_order: SortOrder,
    /// Bucket directories and files into a single mixed list.
    pub mix_dirs_and_files: bool,
    /// Bounded wait for the root handle open; `None` blocks indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            name_filters: Vec::new(),
            dir_filters: DirFilterFlags::default(),
            iterator_flags: IteratorFlags::empty(),
            sort_role: SortRole::default(),
            sort_order: SortOrder::default(),
            mix_dirs_and_files: false,
            timeout_ms: None,
        }
    }
}

impl EnumeratorConfig {
    pub fn recurse(&self) -> bool {
        self.iterator_flags.contains(IteratorFlags::SUBDIRECTORIES)
    }

    pub fn follow_symlinks(&self) -> bool {
        self.iterator_flags.contains(IteratorFlags::FOLLOW_SYMLINKS)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
