//! File attribute types shared by the cursor and snapshot paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Attribute view of one file system entry.
///
/// Built on demand from a backend stat call; the cursor queries it lazily so
/// a bypassed filter chain never pays for attributes it does not read.
/// Timestamps are `(seconds, nanoseconds)` pairs as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub parent: Option<PathBuf>,
    pub is_directory: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub size: u64,
    /// Raw permission bits (the low 12 mode bits).
    pub mode: u32,
    pub can_read: bool,
    pub can_write: bool,
    pub can_execute: bool,
    pub device: u64,
    pub inode: u64,
    pub uid: u32,
    pub gid: u32,
    pub modified: (i64, i64),
    pub accessed: (i64, i64),
    pub changed: (i64, i64),
    /// Immediate link target for symlinks (not chain-resolved).
    pub symlink_target: Option<PathBuf>,
}

impl FileInfo {
    /// Dot-name rule only; manifest-based hiding is the filter chain's job.
    pub fn has_hidden_name(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Denormalized snapshot record used only by the bulk sorted path.
///
/// Immutable once produced. For symlinks the type flags and size may reflect
/// the resolved target (see the snapshot traversal rules); `symlink_target`
/// then holds the final resolved path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortFileInfo {
    pub url: PathBuf,
    pub is_directory: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub can_read: bool,
    pub can_write: bool,
    pub can_execute: bool,
    pub size: u64,
    pub device: u64,
    pub inode: u64,
    pub uid: u32,
    pub gid: u32,
    pub modified: (i64, i64),
    pub accessed: (i64, i64),
    pub changed: (i64, i64),
    pub symlink_target: Option<PathBuf>,
}

impl SortFileInfo {
    pub fn from_info(info: &FileInfo) -> Self {
        Self {
            url: info.path.clone(),
            is_directory: info.is_directory,
            is_file: info.is_file,
            is_symlink: info.is_symlink,
            can_read: info.can_read,
            can_write: info.can_write,
            can_execute: info.can_execute,
            size: info.size,
            device: info.device,
            inode: info.inode,
            uid: info.uid,
            gid: info.gid,
            modified: info.modified,
            accessed: info.accessed,
            changed: info.changed,
            symlink_target: info.symlink_target.clone(),
        }
    }

    /// Final path component, used by the name comparators.
    pub fn file_name(&self) -> std::borrow::Cow<'_, str> {
        self.url
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.url.to_string_lossy())
    }
}

/// Evaluates read/write/execute access for the current process from raw mode
/// bits, picking the owner, group, or other bit triplet like access(2) would.
#[cfg(unix)]
pub(crate) fn evaluate_access(mode: u32, uid: u32, gid: u32) -> (bool, bool, bool) {
    let euid = uzers::get_effective_uid();
    let egid = uzers::get_effective_gid();
    if euid == 0 {
        // root reads and writes everything; execute still needs some x bit
        return (true, true, mode & 0o111 != 0);
    }
    let shift = if euid == uid {
        6
    } else if egid == gid {
        3
    } else {
        0
    };
    let bits = (mode >> shift) & 0o7;
    (bits & 0o4 != 0, bits & 0o2 != 0, bits & 0o1 != 0)
}

#[cfg(not(unix))]
pub(crate) fn evaluate_access(mode: u32, _uid: u32, _gid: u32) -> (bool, bool, bool) {
    (mode & 0o444 != 0, mode & 0o222 != 0, mode & 0o111 != 0)
}

/// Lossy display name for a path, mirroring how entries get their `name`.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
