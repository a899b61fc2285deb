//! Volume trait for abstracting directory access.
//!
//! The engine never touches a file system directly: it consumes the
//! `Volume` trait, which hands out listing cursors, single-level tree-walk
//! handles, attribute queries, link targets, and hidden-name manifests.
//! Implementations provide different storage backends:
//! - `LocalPosixVolume`: the real local file system
//! - `InMemoryVolume`: a synthetic volume for tests and virtual listings

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::SortRole;
use crate::metadata::FileInfo;

pub mod inmemory;
#[cfg(unix)]
pub mod local_posix;
pub(crate) mod walk;

pub use inmemory::InMemoryVolume;
#[cfg(unix)]
pub use local_posix::LocalPosixVolume;


/// Error type for volume operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeError {
    /// Path not found
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// Operation not supported by this volume type
    NotSupported,
    /// Generic I/O error, with the native code when the OS reported one
    Io { message: String, code: Option<i32> },
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Path not found: {}", path),
            Self::PermissionDenied(path) => write!(f, "Permission denied: {}", path),
            Self::NotSupported => write!(f, "Operation not supported"),
            Self::Io { message, code: Some(code) } => write!(f, "I/O error ({}): {}", code, message),
            Self::Io { message, code: None } => write!(f, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for VolumeError {}

impl From<std::io::Error> for VolumeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Io {
                message: err.to_string(),
                code: err.raw_os_error(),
            },
        }
    }
}

/// One raw directory entry as the backend reported it, before any attribute
/// query. Type bits come from the entry itself (lstat semantics), so a
/// symlink to a directory has `is_directory == false` here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_directory: bool,
    pub is_symlink: bool,
}

/// Kind of one tree-walk event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEntryKind {
    /// A directory, seen before its children.
    DirPreVisit,
    /// A directory, revisited after its children. Carries no entry data.
    DirPostVisit,
    File,
    Symlink,
    /// Sockets, fifos, and other special entries.
    Other,
}

/// One event produced by a tree-walk handle. The walk root itself is
/// reported at depth 0; its entries start at depth 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTreeEntry {
    pub path: PathBuf,
    pub depth: usize,
    pub kind: TreeEntryKind,
}

/// Opaque cursor over one directory's raw entries.
///
/// Lifecycle: open, iterated zero or more times, then exhausted or closed.
/// Handles are exclusively owned by one enumerator session.
pub trait ListingHandle: Send {
    /// The directory this handle lists.
    fn path(&self) -> &Path;

    /// Next raw entry, or `None` when the listing is exhausted.
    fn next_entry(&mut self) -> Result<Option<RawEntry>, VolumeError>;

    /// Pulls up to `count` entries. A short batch means exhaustion.
    fn next_batch(&mut self, count: usize) -> Result<Vec<RawEntry>, VolumeError> {
        let mut batch = Vec::with_capacity(count.min(64));
        while batch.len() < count {
            match self.next_entry()? {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }
        Ok(batch)
    }

    /// Releases backend resources early. Dropping the handle also closes it.
    fn close(&mut self) {}
}

/// Single-level tree-walk primitive backing the bulk sorted path.
///
/// Yields pre-visit, entry, and post-visit events in comparator order;
/// `skip_descent` marks the most recently yielded directory so the walk does
/// not enter it.
pub trait TreeWalk: Send {
    fn next_entry(&mut self) -> Option<RawTreeEntry>;

    /// Skips descent into the directory most recently yielded as
    /// `DirPreVisit`. Must be called before the next `next_entry` call.
    fn skip_descent(&mut self);

    fn close(&mut self) {}
}

/// Trait for volume directory-access operations.
///
/// All paths are interpreted by the volume itself; relative paths resolve
/// against the volume root.
pub trait Volume: Send + Sync {
    /// Display name for this volume (e.g., "Macintosh HD", "scratch").
    fn name(&self) -> &str;

    /// Root path of this volume.
    fn root(&self) -> &Path;

    /// Opens a cursor over one directory. `follow_symlinks` is a hint for
    /// backends that distinguish listing a symlinked directory.
    fn open_listing(
        &self,
        path: &Path,
        follow_symlinks: bool,
    ) -> Result<Box<dyn ListingHandle>, VolumeError>;

    /// Opens a tree-walk rooted at `root` with siblings ordered ascending by
    /// `order_by`. Only the root itself has symlinks followed when
    /// `follow_root_symlink` is set.
    fn open_tree_walk(
        &self,
        root: &Path,
        follow_root_symlink: bool,
        order_by: SortRole,
    ) -> Result<Box<dyn TreeWalk>, VolumeError>;

    /// Stat-level attribute view of one entry (lstat semantics for symlinks).
    fn query_info(&self, path: &Path) -> Result<FileInfo, VolumeError>;

    /// Target of a symlink, one hop only, with a relative target resolved
    /// against the link's parent directory.
    fn read_link(&self, path: &Path) -> Result<PathBuf, VolumeError>;

    /// Hidden-name manifest for one parent directory. A missing manifest is
    /// an empty set, not an error.
    fn load_hidden_names(&self, parent: &Path) -> HashSet<String>;

    /// Whether listings cross a network or virtual boundary. Controls
    /// symlink size substitution in the bulk sorted path.
    fn is_network(&self) -> bool {
        false
    }
}
