//! Local POSIX file system volume implementation.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::config::SortRole;
use crate::listing::sorting::sort_ascending;
use crate::metadata::{FileInfo, SortFileInfo, display_name, evaluate_access};
use crate::volume::walk::StackWalk;
use crate::volume::{ListingHandle, RawEntry, TreeWalk, Volume, VolumeError};

/// Sidecar manifest listing additional hidden names, one per line.
const HIDDEN_MANIFEST: &str = ".hidden";

/// A volume backed by the local POSIX file system.
///
/// Wraps the real filesystem with a configurable root path; "/" represents
/// the whole disk, a subtree like "/home/you/Dropbox" a narrower volume.
pub struct LocalPosixVolume {
    name: String,
    root: PathBuf,
}

impl LocalPosixVolume {
    /// Creates a new local volume with the given display name and root path.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    /// Resolves a path against this volume's root. Empty paths and "."
    /// resolve to the root itself; absolute paths are used as given.
    pub(crate) fn resolve(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() || path == Path::new(".") {
            self.root.clone()
        } else if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Builds the attribute view for one path, lstat semantics.
pub(crate) fn build_file_info(path: &Path) -> io::Result<FileInfo> {
    let meta = fs::symlink_metadata(path)?;
    let file_type = meta.file_type();
    let is_symlink = file_type.is_symlink();
    let mode = meta.mode();
    let (can_read, can_write, can_execute) = evaluate_access(mode, meta.uid(), meta.gid());
    let symlink_target = if is_symlink { fs::read_link(path).ok() } else { None };

    Ok(FileInfo {
        name: display_name(path),
        path: path.to_path_buf(),
        parent: path.parent().map(Path::to_path_buf),
        is_directory: file_type.is_dir(),
        is_file: file_type.is_file(),
        is_symlink,
        size: meta.len(),
        mode: mode & 0o7777,
        can_read,
        can_write,
        can_execute,
        device: meta.dev(),
        inode: meta.ino(),
        uid: meta.uid(),
        gid: meta.gid(),
        modified: (meta.mtime(), meta.mtime_nsec()),
        accessed: (meta.atime(), meta.atime_nsec()),
        changed: (meta.ctime(), meta.ctime_nsec()),
        symlink_target,
    })
}

/// Cursor over one local directory. Yields the synthetic "." and ".."
/// entries first, like readdir, then the real entries in backend order.
struct LocalListingHandle {
    dir: PathBuf,
    phase: u8,
    entries: Option<fs::ReadDir>,
}

impl ListingHandle for LocalListingHandle {
    fn path(&self) -> &Path {
        &self.dir
    }

    fn next_entry(&mut self) -> Result<Option<RawEntry>, VolumeError> {
        if self.phase == 0 {
            self.phase = 1;
            return Ok(Some(RawEntry {
                path: self.dir.clone(),
                name: ".".to_string(),
                is_directory: true,
                is_symlink: false,
            }));
        }
        if self.phase == 1 {
            self.phase = 2;
            let parent = self.dir.parent().unwrap_or(&self.dir).to_path_buf();
            return Ok(Some(RawEntry {
                path: parent,
                name: "..".to_string(),
                is_directory: true,
                is_symlink: false,
            }));
        }

        let Some(iter) = self.entries.as_mut() else {
            return Ok(None);
        };
        match iter.next() {
            None => Ok(None),
            Some(Err(e)) => Err(e.into()),
            Some(Ok(entry)) => {
                // Unreadable type bits degrade to a plain file entry rather
                // than failing the whole listing.
                let file_type = entry.file_type();
                let is_symlink = file_type.as_ref().map(|t| t.is_symlink()).unwrap_or(false);
                let is_directory = file_type.map(|t| t.is_dir()).unwrap_or(false);
                Ok(Some(RawEntry {
                    path: entry.path(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_directory,
                    is_symlink,
                }))
            }
        }
    }

    fn close(&mut self) {
        self.entries = None;
    }
}

/// Reads one directory level into stat records, ascending by `order_by`.
/// Entries that vanish or cannot be stat'ed are skipped.
fn read_sorted_level(dir: &Path, order_by: SortRole) -> Vec<SortFileInfo> {
    let mut level = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot read level {:?}: {}", dir, e);
            return level;
        }
    };
    for entry in entries.flatten() {
        match build_file_info(&entry.path()) {
            Ok(info) => level.push(SortFileInfo::from_info(&info)),
            Err(e) => log::debug!("skipping {:?}: {}", entry.path(), e),
        }
    }
    sort_ascending(&mut level, order_by);
    level
}

impl Volume for LocalPosixVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn open_listing(
        &self,
        path: &Path,
        follow_symlinks: bool,
    ) -> Result<Box<dyn ListingHandle>, VolumeError> {
        let dir = self.resolve(path);
        log::debug!("open listing {:?} (follow_symlinks={})", dir, follow_symlinks);
        let entries = fs::read_dir(&dir)?;
        Ok(Box::new(LocalListingHandle {
            dir,
            phase: 0,
            entries: Some(entries),
        }))
    }

    fn open_tree_walk(
        &self,
        root: &Path,
        follow_root_symlink: bool,
        order_by: SortRole,
    ) -> Result<Box<dyn TreeWalk>, VolumeError> {
        let root = self.resolve(root);
        let meta = if follow_root_symlink {
            fs::metadata(&root)
        } else {
            fs::symlink_metadata(&root)
        }?;
        if !meta.is_dir() {
            return Err(VolumeError::Io {
                message: format!("{} is not a directory", root.display()),
                code: None,
            });
        }
        Ok(Box::new(StackWalk::new(root, move |dir: &Path| {
            read_sorted_level(dir, order_by)
        })))
    }

    fn query_info(&self, path: &Path) -> Result<FileInfo, VolumeError> {
        let path = self.resolve(path);
        build_file_info(&path).map_err(VolumeError::from)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, VolumeError> {
        let path = self.resolve(path);
        let target = fs::read_link(&path)?;
        if target.is_absolute() {
            Ok(target)
        } else {
            Ok(path.parent().unwrap_or(Path::new("/")).join(target))
        }
    }

    fn load_hidden_names(&self, parent: &Path) -> HashSet<String> {
        let manifest = self.resolve(parent).join(HIDDEN_MANIFEST);
        match fs::read_to_string(&manifest) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            // a missing manifest hides nothing extra
            Err(_) => HashSet::new(),
        }
    }
}
