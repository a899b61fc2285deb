//! In-memory volume: a synthetic, path-indexed backend.
//!
//! Serves two purposes: virtual listings for embedders that already hold
//! entry data, and deterministic fixtures for engine tests (instrumented
//! with a hidden-manifest load counter, an injectable open delay, and
//! per-directory listing failures).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use crate::config::SortRole;
use crate::listing::sorting::sort_ascending;
use crate::metadata::{FileInfo, SortFileInfo, display_name};
use crate::volume::walk::StackWalk;
use crate::volume::{ListingHandle, RawEntry, TreeWalk, Volume, VolumeError};

/// Longest symlink chain the volume follows before giving up.
const MAX_LINK_DEPTH: usize = 40;

#[derive(Default, Clone)]
struct State {
    nodes: HashMap<PathBuf, FileInfo>,
    /// Child names per directory, in insertion order (the backend order).
    children: HashMap<PathBuf, Vec<String>>,
    hidden: HashMap<PathBuf, HashSet<String>>,
    failing: HashSet<PathBuf>,
}

pub struct InMemoryVolume {
    name: String,
    root: PathBuf,
    state: RwLock<State>,
    hidden_loads: AtomicUsize,
    next_inode: AtomicU64,
    network: AtomicBool,
    open_delay: Mutex<Option<Duration>>,
}

impl InMemoryVolume {
    pub fn new(name: impl Into<String>) -> Self {
        let volume = Self {
            name: name.into(),
            root: PathBuf::from("/"),
            state: RwLock::new(State::default()),
            hidden_loads: AtomicUsize::new(0),
            next_inode: AtomicU64::new(1),
            network: AtomicBool::new(false),
            open_delay: Mutex::new(None),
        };
        let root_info = volume.make_info(Path::new("/"), true, false, 0, None);
        if let Ok(mut state) = volume.state.write() {
            state.nodes.insert(PathBuf::from("/"), root_info);
            state.children.insert(PathBuf::from("/"), Vec::new());
        }
        volume
    }

    fn make_info(
        &self,
        path: &Path,
        is_directory: bool,
        is_symlink: bool,
        size: u64,
        symlink_target: Option<PathBuf>,
    ) -> FileInfo {
        let inode = self.next_inode.fetch_add(1, Ordering::Relaxed);
        let mode = if is_directory { 0o755 } else { 0o644 };
        FileInfo {
            name: display_name(path),
            path: path.to_path_buf(),
            parent: path.parent().map(Path::to_path_buf),
            is_directory,
            is_file: !is_directory && !is_symlink,
            is_symlink,
            size,
            mode,
            can_read: true,
            can_write: true,
            can_execute: is_directory,
            device: 1,
            inode,
            uid: 1000,
            gid: 1000,
            modified: (1_700_000_000, 0),
            accessed: (1_700_000_000, 0),
            changed: (1_700_000_000, 0),
            symlink_target,
        }
    }

    fn insert(&self, path: &Path, info: FileInfo) {
        let path = path.to_path_buf();
        if let Some(parent) = path.parent().map(Path::to_path_buf) {
            self.ensure_dir(&parent);
            let name = info.name.clone();
            if let Ok(mut state) = self.state.write() {
                let siblings = state.children.entry(parent).or_default();
                if !siblings.contains(&name) {
                    siblings.push(name);
                }
            }
        }
        if let Ok(mut state) = self.state.write() {
            if info.is_directory {
                state.children.entry(path.clone()).or_default();
            }
            state.nodes.insert(path, info);
        }
    }

    fn ensure_dir(&self, path: &Path) {
        let exists = self
            .state
            .read()
            .map(|state| state.nodes.contains_key(path))
            .unwrap_or(false);
        if exists || path == Path::new("/") || path.as_os_str().is_empty() {
            return;
        }
        let info = self.make_info(path, true, false, 0, None);
        self.insert(path, info);
    }

    /// Adds a directory, creating missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let info = self.make_info(path, true, false, 0, None);
        self.insert(path, info);
    }

    /// Adds a regular file, creating missing parents.
    pub fn add_file(&self, path: impl AsRef<Path>, size: u64) {
        let path = path.as_ref();
        let info = self.make_info(path, false, false, size, None);
        self.insert(path, info);
    }

    /// Adds a symlink pointing at `target` (resolved lazily, may dangle).
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl Into<PathBuf>) {
        let path = path.as_ref();
        let info = self.make_info(path, false, true, 0, Some(target.into()));
        self.insert(path, info);
    }

    /// Sets the hidden-name manifest for one directory.
    pub fn set_hidden_manifest(&self, dir: impl AsRef<Path>, names: &[&str]) {
        if let Ok(mut state) = self.state.write() {
            state.hidden.insert(
                dir.as_ref().to_path_buf(),
                names.iter().map(|n| n.to_string()).collect(),
            );
        }
    }

    /// Overrides the access bits reported for one entry.
    pub fn set_access(&self, path: impl AsRef<Path>, read: bool, write: bool, execute: bool) {
        if let Ok(mut state) = self.state.write()
            && let Some(info) = state.nodes.get_mut(path.as_ref())
        {
            info.can_read = read;
            info.can_write = write;
            info.can_execute = execute;
        }
    }

    /// Overrides the size reported for one entry.
    pub fn set_size(&self, path: impl AsRef<Path>, size: u64) {
        if let Ok(mut state) = self.state.write()
            && let Some(info) = state.nodes.get_mut(path.as_ref())
        {
            info.size = size;
        }
    }

    /// Overrides timestamps for one entry.
    pub fn set_times(&self, path: impl AsRef<Path>, modified: (i64, i64), accessed: (i64, i64)) {
        if let Ok(mut state) = self.state.write()
            && let Some(info) = state.nodes.get_mut(path.as_ref())
        {
            info.modified = modified;
            info.accessed = accessed;
        }
    }

    /// Makes `open_listing` fail for one directory with PermissionDenied.
    pub fn fail_listing(&self, path: impl AsRef<Path>) {
        if let Ok(mut state) = self.state.write() {
            state.failing.insert(path.as_ref().to_path_buf());
        }
    }

    /// Stalls every `open_listing` call, for bounded-wait tests.
    pub fn set_open_delay(&self, delay: Duration) {
        if let Ok(mut slot) = self.open_delay.lock() {
            *slot = Some(delay);
        }
    }

    /// Marks the volume as sitting behind a network/virtual boundary.
    pub fn set_network(&self, network: bool) {
        self.network.store(network, Ordering::Relaxed);
    }

    /// How many times a hidden manifest has been loaded.
    pub fn hidden_load_count(&self) -> usize {
        self.hidden_loads.load(Ordering::Relaxed)
    }

    /// Follows symlinks to the final node path, with a chain-depth cap.
    fn resolve_node(&self, path: &Path) -> Result<PathBuf, VolumeError> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_DEPTH {
            let target = {
                let state = lock_read(&self.state)?;
                match state.nodes.get(&current) {
                    None => return Err(VolumeError::NotFound(current.display().to_string())),
                    Some(info) if info.is_symlink => match &info.symlink_target {
                        Some(target) => resolve_target(&current, target),
                        None => return Err(VolumeError::NotFound(current.display().to_string())),
                    },
                    Some(_) => return Ok(current),
                }
            };
            current = target;
        }
        Err(VolumeError::Io {
            message: format!("too many levels of symbolic links: {}", path.display()),
            code: None,
        })
    }

    fn level_infos(state: &State, dir: &Path, order_by: SortRole) -> Vec<SortFileInfo> {
        let mut level = Vec::new();
        if let Some(names) = state.children.get(dir) {
            for name in names {
                if let Some(info) = state.nodes.get(&dir.join(name)) {
                    level.push(SortFileInfo::from_info(info));
                }
            }
        }
        sort_ascending(&mut level, order_by);
        level
    }
}

fn lock_read<T>(lock: &RwLock<T>) -> Result<std::sync::RwLockReadGuard<'_, T>, VolumeError> {
    lock.read().map_err(|_| VolumeError::Io {
        message: "volume state poisoned".to_string(),
        code: None,
    })
}

/// Relative link targets resolve against the link's parent directory.
fn resolve_target(link: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        link.parent().unwrap_or(Path::new("/")).join(target)
    }
}

struct InMemoryListingHandle {
    dir: PathBuf,
    items: std::vec::IntoIter<RawEntry>,
}

impl ListingHandle for InMemoryListingHandle {
    fn path(&self) -> &Path {
        &self.dir
    }

    fn next_entry(&mut self) -> Result<Option<RawEntry>, VolumeError> {
        Ok(self.items.next())
    }

    fn close(&mut self) {
        self.items = Vec::new().into_iter();
    }
}

impl Volume for InMemoryVolume {
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
        let delay = self.open_delay.lock().ok().and_then(|slot| *slot);
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let dir = if follow_symlinks {
            self.resolve_node(path)?
        } else {
            path.to_path_buf()
        };

        let state = lock_read(&self.state)?;
        if state.failing.contains(&dir) || state.failing.contains(path) {
            return Err(VolumeError::PermissionDenied(dir.display().to_string()));
        }
        let node = state
            .nodes
            .get(&dir)
            .ok_or_else(|| VolumeError::NotFound(dir.display().to_string()))?;
        if !node.is_directory {
            return Err(VolumeError::Io {
                message: format!("{} is not a directory", dir.display()),
                code: None,
            });
        }

        let mut items = vec![
            RawEntry {
                path: dir.clone(),
                name: ".".to_string(),
                is_directory: true,
                is_symlink: false,
            },
            RawEntry {
                path: dir.parent().unwrap_or(&dir).to_path_buf(),
                name: "..".to_string(),
                is_directory: true,
                is_symlink: false,
            },
        ];
        if let Some(names) = state.children.get(&dir) {
            for name in names {
                if let Some(info) = state.nodes.get(&dir.join(name)) {
                    items.push(RawEntry {
                        path: info.path.clone(),
                        name: name.clone(),
                        is_directory: info.is_directory,
                        is_symlink: info.is_symlink,
                    });
                }
            }
        }

        Ok(Box::new(InMemoryListingHandle {
            dir,
            items: items.into_iter(),
        }))
    }

    fn open_tree_walk(
        &self,
        root: &Path,
        follow_root_symlink: bool,
        order_by: SortRole,
    ) -> Result<Box<dyn TreeWalk>, VolumeError> {
        let dir = if follow_root_symlink {
            self.resolve_node(root)?
        } else {
            root.to_path_buf()
        };
        {
            let state = lock_read(&self.state)?;
            match state.nodes.get(&dir) {
                None => return Err(VolumeError::NotFound(dir.display().to_string())),
                Some(info) if !info.is_directory => {
                    return Err(VolumeError::Io {
                        message: format!("{} is not a directory", dir.display()),
                        code: None,
                    });
                }
                Some(_) => {}
            }
        }
        // Walks see a snapshot of the volume taken at open time.
        let snapshot = lock_read(&self.state)?.clone();
        Ok(Box::new(StackWalk::new(dir, move |level_dir: &Path| {
            InMemoryVolume::level_infos(&snapshot, level_dir, order_by)
        })))
    }

    fn query_info(&self, path: &Path) -> Result<FileInfo, VolumeError> {
        let state = lock_read(&self.state)?;
        state
            .nodes
            .get(path)
            .cloned()
            .ok_or_else(|| VolumeError::NotFound(path.display().to_string()))
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, VolumeError> {
        let state = lock_read(&self.state)?;
        match state.nodes.get(path) {
            None => Err(VolumeError::NotFound(path.display().to_string())),
            Some(info) => match &info.symlink_target {
                Some(target) if info.is_symlink => Ok(resolve_target(path, target)),
                _ => Err(VolumeError::Io {
                    message: format!("{} is not a symlink", path.display()),
                    code: None,
                }),
            },
        }
    }

    fn load_hidden_names(&self, parent: &Path) -> HashSet<String> {
        self.hidden_loads.fetch_add(1, Ordering::Relaxed);
        self.state
            .read()
            .ok()
            .and_then(|state| state.hidden.get(parent).cloned())
            .unwrap_or_default()
    }

    fn is_network(&self) -> bool {
        self.network.load(Ordering::Relaxed)
    }
}
