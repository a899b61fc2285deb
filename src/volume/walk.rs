//! Shared tree-walk driver used by the volume implementations.
//!
//! An explicit stack of sorted sibling levels, not a call stack, so walks
//! over arbitrarily deep trees never hit a recursion limit. The backend
//! supplies a level reader; the driver produces pre-visit, entry, and
//! post-visit events and honors `skip_descent`.

use std::path::{Path, PathBuf};

use crate::metadata::SortFileInfo;
use crate::volume::{RawTreeEntry, TreeEntryKind, TreeWalk};

struct Level {
    dir: PathBuf,
    depth: usize,
    entries: std::vec::IntoIter<SortFileInfo>,
}

struct PendingDir {
    path: PathBuf,
    depth: usize,
    skip: bool,
}

pub(crate) struct StackWalk<F> {
    read_level: F,
    root: PathBuf,
    emitted_root: bool,
    levels: Vec<Level>,
    pending: Option<PendingDir>,
    closed: bool,
}

impl<F> StackWalk<F>
where
    F: FnMut(&Path) -> Vec<SortFileInfo> + Send,
{
    pub(crate) fn new(root: PathBuf, read_level: F) -> Self {
        Self {
            read_level,
            root,
            emitted_root: false,
            levels: Vec::new(),
            pending: None,
            closed: false,
        }
    }
}

fn classify(item: &SortFileInfo) -> TreeEntryKind {
    if item.is_symlink {
        TreeEntryKind::Symlink
    } else if item.is_directory {
        TreeEntryKind::DirPreVisit
    } else if item.is_file {
        TreeEntryKind::File
    } else {
        TreeEntryKind::Other
    }
}

impl<F> TreeWalk for StackWalk<F>
where
    F: FnMut(&Path) -> Vec<SortFileInfo> + Send,
{
    fn next_entry(&mut self) -> Option<RawTreeEntry> {
        if self.closed {
            return None;
        }

        // Descent decision for the directory yielded by the previous call:
        // unless the caller marked it skipped, its level is entered now.
        if let Some(pending) = self.pending.take()
            && !pending.skip
        {
            let entries = (self.read_level)(&pending.path);
            self.levels.push(Level {
                dir: pending.path,
                depth: pending.depth + 1,
                entries: entries.into_iter(),
            });
        }

        if !self.emitted_root {
            self.emitted_root = true;
            let root = self.root.clone();
            let entries = (self.read_level)(&root);
            self.levels.push(Level {
                dir: root.clone(),
                depth: 1,
                entries: entries.into_iter(),
            });
            return Some(RawTreeEntry {
                path: root,
                depth: 0,
                kind: TreeEntryKind::DirPreVisit,
            });
        }

        loop {
            let (item, depth) = match self.levels.last_mut() {
                None => return None,
                Some(level) => (level.entries.next(), level.depth),
            };
            match item {
                Some(item) => {
                    let kind = classify(&item);
                    if kind == TreeEntryKind::DirPreVisit {
                        self.pending = Some(PendingDir {
                            path: item.url.clone(),
                            depth,
                            skip: false,
                        });
                    }
                    return Some(RawTreeEntry {
                        path: item.url,
                        depth,
                        kind,
                    });
                }
                None => {
                    if let Some(level) = self.levels.pop() {
                        return Some(RawTreeEntry {
                            path: level.dir,
                            depth: level.depth - 1,
                            kind: TreeEntryKind::DirPostVisit,
                        });
                    }
                }
            }
        }
    }

    fn skip_descent(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.skip = true;
        }
    }

    fn close(&mut self) {
        self.levels.clear();
        self.pending = None;
        self.closed = true;
    }
}
