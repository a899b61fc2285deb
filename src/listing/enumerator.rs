//! The directory enumeration cursor.
//!
//! `DirEnumerator` walks one directory (optionally recursing depth-first)
//! over an opaque [`Volume`] backend, running every candidate through the
//! filter chain. Acquisition comes in three flavors: synchronous, with a
//! bounded wait on the root open, or streaming through a background
//! worker. Errors during recursive descent abandon the failing branch
//! and are surfaced through `last_error`; only a root failure is
//! terminal.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::config::{
    DirFilterFlags, EnumeratorConfig, IoPriority, IteratorFlags, SortOrder, SortRole,
};
use crate::error::EnumeratorError;
use crate::listing::candidate_info;
use crate::listing::filtering::FilterChain;
use crate::listing::hidden_cache::HiddenListCache;
use crate::listing::snapshot::{collect_level, concat_buckets};
use crate::listing::streaming::{BUFFER_POLL_INTERVAL, StreamState, spawn_listing_task};
use crate::listing::symlinks::{ResolvedLink, resolve_symlink};
use crate::metadata::{FileInfo, SortFileInfo};
use crate::volume::{ListingHandle, Volume};

/// One open directory on the descent stack.
struct Frame {
    handle: Box<dyn ListingHandle>,
    /// Directory the handle reads; candidate parent for manifest lookups.
    dir: PathBuf,
    /// Resolved identity guarding against symlink descent loops.
    key: PathBuf,
}

pub struct DirEnumerator {
    volume: Arc<dyn Volume>,
    root: PathBuf,
    config: EnumeratorConfig,
    chain: Option<FilterChain>,
    hidden: HiddenListCache,
    cancel: Arc<AtomicBool>,
    stack: Vec<Frame>,
    started: bool,
    stream: Option<Arc<StreamState>>,
    pending: Option<FileInfo>,
    current: Option<FileInfo>,
    last_error: Option<EnumeratorError>,
}

impl DirEnumerator {
    pub fn new(volume: Arc<dyn Volume>, path: impl Into<PathBuf>) -> Self {
        Self::with_config(volume, path, EnumeratorConfig::default())
    }

    pub fn with_config(
        volume: Arc<dyn Volume>,
        path: impl Into<PathBuf>,
        config: EnumeratorConfig,
    ) -> Self {
        Self {
            volume,
            root: path.into(),
            config,
            chain: None,
            hidden: HiddenListCache::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            stack: Vec::new(),
            started: false,
            stream: None,
            pending: None,
            current: None,
            last_error: None,
        }
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    pub fn set_name_filters(&mut self, filters: Vec<String>) {
        self.config.name_filters = filters;
        self.chain = None;
    }

    pub fn set_dir_filters(&mut self, filters: DirFilterFlags) {
        self.config.dir_filters = filters;
        self.chain = None;
    }

    pub fn set_iterator_flags(&mut self, flags: IteratorFlags) {
        self.config.iterator_flags = flags;
    }

    pub fn set_sort(&mut self, role: SortRole, order: SortOrder) {
        self.config.sort_role = role;
        self.config.sort_order = order;
    }

    pub fn set_mix_dirs_and_files(&mut self, mix: bool) {
        self.config.mix_dirs_and_files = mix;
    }

    /// Bounded wait for the root open; `None` blocks indefinitely.
    pub fn set_timeout_ms(&mut self, timeout_ms: Option<u64>) {
        self.config.timeout_ms = timeout_ms;
    }

    pub fn last_error(&self) -> Option<&EnumeratorError> {
        self.last_error.as_ref()
    }

    /// Stops the enumeration. Sticky: a cancelled enumerator yields nothing.
    /// Returns `false` when the session was already cancelled.
    pub fn cancel(&self) -> bool {
        let was_cancelled = self.cancel.swap(true, Ordering::Relaxed);
        if let Some(stream) = &self.stream {
            stream.stop();
        }
        !was_cancelled
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn ensure_chain(&mut self) -> Result<(), EnumeratorError> {
        if self.chain.is_none() {
            self.chain = Some(FilterChain::new(&self.config)?);
        }
        Ok(())
    }

    /// Opens the root handle synchronously, honoring the configured
    /// bounded wait. Must be called before the cursor methods; `has_next`
    /// calls it implicitly on first use.
    pub fn start(&mut self) -> Result<(), EnumeratorError> {
        if self.started {
            return Ok(());
        }
        self.ensure_chain()?;
        let handle = open_with_timeout(
            Arc::clone(&self.volume),
            self.root.clone(),
            self.config.follow_symlinks(),
            self.config.timeout(),
        )?;
        let key = handle.path().to_path_buf();
        self.stack.push(Frame {
            handle,
            dir: self.root.clone(),
            key,
        });
        self.started = true;
        Ok(())
    }

    /// Starts streaming acquisition: the root level is drained by a
    /// background worker and consumed through the cursor methods. The
    /// callback fires once the worker finishes, unless it was stopped.
    /// Streaming never recurses. Must be called within a tokio runtime.
    pub fn start_streaming(
        &mut self,
        priority: IoPriority,
        on_over: Option<Box<dyn FnOnce() + Send>>,
    ) -> Result<Arc<StreamState>, EnumeratorError> {
        self.ensure_chain()?;
        let chain = FilterChain::new(&self.config)?;
        let state = Arc::new(StreamState::new(on_over));
        spawn_listing_task(
            Arc::clone(&self.volume),
            self.root.clone(),
            self.config.clone(),
            chain,
            Arc::clone(&state),
            priority,
        );
        self.stream = Some(Arc::clone(&state));
        self.started = true;
        Ok(state)
    }

    /// Whether another accepted entry is available, advancing the cursor's
    /// lookahead. In streaming mode this blocks (polling) until the worker
    /// buffers an entry or finishes.
    pub fn has_next(&mut self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        if self.pending.is_some() {
            return true;
        }
        if self.stream.is_some() {
            return self.poll_stream();
        }
        if !self.started
            && let Err(err) = self.start()
        {
            self.last_error = Some(err);
            return false;
        }
        self.advance()
    }

    /// Moves to the next accepted entry and returns its path.
    pub fn next(&mut self) -> Option<PathBuf> {
        if self.pending.is_none() && !self.has_next() {
            self.current = None;
            return None;
        }
        self.current = self.pending.take();
        self.current.as_ref().map(|info| info.path.clone())
    }

    /// Attributes of the entry `next` last returned.
    pub fn current_info(&self) -> Option<&FileInfo> {
        self.current.as_ref()
    }

    fn poll_stream(&mut self) -> bool {
        let Some(stream) = self.stream.as_ref().map(Arc::clone) else {
            return false;
        };
        loop {
            if self.is_cancelled() {
                return false;
            }
            if let Some(info) = stream.pop() {
                self.pending = Some(info);
                return true;
            }
            if stream.is_over() {
                // The worker may have pushed a final batch before flagging.
                if let Some(info) = stream.pop() {
                    self.pending = Some(info);
                    return true;
                }
                if let Some(err) = stream.last_error() {
                    self.last_error = Some(err);
                }
                return false;
            }
            std::thread::sleep(BUFFER_POLL_INTERVAL);
        }
    }

    /// Depth-first advance over the handle stack.
    fn advance(&mut self) -> bool {
        loop {
            if self.is_cancelled() {
                return false;
            }
            let (step, dir) = match self.stack.last_mut() {
                None => return false,
                Some(frame) => (frame.handle.next_entry(), frame.dir.clone()),
            };
            match step {
                Ok(Some(raw)) => {
                    let Some(info) = candidate_info(self.volume.as_ref(), &raw, &dir) else {
                        continue;
                    };
                    if self.config.recurse() {
                        self.maybe_descend(&info);
                    }
                    let Some(chain) = self.chain.as_ref() else {
                        return false;
                    };
                    if chain.accepts(self.volume.as_ref(), &mut self.hidden, &info) {
                        self.pending = Some(info);
                        return true;
                    }
                }
                Ok(None) => {
                    self.pop_frame();
                }
                Err(err) => {
                    log::warn!("listing {} failed: {}", dir.display(), err);
                    self.last_error = Some(err.into());
                    self.pop_frame();
                }
            }
        }
    }

    /// Pushes a child handle when `info` is a directory the configuration
    /// says to recurse into. Independent of filter acceptance: a rejected
    /// directory is still descended. Open failures abandon the branch.
    fn maybe_descend(&mut self, info: &FileInfo) {
        if info.name == "." || info.name == ".." {
            return;
        }
        let key = if info.is_directory {
            info.path.clone()
        } else if info.is_symlink && self.config.follow_symlinks() {
            match resolve_symlink(self.volume.as_ref(), &info.path) {
                ResolvedLink::Target(target) if target.is_directory => target.path,
                _ => return,
            }
        } else {
            return;
        };
        // Re-entering an open directory (directly or through a link) would
        // loop forever.
        if self.stack.iter().any(|frame| frame.key == key) {
            return;
        }
        match self
            .volume
            .open_listing(&info.path, self.config.follow_symlinks())
        {
            Ok(handle) => self.stack.push(Frame {
                handle,
                dir: info.path.clone(),
                key,
            }),
            Err(err) => {
                log::warn!("cannot descend into {}: {}", info.path.display(), err);
                self.last_error = Some(err.into());
            }
        }
    }

    fn pop_frame(&mut self) {
        if let Some(mut frame) = self.stack.pop() {
            frame.handle.close();
        }
    }

    /// Drains the cursor and counts the accepted entries. One-shot and
    /// consuming: the cursor is exhausted afterwards. Honors recursion.
    pub fn file_count(&mut self) -> u64 {
        let mut count: u64 = 0;
        while self.has_next() {
            self.pending = None;
            count += 1;
        }
        count
    }

    /// Root-level accepted entries in backend order. Never recurses and
    /// leaves the cursor position untouched.
    pub fn file_info_list(&mut self) -> Result<Vec<FileInfo>, EnumeratorError> {
        self.list_root()
    }

    fn list_root(&mut self) -> Result<Vec<FileInfo>, EnumeratorError> {
        self.ensure_chain()?;
        let mut handle = self
            .volume
            .open_listing(&self.root, self.config.follow_symlinks())?;
        let mut out = Vec::new();
        loop {
            if self.is_cancelled() {
                handle.close();
                return Err(EnumeratorError::Canceled);
            }
            match handle.next_entry() {
                Ok(Some(raw)) => {
                    let Some(info) = candidate_info(self.volume.as_ref(), &raw, &self.root) else {
                        continue;
                    };
                    let Some(chain) = self.chain.as_ref() else {
                        break;
                    };
                    if chain.accepts(self.volume.as_ref(), &mut self.hidden, &info) {
                        out.push(info);
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    handle.close();
                    return Err(err.into());
                }
            }
        }
        handle.close();
        Ok(out)
    }

    /// Bulk sorted snapshot: every accepted entry under the root (one
    /// level, or the whole tree when recursing breadth-first), sorted by
    /// the configured role with directories bucketed ahead of files
    /// unless mixing is on. Descending order reverses entries within each
    /// level; levels themselves stay in traversal order.
    pub fn sort_file_info_list(&mut self) -> Result<Vec<SortFileInfo>, EnumeratorError> {
        self.ensure_chain()?;
        let mut dirs: Vec<SortFileInfo> = Vec::new();
        let mut files: Vec<SortFileInfo> = Vec::new();
        let mut queue: VecDeque<PathBuf> = VecDeque::from([self.root.clone()]);
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut at_root = true;

        while let Some(dir) = queue.pop_front() {
            if !visited.insert(dir.clone()) {
                continue;
            }
            let Some(chain) = self.chain.as_ref() else {
                break;
            };
            match collect_level(
                self.volume.as_ref(),
                &dir,
                &self.config,
                chain,
                &mut self.hidden,
                &self.cancel,
            ) {
                Ok(buckets) => {
                    dirs.extend(buckets.dirs);
                    files.extend(buckets.files);
                    if self.config.recurse() {
                        queue.extend(buckets.subdirs);
                    }
                }
                Err(EnumeratorError::Canceled) => return Err(EnumeratorError::Canceled),
                Err(err) if at_root => return Err(err),
                Err(err) => {
                    log::warn!("skipping branch {}: {}", dir.display(), err);
                    self.last_error = Some(err);
                }
            }
            at_root = false;
        }
        Ok(concat_buckets(dirs, files))
    }
}

impl Drop for DirEnumerator {
    fn drop(&mut self) {
        self.cancel();
        while !self.stack.is_empty() {
            self.pop_frame();
        }
    }
}

/// Opens a listing handle, giving up after `timeout` if the backend
/// stalls. The worker keeps running after a timeout; its handle is
/// dropped when it eventually finishes.
fn open_with_timeout(
    volume: Arc<dyn Volume>,
    path: PathBuf,
    follow_symlinks: bool,
    timeout: Option<Duration>,
) -> Result<Box<dyn ListingHandle>, EnumeratorError> {
    let Some(timeout) = timeout else {
        return volume.open_listing(&path, follow_symlinks).map_err(Into::into);
    };
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = volume.open_listing(&path, follow_symlinks);
        // Receiver may be gone after a timeout.
        let _ = tx.send(result);
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(EnumeratorError::Timeout),
    }
}
