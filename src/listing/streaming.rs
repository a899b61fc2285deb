//! Background streaming of a single directory level.
//!
//! Asynchronous acquisition drains the raw listing on a blocking worker
//! and hands filtered entries to the consumer through a shared buffer.
//! The first batch is large so the consumer can paint something useful
//! immediately; later batches are small to keep latency down. Streaming
//! never recurses; it covers the root directory only.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use crate::config::{EnumeratorConfig, IoPriority};
use crate::error::EnumeratorError;
use crate::listing::candidate_info;
use crate::listing::filtering::FilterChain;
use crate::listing::hidden_cache::HiddenListCache;
use crate::metadata::FileInfo;
use crate::volume::Volume;

/// Entries delivered in the first batch.
pub(crate) const FIRST_BATCH_SIZE: usize = 1000;
/// Entries per batch after the first.
pub(crate) const NEXT_BATCH_SIZE: usize = 100;
/// How long the consumer sleeps between buffer polls.
pub(crate) const BUFFER_POLL_INTERVAL: Duration = Duration::from_millis(10);

type OverCallback = Box<dyn FnOnce() + Send>;

/// State shared between the producing worker and the consuming cursor.
pub struct StreamState {
    id: String,
    buffer: Mutex<VecDeque<FileInfo>>,
    stopped: AtomicBool,
    over: AtomicBool,
    error: Mutex<Option<EnumeratorError>>,
    on_over: Mutex<Option<OverCallback>>,
}

impl StreamState {
    pub fn new(on_over: Option<OverCallback>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            buffer: Mutex::new(VecDeque::new()),
            stopped: AtomicBool::new(false),
            over: AtomicBool::new(false),
            error: Mutex::new(None),
            on_over: Mutex::new(on_over),
        }
    }

    /// Stable identifier of this streaming session, for log correlation.
    pub fn listing_id(&self) -> &str {
        &self.id
    }

    /// Asks the producer to stop; already-buffered entries stay readable.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Whether the producer has finished (normally, by error, or stopped).
    pub fn is_over(&self) -> bool {
        self.over.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<EnumeratorError> {
        self.error.lock().ok().and_then(|slot| slot.clone())
    }

    pub(crate) fn buffered_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub(crate) fn pop(&self) -> Option<FileInfo> {
        self.buffer.lock().ok().and_then(|mut buf| buf.pop_front())
    }

    fn push_batch(&self, batch: Vec<FileInfo>) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.extend(batch);
        }
    }

    fn set_error(&self, err: EnumeratorError) {
        if let Ok(mut slot) = self.error.lock() {
            *slot = Some(err);
        }
    }

    fn finish(&self) {
        self.over.store(true, Ordering::Relaxed);
        // A stop that raced the final batch wins: the callback is skipped.
        if self.is_stopped() {
            return;
        }
        let callback = self.on_over.lock().ok().and_then(|mut slot| slot.take());
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Starts the producing worker for one directory level.
pub(crate) fn spawn_listing_task(
    volume: Arc<dyn Volume>,
    dir: PathBuf,
    config: EnumeratorConfig,
    chain: FilterChain,
    state: Arc<StreamState>,
    priority: IoPriority,
) {
    log::debug!(
        "starting listing {} for {} (priority {:?})",
        state.listing_id(),
        dir.display(),
        priority
    );
    tokio::spawn(async move {
        let worker_state = Arc::clone(&state);
        let result = tokio::task::spawn_blocking(move || {
            drain_listing(volume.as_ref(), &dir, &config, &chain, &worker_state)
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => state.set_error(err),
            Err(join_err) => state.set_error(EnumeratorError::Backend {
                message: join_err.to_string(),
                code: None,
            }),
        }
        state.finish();
    });
}

fn drain_listing(
    volume: &dyn Volume,
    dir: &Path,
    config: &EnumeratorConfig,
    chain: &FilterChain,
    state: &StreamState,
) -> Result<(), EnumeratorError> {
    let mut hidden = HiddenListCache::new();
    let mut handle = volume.open_listing(dir, config.follow_symlinks())?;

    let mut batch_size = FIRST_BATCH_SIZE;
    loop {
        if state.is_stopped() {
            break;
        }
        let raw_batch = match handle.next_batch(batch_size) {
            Ok(raw_batch) => raw_batch,
            Err(err) => {
                handle.close();
                return Err(err.into());
            }
        };
        // A short batch means the listing is exhausted.
        let exhausted = raw_batch.len() < batch_size;
        let batch: Vec<FileInfo> = raw_batch
            .iter()
            .filter_map(|raw| candidate_info(volume, raw, dir))
            .filter(|info| chain.accepts(volume, &mut hidden, info))
            .collect();
        if !batch.is_empty() {
            state.push_batch(batch);
        }
        if exhausted {
            break;
        }
        batch_size = NEXT_BATCH_SIZE;
    }
    handle.close();
    Ok(())
}
