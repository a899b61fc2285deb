//! Directory enumeration engine over pluggable volume backends.
//!
//! The crate centers on [`DirEnumerator`], a cursor that walks one
//! directory (optionally recursing) through a configurable filter chain,
//! plus a bulk path that produces a fully sorted snapshot in a single
//! call. Entry names compare with a natural, locale-aware order: digit
//! runs by numeric value, Han characters by pinyin, full-width forms
//! folded to their ASCII counterparts.
//!
//! Backends implement the [`volume::Volume`] trait. [`LocalPosixVolume`]
//! covers the local file system; [`InMemoryVolume`] serves virtual
//! listings and tests. Acquisition is synchronous, bounded by a timeout
//! on the root open, or streamed from a background worker in batches.
//!
//! ```no_run
//! use direnum::config::{DirFilterFlags, EnumeratorConfig};
//! use direnum::volume::local_posix::LocalPosixVolume;
//! use direnum::DirEnumerator;
//! use std::sync::Arc;
//!
//! let volume = Arc::new(LocalPosixVolume::new("local", "/"));
//! let mut config = EnumeratorConfig::default();
//! config.dir_filters = DirFilterFlags::FILES | DirFilterFlags::NO_DOT_AND_DOT_DOT;
//! let mut cursor = DirEnumerator::with_config(volume, "/tmp", config);
//! while let Some(path) = cursor.next() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod config;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod volume;

pub use config::{
    DirFilterFlags, EnumeratorConfig, IoPriority, IteratorFlags, SortOrder, SortRole,
};
pub use error::EnumeratorError;
pub use listing::{DirEnumerator, StreamState, compare_natural};
pub use metadata::{FileInfo, SortFileInfo};
pub use volume::inmemory::InMemoryVolume;
#[cfg(unix)]
pub use volume::local_posix::LocalPosixVolume;
pub use volume::{ListingHandle, RawEntry, Volume, VolumeError};
