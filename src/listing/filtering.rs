//! The entry filter chain.
//!
//! Every candidate produced by the cursor runs through the same sequence
//! of predicates: dot-entry flags, entry category, permission bits,
//! symlink rejection, hidden status, then name patterns. The predicates
//! are independent; rejection by one never short-circuits descent
//! decisions, which the cursor makes separately.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::{DirFilterFlags, EnumeratorConfig};
use crate::error::EnumeratorError;
use crate::listing::hidden_cache::HiddenListCache;
use crate::listing::symlinks::resolve_symlink;
use crate::metadata::FileInfo;
use crate::volume::Volume;

pub struct FilterChain {
    filters: DirFilterFlags,
    patterns: Option<GlobSet>,
}

impl FilterChain {
    pub fn new(config: &EnumeratorConfig) -> Result<Self, EnumeratorError> {
        let case_sensitive = config.dir_filters.contains(DirFilterFlags::CASE_SENSITIVE);
        let patterns = build_patterns(&config.name_filters, case_sensitive)?;
        Ok(Self {
            filters: config.dir_filters,
            patterns,
        })
    }

    /// Whether the sentinel disabling the whole chain is set.
    pub fn is_no_filter(&self) -> bool {
        self.filters.contains(DirFilterFlags::NO_FILTER)
    }

    /// Runs `info` through the chain. `hidden` memoizes manifest loads
    /// across calls within one enumeration.
    pub fn accepts(
        &self,
        volume: &dyn Volume,
        hidden: &mut HiddenListCache,
        info: &FileInfo,
    ) -> bool {
        if self.is_no_filter() {
            return true;
        }

        let name = info.name.as_str();
        let is_dot = name == ".";
        let is_dot_dot = name == "..";
        if is_dot && self.filters.contains(DirFilterFlags::NO_DOT) {
            return false;
        }
        if is_dot_dot && self.filters.contains(DirFilterFlags::NO_DOT_DOT) {
            return false;
        }

        // A symlink's category follows its resolved target; a broken or
        // cyclic chain classifies as a non-directory.
        let dir_like = info.is_directory
            || (info.is_symlink && resolve_symlink(volume, &info.path).is_directory());
        let all_dirs = self.filters.contains(DirFilterFlags::ALL_DIRS);
        if dir_like {
            if !all_dirs && !self.filters.contains(DirFilterFlags::DIRS) {
                return false;
            }
        } else if !self.filters.contains(DirFilterFlags::FILES) {
            return false;
        }

        if self.filters.contains(DirFilterFlags::READABLE) && !info.can_read {
            return false;
        }
        if self.filters.contains(DirFilterFlags::WRITABLE) && !info.can_write {
            return false;
        }
        if self.filters.contains(DirFilterFlags::EXECUTABLE) && !info.can_execute {
            return false;
        }

        if self.filters.contains(DirFilterFlags::NO_SYMLINKS) && info.is_symlink {
            return false;
        }

        // "." and ".." are never treated as hidden and never pattern-matched.
        if is_dot || is_dot_dot {
            return true;
        }

        if !self.filters.contains(DirFilterFlags::HIDDEN) {
            if name.starts_with('.') {
                return false;
            }
            if let Some(parent) = info.parent.as_deref()
                && hidden.is_hidden(volume, parent, name)
            {
                return false;
            }
        }

        if let Some(patterns) = &self.patterns {
            // Directories bypass name patterns when ALL_DIRS is set.
            if dir_like && all_dirs {
                return true;
            }
            return patterns.is_match(name);
        }
        true
    }
}

fn build_patterns(
    name_filters: &[String],
    case_sensitive: bool,
) -> Result<Option<GlobSet>, EnumeratorError> {
    if name_filters.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in name_filters {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|_| EnumeratorError::InvalidPattern(pattern.clone()))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|err| EnumeratorError::InvalidPattern(err.to_string()))?;
    Ok(Some(set))
}
