use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::volume::Volume;

/// Per-enumeration cache of hidden-name manifests.
///
/// A directory's manifest is loaded from the volume at most once per
/// enumeration, no matter how many of its children are inspected. The
/// cache is scoped to one enumerator and dropped with it, so edits to a
/// manifest are picked up by the next enumeration.
#[derive(Default)]
pub struct HiddenListCache {
    manifests: HashMap<PathBuf, Arc<HashSet<String>>>,
}

impl HiddenListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the hidden-name set for `parent`, loading it on first use.
    pub fn hidden_names(&mut self, volume: &dyn Volume, parent: &Path) -> Arc<HashSet<String>> {
        if let Some(names) = self.manifests.get(parent) {
            return Arc::clone(names);
        }
        let names = Arc::new(volume.load_hidden_names(parent));
        log::debug!(
            "loaded hidden manifest for {} ({} names)",
            parent.display(),
            names.len()
        );
        self.manifests.insert(parent.to_path_buf(), Arc::clone(&names));
        names
    }

    /// Whether `name` under `parent` is hidden by manifest.
    pub fn is_hidden(&mut self, volume: &dyn Volume, parent: &Path, name: &str) -> bool {
        self.hidden_names(volume, parent).contains(name)
    }
}
