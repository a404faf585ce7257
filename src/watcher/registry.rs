//! Watch handle to directory path registry.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use crate::error::WatcherError;

/// Maps each installed watch to the absolute directory it watches.
///
/// Entries are written once during the initial tree walk and only read
/// afterwards. Watches are never removed, so a handle keeps its path for the
/// life of the process.
#[derive(Debug, Clone)]
pub struct PathRegistry<H> {
    entries: HashMap<H, PathBuf>,
}

impl<H> Default for PathRegistry<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H: Eq + Hash + Debug> PathRegistry<H> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry sized for `capacity` directories.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Record the directory watched by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::DuplicateHandle`] if `handle` is already
    /// registered. The existing entry is left untouched.
    pub fn register(&mut self, handle: H, path: PathBuf) -> Result<(), WatcherError> {
        if let Some(existing) = self.entries.get(&handle) {
            return Err(WatcherError::DuplicateHandle {
                handle: format!("{handle:?}"),
                path: format!("{} (already {})", path.display(), existing.display()),
            });
        }

        tracing::trace!(?handle, path = %path.display(), "Registered watch");
        self.entries.insert(handle, path);
        Ok(())
    }

    /// Look up the directory watched by `handle`.
    #[must_use]
    pub fn resolve(&self, handle: &H) -> Option<&Path> {
        self.entries.get(handle).map(PathBuf::as_path)
    }

    /// Number of registered watches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no watch has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all (handle, directory) pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&H, &Path)> {
        self.entries.iter().map(|(h, p)| (h, p.as_path()))
    }
}
