//! One-shot directory walk that installs a watch on every directory.

use std::path::Path;

use walkdir::WalkDir;

use super::backend::WatchBackend;
use super::registry::PathRegistry;
use crate::error::WatcherError;

/// Deepest directory nesting (relative to the root) that will be watched.
pub const MAX_WALK_DEPTH: usize = 100;

/// Summary of a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Directories now watched.
    pub directories: usize,
    /// Non-directory entries passed over.
    pub skipped: usize,
}

/// Walk `root` and register a watch for every directory beneath it.
///
/// Symbolic links are not followed. The root is canonicalized so every
/// registered path is absolute. The walk stops at the first failure: a
/// partially watched tree is never returned as success.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, any directory cannot be
/// read or watched, a directory is nested deeper than [`MAX_WALK_DEPTH`], or
/// the backend hands out a duplicate handle.
pub fn register_tree<B: WatchBackend>(
    root: &Path,
    backend: &mut B,
    registry: &mut PathRegistry<B::Handle>,
) -> Result<WalkSummary, WatcherError> {
    let root = std::fs::canonicalize(root).map_err(|e| WatcherError::Walk {
        path: root.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!(path = %root.display(), "Registering watches");

    let mut summary = WalkSummary::default();
    let walker = WalkDir::new(&root)
        .follow_links(false)
        .max_depth(MAX_WALK_DEPTH + 1);

    for entry in walker {
        let entry = entry.map_err(|e| WatcherError::Walk {
            path: e.path().unwrap_or(root.as_path()).display().to_string(),
            reason: e.to_string(),
        })?;

        if !entry.file_type().is_dir() {
            summary.skipped += 1;
            continue;
        }

        if entry.depth() > MAX_WALK_DEPTH {
            return Err(WatcherError::DepthExceeded {
                path: entry.path().display().to_string(),
                limit: MAX_WALK_DEPTH,
            });
        }

        let dir = entry.into_path();
        let handle = backend.add_watch(&dir)?;
        registry.register(handle, dir)?;
        summary.directories += 1;
    }

    tracing::info!(
        path = %root.display(),
        directories = summary.directories,
        skipped = summary.skipped,
        "Watch registration complete"
    );

    Ok(summary)
}
