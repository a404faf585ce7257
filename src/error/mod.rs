//! Error types and Result aliases for treemirror.
//!
//! Startup failures ([`WatcherError`] raised while walking the tree) surface
//! at the process boundary. Per-event failures ([`CopyError`] and unresolved
//! handles) are reported by the event loop and never escalate.

use std::path::Path;

use thiserror::Error;

/// Result type alias using treemirror's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for treemirror operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Watch subsystem or tree walk error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),
}

/// Watch subsystem errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// The watch subsystem itself could not be initialized.
    #[error("failed to initialize watch subsystem: {0}")]
    Init(String),

    /// Failed to install a watch on a directory.
    #[error("failed to watch path '{path}': {reason}")]
    WatchFailed { path: String, reason: String },

    /// Directory traversal failed.
    #[error("failed to walk '{path}': {reason}")]
    Walk { path: String, reason: String },

    /// Directory nesting exceeded the walk limit.
    #[error("directory '{path}' is nested deeper than {limit} levels")]
    DepthExceeded { path: String, limit: usize },

    /// The backend handed out a handle that is already registered.
    #[error("watch handle {handle} for '{path}' is already registered")]
    DuplicateHandle { handle: String, path: String },

    /// An event arrived for a handle that was never registered.
    #[error("no directory registered for watch handle {handle}")]
    UnknownHandle { handle: String },
}

/// Errors raised while mirroring a single file.
#[derive(Error, Debug)]
pub enum CopyError {
    /// The source file could not be opened.
    #[error("source '{path}' unavailable: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A file with the same name was already mirrored.
    #[error("destination '{path}' already exists")]
    DestinationCollision { path: String },

    /// The destination could not be created for another reason.
    #[error("failed to create destination '{path}': {source}")]
    DestinationCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the source failed mid-copy.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the destination failed mid-copy.
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The blocking copy task panicked or was cancelled.
    #[error("copy task failed: {0}")]
    Task(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl WatcherError {
    /// Create a watch-install error for `path`.
    pub fn watch_failed(path: &Path, reason: impl ToString) -> Self {
        Self::WatchFailed {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl CopyError {
    /// Whether this failure is the first-writer-wins collision policy.
    #[must_use]
    pub const fn is_collision(&self) -> bool {
        matches!(self, Self::DestinationCollision { .. })
    }
}
