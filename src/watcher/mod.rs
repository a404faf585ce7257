//! Directory watching.
//!
//! This module provides:
//! - A registry mapping each watch handle to its directory
//! - The inotify watch backend and its decoded event stream
//! - A one-shot tree walk that watches every directory under a root
//! - Resolution of events to absolute source file paths

mod backend;
mod events;
mod registry;
mod walker;

pub use backend::{InotifyBackend, WatchBackend};
pub use events::{resolve, EventKind, FileEvent, RawEvent};
pub use registry::PathRegistry;
pub use walker::{register_tree, WalkSummary, MAX_WALK_DEPTH};
