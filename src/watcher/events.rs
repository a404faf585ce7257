//! File system event types and resolution.

use std::ffi::{OsStr, OsString};
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Component, Path, PathBuf};

use super::registry::PathRegistry;
use crate::error::WatcherError;

/// Kind of a raw watch notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A file opened for writing was closed.
    CloseWrite,
    /// An entry was moved into the watched directory.
    MovedTo,
    /// Anything else; received and discarded.
    Other,
}

impl EventKind {
    /// Whether events of this kind trigger a mirror copy.
    #[must_use]
    pub const fn is_relevant(self) -> bool {
        matches!(self, Self::CloseWrite | Self::MovedTo)
    }
}

/// A decoded record from the watch backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent<H> {
    /// Watch the event fired on.
    pub handle: H,
    /// Base name of the affected entry, if the event carries one.
    pub name: Option<OsString>,
    /// What happened.
    pub kind: EventKind,
}

/// A completed or moved-in file inside a watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent<H> {
    /// Watch of the containing directory.
    pub handle: H,
    /// Base name of the file.
    pub name: OsString,
}

impl<H> FileEvent<H> {
    /// Decode a raw event, keeping only relevant kinds with a plain file name.
    #[must_use]
    pub fn from_raw(raw: RawEvent<H>) -> Option<Self> {
        if !raw.kind.is_relevant() {
            return None;
        }

        let name = raw.name?;
        if !is_plain_name(&name) {
            return None;
        }

        Some(Self {
            handle: raw.handle,
            name,
        })
    }
}

/// Resolve an event to the absolute path of the affected source file.
///
/// # Errors
///
/// Returns [`WatcherError::UnknownHandle`] if the event's watch was never
/// registered.
pub fn resolve<H>(
    registry: &PathRegistry<H>,
    event: &FileEvent<H>,
) -> Result<PathBuf, WatcherError>
where
    H: Eq + Hash + Debug,
{
    registry
        .resolve(&event.handle)
        .map(|dir| dir.join(&event.name))
        .ok_or_else(|| WatcherError::UnknownHandle {
            handle: format!("{:?}", event.handle),
        })
}

/// A name is plain when it is exactly one normal path component.
fn is_plain_name(name: &OsStr) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.to_string_lossy().contains('/')
}
