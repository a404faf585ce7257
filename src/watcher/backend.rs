//! Filesystem watch backends.
//!
//! A backend installs per-directory watches and, once the initial tree walk
//! is done, turns into a stream of [`RawEvent`]s. The production backend is
//! Linux inotify; tests substitute their own implementations.

use std::fmt::Debug;
use std::hash::Hash;
use std::io;
use std::path::Path;

use futures::stream::{BoxStream, StreamExt};
use inotify::{Event, EventMask, Inotify, WatchDescriptor, WatchMask};

use super::events::{EventKind, RawEvent};
use crate::error::WatcherError;

/// Size of the buffer inotify events are read into.
///
/// Large enough for several events carrying a maximal (255 byte) name.
const EVENT_BUFFER_SIZE: usize = 4096;

/// Something that can install a watch on a directory.
pub trait WatchBackend {
    /// Opaque identifier for an installed watch.
    type Handle: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Install a watch for completed writes and moved-in entries on `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch cannot be installed.
    fn add_watch(&mut self, dir: &Path) -> Result<Self::Handle, WatcherError>;
}

/// Linux inotify backend.
#[derive(Debug)]
pub struct InotifyBackend {
    inotify: Inotify,
}

impl InotifyBackend {
    /// Open a new inotify instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel refuses a new instance, typically
    /// because `fs.inotify.max_user_instances` is exhausted.
    pub fn init() -> Result<Self, WatcherError> {
        let inotify = Inotify::init().map_err(|e| WatcherError::Init(e.to_string()))?;
        Ok(Self { inotify })
    }

    /// Convert the instance into an async stream of decoded events.
    ///
    /// No further watches can be added afterwards. Must be called from
    /// within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor cannot be registered with the
    /// runtime's reactor.
    pub fn into_events(
        self,
    ) -> Result<BoxStream<'static, io::Result<RawEvent<WatchDescriptor>>>, WatcherError> {
        let stream = self
            .inotify
            .into_event_stream([0u8; EVENT_BUFFER_SIZE])
            .map_err(|e| WatcherError::Init(e.to_string()))?;

        Ok(stream.map(|event| event.map(decode)).boxed())
    }
}

impl WatchBackend for InotifyBackend {
    type Handle = WatchDescriptor;

    fn add_watch(&mut self, dir: &Path) -> Result<WatchDescriptor, WatcherError> {
        let mask = WatchMask::CLOSE_WRITE
            | WatchMask::MOVED_TO
            | WatchMask::ONLYDIR
            | WatchMask::DONT_FOLLOW;

        self.inotify
            .watches()
            .add(dir, mask)
            .map_err(|e| WatcherError::watch_failed(dir, e))
    }
}

fn decode(event: Event<std::ffi::OsString>) -> RawEvent<WatchDescriptor> {
    RawEvent {
        handle: event.wd,
        name: event.name,
        kind: kind_of(event.mask),
    }
}

/// Classify an inotify mask.
///
/// Directory events are never mirrored, and neither are overflow or
/// watch-removed notifications.
fn kind_of(mask: EventMask) -> EventKind {
    if mask.contains(EventMask::ISDIR) {
        EventKind::Other
    } else if mask.contains(EventMask::CLOSE_WRITE) {
        EventKind::CloseWrite
    } else if mask.contains(EventMask::MOVED_TO) {
        EventKind::MovedTo
    } else {
        EventKind::Other
    }
}
