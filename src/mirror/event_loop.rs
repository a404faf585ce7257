//! The event loop: watch events in, mirrored files out.

use std::fmt::Debug;
use std::hash::Hash;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::copier::{mirror_file, CopyOptions, CopyOutcome};
use super::stats::MirrorStats;
use crate::error::CopyError;
use crate::watcher::{resolve, FileEvent, PathRegistry, RawEvent};

/// Everything the event loop needs, built once after the tree walk.
///
/// The registry is read-only from here on.
#[derive(Debug)]
pub struct MirrorContext<H> {
    registry: PathRegistry<H>,
    output_dir: PathBuf,
    options: CopyOptions,
}

impl<H> MirrorContext<H> {
    /// Bundle a populated registry with the mirror destination.
    #[must_use]
    pub const fn new(
        registry: PathRegistry<H>,
        output_dir: PathBuf,
        options: CopyOptions,
    ) -> Self {
        Self {
            registry,
            output_dir,
            options,
        }
    }

    /// The watch registry.
    #[must_use]
    pub const fn registry(&self) -> &PathRegistry<H> {
        &self.registry
    }

    /// Directory files are mirrored into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Copy options in effect.
    #[must_use]
    pub const fn options(&self) -> CopyOptions {
        self.options
    }
}

/// What happened to a single event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Not a completion event for a file.
    Ignored,
    /// The event's watch handle is not in the registry.
    Unresolved,
    /// The file was mirrored.
    Copied(CopyOutcome),
    /// The copy was attempted and failed.
    Failed(CopyError),
}

/// Why the event loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shutdown {
    /// The cancellation token fired.
    Cancelled,
    /// The event stream ended.
    ChannelClosed,
    /// Reading the event stream failed.
    ChannelFailed(String),
}

/// Drives mirroring from a stream of raw watch events.
#[derive(Debug)]
pub struct EventLoop<H> {
    context: MirrorContext<H>,
    stats: Arc<MirrorStats>,
}

impl<H> EventLoop<H>
where
    H: Eq + Hash + Debug + Send + Sync + 'static,
{
    /// Create an event loop over a fully populated context.
    #[must_use]
    pub fn new(context: MirrorContext<H>) -> Self {
        Self {
            context,
            stats: MirrorStats::new(),
        }
    }

    /// Shared handle to the loop's counters.
    #[must_use]
    pub fn stats(&self) -> Arc<MirrorStats> {
        Arc::clone(&self.stats)
    }

    /// Process events until the stream ends, fails, or `cancel` fires.
    ///
    /// Cancellation is checked between events; a copy in progress always
    /// runs to completion. Per-event failures never stop the loop.
    pub async fn run<S>(&self, mut events: S, cancel: CancellationToken) -> Shutdown
    where
        S: Stream<Item = io::Result<RawEvent<H>>> + Unpin,
    {
        tracing::info!(
            watches = self.context.registry.len(),
            output = %self.context.output_dir.display(),
            "Event loop started"
        );

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("Event loop cancelled");
                    return Shutdown::Cancelled;
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(raw)) => {
                    self.handle_event(raw).await;
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Event stream failed");
                    return Shutdown::ChannelFailed(e.to_string());
                }
                None => {
                    tracing::info!("Event stream closed");
                    return Shutdown::ChannelClosed;
                }
            }
        }
    }

    /// Resolve and mirror a single raw event.
    pub async fn handle_event(&self, raw: RawEvent<H>) -> EventOutcome {
        MirrorStats::incr(&self.stats.events_received);

        let Some(event) = FileEvent::from_raw(raw) else {
            MirrorStats::incr(&self.stats.events_ignored);
            return EventOutcome::Ignored;
        };

        let source = match resolve(&self.context.registry, &event) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, name = ?event.name, "Dropping unresolved event");
                MirrorStats::incr(&self.stats.unresolved);
                return EventOutcome::Unresolved;
            }
        };

        let output_dir = self.context.output_dir.clone();
        let options = self.context.options;
        let name = event.name;
        let from = source.clone();
        let result = tokio::task::spawn_blocking(move || {
            mirror_file(&from, &output_dir, &name, options)
        })
        .await
        .unwrap_or_else(|e| Err(CopyError::Task(e.to_string())));

        match result {
            Ok(outcome) => {
                tracing::info!(
                    source = %source.display(),
                    destination = %outcome.destination.display(),
                    bytes = outcome.bytes,
                    "Mirrored file"
                );
                MirrorStats::incr(&self.stats.files_copied);
                self.stats
                    .bytes_copied
                    .fetch_add(outcome.bytes, Ordering::Relaxed);
                EventOutcome::Copied(outcome)
            }
            Err(e) => {
                if e.is_collision() {
                    tracing::warn!(source = %source.display(), error = %e, "Mirror collision");
                    MirrorStats::incr(&self.stats.collisions);
                } else {
                    tracing::error!(source = %source.display(), error = %e, "Mirror copy failed");
                    MirrorStats::incr(&self.stats.copy_failures);
                }
                EventOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::EventKind;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        src: TempDir,
        out: TempDir,
        event_loop: EventLoop<u32>,
    }

    /// Source tree with handle 1 on the root and handle 2 on `a/`.
    fn fixture() -> Fixture {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir(src.path().join("a")).unwrap();

        let mut registry = PathRegistry::new();
        registry.register(1, src.path().to_path_buf()).unwrap();
        registry.register(2, src.path().join("a")).unwrap();

        let context =
            MirrorContext::new(registry, out.path().to_path_buf(), CopyOptions::default());
        Fixture {
            src,
            out,
            event_loop: EventLoop::new(context),
        }
    }

    fn close_write(handle: u32, name: &str) -> RawEvent<u32> {
        RawEvent {
            handle,
            name: Some(OsString::from(name)),
            kind: EventKind::CloseWrite,
        }
    }

    #[tokio::test]
    async fn test_mirrors_file_from_subdirectory() {
        let fx = fixture();
        fs::write(fx.src.path().join("a/x.txt"), b"0123456789").unwrap();

        let outcome = fx.event_loop.handle_event(close_write(2, "x.txt")).await;

        assert!(matches!(outcome, EventOutcome::Copied(ref c) if c.bytes == 10));
        assert_eq!(
            fs::read(fx.out.path().join("x.txt")).unwrap(),
            b"0123456789"
        );
        assert_eq!(fx.event_loop.stats().snapshot().files_copied, 1);
    }

    #[tokio::test]
    async fn test_same_name_collides() {
        let fx = fixture();
        fs::write(fx.src.path().join("a/x.txt"), b"first file").unwrap();
        fs::write(fx.src.path().join("x.txt"), b"second").unwrap();

        fx.event_loop.handle_event(close_write(2, "x.txt")).await;
        let outcome = fx.event_loop.handle_event(close_write(1, "x.txt")).await;

        assert!(matches!(outcome, EventOutcome::Failed(ref e) if e.is_collision()));
        assert_eq!(
            fs::read(fx.out.path().join("x.txt")).unwrap(),
            b"first file"
        );

        let snapshot = fx.event_loop.stats().snapshot();
        assert_eq!(snapshot.files_copied, 1);
        assert_eq!(snapshot.collisions, 1);
    }

    #[tokio::test]
    async fn test_unknown_handle_makes_no_copy() {
        let fx = fixture();
        fs::write(fx.src.path().join("x.txt"), b"data").unwrap();

        let outcome = fx.event_loop.handle_event(close_write(99, "x.txt")).await;

        assert!(matches!(outcome, EventOutcome::Unresolved));
        assert!(!fx.out.path().join("x.txt").exists());

        let snapshot = fx.event_loop.stats().snapshot();
        assert_eq!(snapshot.unresolved, 1);
        assert_eq!(snapshot.copy_attempts(), 0);
    }

    #[tokio::test]
    async fn test_irrelevant_event_ignored() {
        let fx = fixture();
        fs::write(fx.src.path().join("x.txt"), b"data").unwrap();

        let raw = RawEvent {
            handle: 1,
            name: Some(OsString::from("x.txt")),
            kind: EventKind::Other,
        };
        let outcome = fx.event_loop.handle_event(raw).await;

        assert!(matches!(outcome, EventOutcome::Ignored));
        assert!(!fx.out.path().join("x.txt").exists());
        assert_eq!(fx.event_loop.stats().snapshot().events_ignored, 1);
    }

    #[tokio::test]
    async fn test_vanished_source_reported() {
        let fx = fixture();

        let outcome = fx.event_loop.handle_event(close_write(1, "gone.txt")).await;

        assert!(matches!(
            outcome,
            EventOutcome::Failed(CopyError::SourceUnavailable { .. })
        ));
        assert_eq!(fx.event_loop.stats().snapshot().copy_failures, 1);
    }

    #[tokio::test]
    async fn test_run_continues_past_failures_until_closed() {
        let fx = fixture();
        fs::write(fx.src.path().join("a/ok.txt"), b"ok").unwrap();

        let events = futures::stream::iter(vec![
            Ok(close_write(1, "missing.txt")),
            Ok(close_write(77, "orphan.txt")),
            Ok(close_write(2, "ok.txt")),
        ]);

        let shutdown = fx.event_loop.run(events, CancellationToken::new()).await;

        assert_eq!(shutdown, Shutdown::ChannelClosed);
        assert_eq!(fs::read(fx.out.path().join("ok.txt")).unwrap(), b"ok");

        let snapshot = fx.event_loop.stats().snapshot();
        assert_eq!(snapshot.events_received, 3);
        assert_eq!(snapshot.files_copied, 1);
        assert_eq!(snapshot.unresolved, 1);
        assert_eq!(snapshot.copy_failures, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_stream_error() {
        let fx = fixture();
        fs::write(fx.src.path().join("late.txt"), b"late").unwrap();

        let events = futures::stream::iter(vec![
            Err(io::Error::other("descriptor closed")),
            Ok(close_write(1, "late.txt")),
        ]);

        let shutdown = fx.event_loop.run(events, CancellationToken::new()).await;

        assert_eq!(
            shutdown,
            Shutdown::ChannelFailed("descriptor closed".to_string())
        );
        assert!(!fx.out.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let fx = fixture();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let shutdown = fx
            .event_loop
            .run(futures::stream::pending::<io::Result<RawEvent<u32>>>(), cancel)
            .await;

        assert_eq!(shutdown, Shutdown::Cancelled);
        assert_eq!(fx.event_loop.stats().snapshot().events_received, 0);
    }
}
