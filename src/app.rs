//! Application wiring.
//!
//! Runs the startup walk to completion, then hands the populated context to
//! the event loop. Any startup failure is returned before a single event is
//! processed.

use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::mirror::{EventLoop, MirrorContext, Shutdown};
use crate::watcher::{register_tree, InotifyBackend, PathRegistry, WatchBackend};
use crate::{Error, Result};

/// Walk the watch tree with `backend` and build the mirror context.
///
/// # Errors
///
/// Returns an error if any directory cannot be watched or the output
/// directory cannot be resolved.
pub fn prepare<B: WatchBackend>(
    config: &Config,
    backend: &mut B,
) -> Result<MirrorContext<B::Handle>> {
    let mut registry = PathRegistry::new();
    register_tree(&config.watch_dir, backend, &mut registry)?;

    let output_dir = config.output_dir.canonicalize().map_err(|e| {
        Error::config(format!(
            "output directory '{}': {e}",
            config.output_dir.display()
        ))
    })?;

    Ok(MirrorContext::new(
        registry,
        output_dir,
        config.copy_options(),
    ))
}

/// The mirroring service.
#[derive(Debug)]
pub struct App {
    config: Config,
}

impl App {
    /// Create a new application.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Watch and mirror until the event stream ends or `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error only for startup failures: inotify initialization or
    /// an incomplete tree walk. Failures while mirroring are logged and
    /// counted, never returned.
    pub async fn run(self, cancel: CancellationToken) -> Result<Shutdown> {
        let mut backend = InotifyBackend::init()?;
        let context = prepare(&self.config, &mut backend)?;
        let events = backend.into_events()?;

        let event_loop = EventLoop::new(context);
        let shutdown = event_loop.run(events, cancel).await;

        let stats = event_loop.stats().snapshot();
        tracing::info!(
            ?shutdown,
            received = stats.events_received,
            copied = stats.files_copied,
            bytes = stats.bytes_copied,
            collisions = stats.collisions,
            failures = stats.copy_failures,
            unresolved = stats.unresolved,
            "Mirror stopped"
        );

        Ok(shutdown)
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C).
///
/// If a handler cannot be installed, that signal source is logged and
/// ignored.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
