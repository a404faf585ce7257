//! Mirroring resolved files into the output directory.

mod copier;
mod event_loop;
mod stats;

pub use copier::{mirror_file, CopyOptions, CopyOutcome, COPY_BUFFER_SIZE};
pub use event_loop::{EventLoop, EventOutcome, MirrorContext, Shutdown};
pub use stats::{MirrorStats, MirrorStatsSnapshot};
