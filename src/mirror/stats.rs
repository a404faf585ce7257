//! Mirroring counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for the event loop.
#[derive(Debug, Default)]
pub struct MirrorStats {
    pub events_received: AtomicU64,
    pub events_ignored: AtomicU64,
    pub unresolved: AtomicU64,
    pub files_copied: AtomicU64,
    pub bytes_copied: AtomicU64,
    pub collisions: AtomicU64,
    pub copy_failures: AtomicU64,
}

impl MirrorStats {
    /// Create new stats tracker.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Get snapshot of current stats.
    #[must_use]
    pub fn snapshot(&self) -> MirrorStatsSnapshot {
        MirrorStatsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            files_copied: self.files_copied.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            collisions: self.collisions.load(Ordering::Relaxed),
            copy_failures: self.copy_failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of mirror stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStatsSnapshot {
    pub events_received: u64,
    pub events_ignored: u64,
    pub unresolved: u64,
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub collisions: u64,
    pub copy_failures: u64,
}

impl MirrorStatsSnapshot {
    /// Copy attempts made, successful or not.
    #[must_use]
    pub const fn copy_attempts(&self) -> u64 {
        self.files_copied + self.collisions + self.copy_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = MirrorStats::new();
        assert_eq!(stats.snapshot(), MirrorStatsSnapshot::default());
    }

    #[test]
    fn test_copy_attempts() {
        let stats = MirrorStats::new();
        MirrorStats::incr(&stats.files_copied);
        MirrorStats::incr(&stats.files_copied);
        MirrorStats::incr(&stats.collisions);
        MirrorStats::incr(&stats.copy_failures);
        MirrorStats::incr(&stats.unresolved);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.copy_attempts(), 4);
        assert_eq!(snapshot.unresolved, 1);
    }
}
