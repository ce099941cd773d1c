//! Capture statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared across capture sessions
///
/// Updated by the supervisor's read loop; cheap to read from anywhere via
/// [`CaptureStats::snapshot`].
#[derive(Debug, Default)]
pub struct CaptureStats {
    segments_emitted: AtomicU64,
    bytes_emitted: AtomicU64,
    buffer_overflows: AtomicU64,
    restart_attempts: AtomicU64,
    sink_errors: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStatsSnapshot {
    /// Segments handed to the sink
    pub segments_emitted: u64,
    /// Total payload bytes handed to the sink
    pub bytes_emitted: u64,
    /// Working-buffer resets due to overflow
    pub buffer_overflows: u64,
    /// Subprocess restarts after failure
    pub restart_attempts: u64,
    /// Segment deliveries that failed
    pub sink_errors: u64,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_segment(&self, len: usize) {
        self.segments_emitted.fetch_add(1, Ordering::Relaxed);
        self.bytes_emitted.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_overflow(&self) {
        self.buffer_overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_restart(&self) {
        self.restart_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> CaptureStatsSnapshot {
        CaptureStatsSnapshot {
            segments_emitted: self.segments_emitted.load(Ordering::Relaxed),
            bytes_emitted: self.bytes_emitted.load(Ordering::Relaxed),
            buffer_overflows: self.buffer_overflows.load(Ordering::Relaxed),
            restart_attempts: self.restart_attempts.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = CaptureStats::new();
        stats.record_segment(100);
        stats.record_segment(28);
        stats.record_overflow();
        stats.record_restart();
        stats.record_sink_error();

        let snap = stats.snapshot();
        assert_eq!(snap.segments_emitted, 2);
        assert_eq!(snap.bytes_emitted, 128);
        assert_eq!(snap.buffer_overflows, 1);
        assert_eq!(snap.restart_attempts, 1);
        assert_eq!(snap.sink_errors, 1);
    }
}
