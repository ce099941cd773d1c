//! Capture session supervision
//!
//! One supervisor run is one capture session: it owns the subprocess
//! lifecycle, feeds every read chunk through the NAL scanner, and hands
//! completed segments to the sink. Subprocess failures are retried with a
//! bounded budget (no backoff); a stop signal ends the session cleanly.
//!
//! Per session the state machine is `Idle → Running → (Stopping | Failed)
//! → Idle`. Failures restart with a fresh source and fresh scanner state,
//! so segments are never buffered across a restart.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::nal::scanner::{AnnexBScanner, ScanOutput};
use crate::sink::SegmentSink;
use crate::stats::CaptureStats;

use super::config::CaptureConfig;
use super::source::{CaptureSource, SourceFactory};

/// How a capture session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Stop was requested and honored
    Stopped,
    /// The restart budget was exhausted without an intervening clean run
    Abandoned {
        /// Failed attempts consumed
        attempts: u32,
    },
}

/// Bounded restart counter attached to one session
///
/// Incremented on subprocess failure, reset on a clean run; the session is
/// abandoned once the bound is reached.
#[derive(Debug)]
pub(crate) struct RestartPolicy {
    attempts: u32,
    max: u32,
}

impl RestartPolicy {
    pub(crate) fn new(max: u32) -> Self {
        Self { attempts: 0, max }
    }

    /// Record a failed attempt; returns whether another attempt is allowed
    pub(crate) fn record_failure(&mut self) -> bool {
        self.attempts += 1;
        self.attempts < self.max
    }

    /// A clean run resets the counter
    pub(crate) fn record_success(&mut self) {
        self.attempts = 0;
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Supervises one capture session at a time
///
/// Generic over the source factory (so tests inject fake processes) and the
/// segment sink (fan-out is the sink's concern). The supervisor itself
/// holds no session state between runs; each [`run`](Self::run) is an
/// independent session with a fresh restart budget.
pub struct CaptureSupervisor<F, S> {
    config: CaptureConfig,
    factory: F,
    sink: Arc<S>,
    stats: Arc<CaptureStats>,
}

impl<F: SourceFactory, S: SegmentSink> CaptureSupervisor<F, S> {
    /// Create a supervisor with its own stats counters
    pub fn new(config: CaptureConfig, factory: F, sink: Arc<S>) -> Self {
        Self::with_stats(config, factory, sink, Arc::new(CaptureStats::new()))
    }

    /// Create a supervisor sharing externally owned stats counters
    pub fn with_stats(
        config: CaptureConfig,
        factory: F,
        sink: Arc<S>,
        stats: Arc<CaptureStats>,
    ) -> Self {
        Self {
            config,
            factory,
            sink,
            stats,
        }
    }

    /// Stats counters updated by the read loop
    pub fn stats(&self) -> &Arc<CaptureStats> {
        &self.stats
    }

    /// Run one capture session until stopped or abandoned
    ///
    /// Blocks until the stop signal turns true (clean end) or the restart
    /// budget is exhausted. The subprocess is terminated and reaped before
    /// this returns, on every path.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) -> SessionOutcome {
        let mut policy = RestartPolicy::new(self.config.max_restart_attempts);

        loop {
            if *stop.borrow() {
                return SessionOutcome::Stopped;
            }

            match self.run_attempt(&mut stop).await {
                Ok(()) => {
                    policy.record_success();
                    return SessionOutcome::Stopped;
                }
                Err(e) => {
                    self.stats.record_restart();
                    let retry = policy.record_failure();
                    tracing::warn!(
                        error = %e,
                        attempt = policy.attempts(),
                        max = self.config.max_restart_attempts,
                        "Capture attempt failed"
                    );

                    if !retry {
                        tracing::error!(
                            attempts = policy.attempts(),
                            "Restart budget exhausted, abandoning session"
                        );
                        return SessionOutcome::Abandoned {
                            attempts: policy.attempts(),
                        };
                    }

                    if !self.config.restart_delay.is_zero() {
                        tokio::select! {
                            _ = tokio::time::sleep(self.config.restart_delay) => {}
                            _ = stop.changed() => {}
                        }
                    }
                }
            }
        }
    }

    /// One subprocess lifetime: spawn, read until stop or failure, reap
    async fn run_attempt(&self, stop: &mut watch::Receiver<bool>) -> Result<()> {
        let mut source = self.factory.spawn()?;
        let result = self.read_loop(&mut source, stop).await;
        // Reap regardless of why the loop ended.
        source.shutdown().await;
        result
    }

    async fn read_loop(
        &self,
        source: &mut F::Source,
        stop: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        let mut output = source.take_output().ok_or(Error::MissingOutput)?;
        let mut scanner = AnnexBScanner::new(self.config.buffer_capacity);
        let mut chunk = vec![0u8; self.config.read_chunk_size];

        loop {
            if *stop.borrow() {
                tracing::info!("Stop requested");
                return Ok(());
            }

            tokio::select! {
                biased;
                changed = stop.changed() => {
                    // A dropped sender means the gate is gone: treat as stop.
                    if changed.is_err() {
                        return Ok(());
                    }
                }
                read = output.read(&mut chunk) => {
                    let n = read.map_err(Error::Read)?;
                    if n == 0 {
                        return Err(Error::SourceClosed);
                    }
                    self.dispatch(scanner.push(&chunk[..n]));
                }
            }
        }
    }

    /// Emit scan results; a sink failure never aborts the read loop
    fn dispatch(&self, out: ScanOutput) {
        if out.overflowed {
            self.stats.record_overflow();
            tracing::warn!(
                capacity = self.config.buffer_capacity,
                "Working buffer full without a NAL boundary, dropping contents"
            );
        }

        for segment in out.segments {
            self.stats.record_segment(segment.len());
            if let Err(e) = self.sink.send(segment) {
                self.stats.record_sink_error();
                tracing::debug!(error = %e, "Segment delivery failed");
            }
        }
    }
}
