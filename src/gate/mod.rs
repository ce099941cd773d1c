//! Demand-gated session control
//!
//! The gate consumes consumer-count events in arrival order and keeps at
//! most one capture session alive: the camera starts when the count leaves
//! zero and stops when it returns to zero. Events that do not cross the
//! zero boundary change nothing, so individual connects and disconnects
//! never bounce the capture process while other consumers remain.
//!
//! The capture device is an exclusive resource. A session mutex held for
//! the duration of each supervisor run guarantees that rapid stop/start
//! toggling never leaves two read loops alive at once.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::capture::config::CaptureConfig;
use crate::capture::source::SourceFactory;
use crate::capture::supervisor::{CaptureSupervisor, SessionOutcome};
use crate::sink::SegmentSink;

/// Consumer-count change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandEvent {
    /// Signed change: +1 per opened consumer connection, -1 per closed one
    Delta(i32),
    /// Absolute reset of the consumer count
    Reset(u32),
}

/// One live capture session owned by the gate
struct Session {
    stop: watch::Sender<bool>,
    task: JoinHandle<SessionOutcome>,
}

/// Starts and stops capture sessions as demand crosses zero
pub struct DemandGate<F, S> {
    supervisor: Arc<CaptureSupervisor<F, S>>,
    session_lock: Arc<Mutex<()>>,
}

impl<F: SourceFactory, S: SegmentSink> DemandGate<F, S> {
    /// Create a gate owning a fresh supervisor
    pub fn new(config: CaptureConfig, factory: F, sink: Arc<S>) -> Self {
        Self::with_supervisor(Arc::new(CaptureSupervisor::new(config, factory, sink)))
    }

    /// Create a gate around an existing supervisor
    pub fn with_supervisor(supervisor: Arc<CaptureSupervisor<F, S>>) -> Self {
        Self {
            supervisor,
            session_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The supervisor driving each session
    pub fn supervisor(&self) -> &Arc<CaptureSupervisor<F, S>> {
        &self.supervisor
    }

    /// Process demand events until the channel closes
    ///
    /// Events are handled strictly in arrival order, one at a time. When
    /// the channel closes, any live session is stopped before returning.
    pub async fn run(self, mut events: mpsc::Receiver<DemandEvent>) {
        let mut active: u32 = 0;
        let mut session: Option<Session> = None;

        while let Some(event) = events.recv().await {
            let was_zero = active == 0;
            active = apply_event(active, event);
            tracing::info!(active, "Consumer count changed");

            if active > 0 && was_zero {
                if session.is_none() {
                    session = Some(self.start_session());
                }
            } else if active == 0 && !was_zero {
                if let Some(live) = session.take() {
                    stop_session(live).await;
                }
            }
        }

        // Event source gone: nobody can signal demand anymore.
        if let Some(live) = session.take() {
            stop_session(live).await;
        }
    }

    fn start_session(&self) -> Session {
        let (stop_tx, stop_rx) = watch::channel(false);
        let supervisor = Arc::clone(&self.supervisor);
        let lock = Arc::clone(&self.session_lock);

        let task = tokio::spawn(async move {
            // Wait out a previous session that is still winding down.
            let _guard = lock.lock().await;
            supervisor.run(stop_rx).await
        });

        tracing::info!("Capture session started");
        Session {
            stop: stop_tx,
            task,
        }
    }
}

/// Apply one event to the count, clamping at zero
fn apply_event(active: u32, event: DemandEvent) -> u32 {
    match event {
        DemandEvent::Delta(delta) => {
            let next = i64::from(active) + i64::from(delta);
            if next < 0 {
                tracing::warn!(active, delta, "Consumer count would go negative, clamping");
                0
            } else {
                next as u32
            }
        }
        DemandEvent::Reset(count) => count,
    }
}

/// Signal stop and wait for the session to wind down
async fn stop_session(session: Session) {
    let _ = session.stop.send(true);
    match session.task.await {
        Ok(outcome) => {
            tracing::info!(outcome = ?outcome, "Capture session ended");
        }
        Err(e) => {
            tracing::error!(error = %e, "Capture session task failed");
        }
    }
}
