//! Segment delivery capability
//!
//! The supervisor hands every completed NAL segment to a [`SegmentSink`],
//! one call per segment, in detection order. Fan-out to individual
//! consumers is the sink implementation's concern; a delivery failure is an
//! isolated fault and never aborts the capture loop.

use bytes::Bytes;
use tokio::sync::broadcast;

/// Error delivering a segment to consumers
#[derive(Debug, Clone)]
pub enum SinkError {
    /// No consumer is currently listening
    NoSubscribers,
    /// Transport-specific delivery failure
    Delivery(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::NoSubscribers => write!(f, "No subscribers listening"),
            SinkError::Delivery(msg) => write!(f, "Segment delivery failed: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}

/// Receives completed NAL segments, in order
pub trait SegmentSink: Send + Sync + 'static {
    /// Deliver one segment
    fn send(&self, segment: Bytes) -> Result<(), SinkError>;
}

/// Broadcast-channel fan-out sink
///
/// Each subscriber gets its own receiver; the segment payload is
/// reference-counted via `Bytes`, so fan-out never copies it. Slow
/// subscribers that fall more than `capacity` segments behind observe a
/// lag error on their receiver rather than stalling the stream.
pub struct BroadcastSink {
    tx: broadcast::Sender<Bytes>,
}

impl BroadcastSink {
    /// Create a sink whose subscribers buffer up to `capacity` segments
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new consumer
    pub fn subscribe(&self) -> broadcast::Receiver<Bytes> {
        self.tx.subscribe()
    }

    /// Number of live consumers
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl SegmentSink for BroadcastSink {
    fn send(&self, segment: Bytes) -> Result<(), SinkError> {
        self.tx
            .send(segment)
            .map(|_| ())
            .map_err(|_| SinkError::NoSubscribers)
    }
}
