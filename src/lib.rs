//! Demand-gated camera capture relay
//!
//! `camrelay` owns the lifecycle of an external capture subprocess (ffmpeg
//! reading a V4L2 device), incrementally splits its raw Annex-B H.264 output
//! into NAL-unit segments, and fans those segments out to a broadcast sink.
//! Capture starts and stops based on consumer demand: the camera runs only
//! while at least one consumer is connected.
//!
//! # Architecture
//!
//! ```text
//!   connection tracking (external)
//!            │ DemandEvent (+1 / -1 / reset)
//!            ▼
//!      ┌──────────┐  start/stop   ┌───────────────────┐
//!      │DemandGate│──────────────►│ CaptureSupervisor │
//!      └──────────┘  watch<bool>  │  restart loop     │
//!                                 │  ┌─────────────┐  │
//!                                 │  │FfmpegSource │  │ stdout bytes
//!                                 │  └─────────────┘  │
//!                                 │  ┌─────────────┐  │
//!                                 │  │AnnexBScanner│  │ NAL boundaries
//!                                 │  └─────────────┘  │
//!                                 └────────┬──────────┘
//!                                          │ Bytes (one per segment)
//!                                          ▼
//!                                   SegmentSink (fan-out)
//! ```
//!
//! # Zero-copy fan-out
//!
//! Segments are emitted as [`bytes::Bytes`]. A broadcast-channel sink clones
//! the handle per subscriber, but the segment payload is reference-counted,
//! not copied.
//!
//! # Example
//!
//! ```no_run
//! use camrelay::{CaptureConfig, DemandEvent, DemandGate, FfmpegFactory, BroadcastSink};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let config = CaptureConfig::default().width(640).height(480).fps(15);
//! let sink = Arc::new(BroadcastSink::new(64));
//! let mut rx = sink.subscribe();
//!
//! let factory = FfmpegFactory::new(config.clone());
//! let gate = DemandGate::new(config, factory, sink);
//! let (events, events_rx) = tokio::sync::mpsc::channel(16);
//!
//! tokio::spawn(gate.run(events_rx));
//! events.send(DemandEvent::Delta(1)).await.unwrap(); // first consumer: camera starts
//! while let Ok(segment) = rx.recv().await {
//!     println!("NAL segment: {} bytes", segment.len());
//! }
//! # }
//! ```

pub mod capture;
pub mod error;
pub mod gate;
pub mod nal;
pub mod sink;
pub mod stats;

pub use capture::config::CaptureConfig;
pub use capture::source::{CaptureSource, FfmpegFactory, FfmpegSource, SourceFactory};
pub use capture::supervisor::{CaptureSupervisor, SessionOutcome};
pub use error::{Error, Result};
pub use gate::{DemandEvent, DemandGate};
pub use nal::scanner::{AnnexBScanner, ScanOutput, START_CODE};
pub use sink::{BroadcastSink, SegmentSink, SinkError};
pub use stats::{CaptureStats, CaptureStatsSnapshot};
