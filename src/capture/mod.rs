//! Capture subprocess supervision
//!
//! This module provides:
//! - Session configuration ([`config::CaptureConfig`])
//! - Capture command-line construction ([`command`])
//! - Subprocess lifecycle and the test seam around it ([`source`])
//! - The supervised read loop with bounded restarts ([`supervisor`])

pub mod command;
pub mod config;
pub mod source;
pub mod supervisor;

pub use command::{capture_args, CAPTURE_COMMAND};
pub use config::CaptureConfig;
pub use source::{CaptureSource, FfmpegFactory, FfmpegSource, SourceFactory};
pub use supervisor::{CaptureSupervisor, SessionOutcome};

#[cfg(test)]
pub(crate) mod fakes {
    //! Scripted stand-ins for the capture subprocess and the sink

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use tokio::io::{duplex, DuplexStream};

    use crate::error::{Error, Result};
    use crate::sink::{SegmentSink, SinkError};

    use super::source::{CaptureSource, SourceFactory};

    /// What the next `spawn()` call should produce
    pub(crate) enum SpawnScript {
        /// The launch itself fails
        Fail,
        /// A source whose output stream is already at EOF
        ClosedSource,
        /// A source fed from a writer the test holds
        Open(DuplexStream),
    }

    pub(crate) struct FakeSource {
        output: Option<DuplexStream>,
        shutdowns: Arc<AtomicU32>,
    }

    impl CaptureSource for FakeSource {
        type Output = DuplexStream;

        fn take_output(&mut self) -> Option<DuplexStream> {
            self.output.take()
        }

        async fn shutdown(&mut self) {
            self.output = None;
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Factory that plays back a script of spawn outcomes
    pub(crate) struct FakeFactory {
        scripts: Mutex<VecDeque<SpawnScript>>,
        spawns: Arc<AtomicU32>,
        shutdowns: Arc<AtomicU32>,
    }

    impl FakeFactory {
        pub(crate) fn new(scripts: Vec<SpawnScript>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                spawns: Arc::new(AtomicU32::new(0)),
                shutdowns: Arc::new(AtomicU32::new(0)),
            }
        }

        /// Factory scripted with `n` open sources; returns their writers
        pub(crate) fn with_open_sources(n: usize) -> (Self, Vec<DuplexStream>) {
            let mut scripts = Vec::new();
            let mut writers = Vec::new();
            for _ in 0..n {
                let (writer, reader) = duplex(4096);
                scripts.push(SpawnScript::Open(reader));
                writers.push(writer);
            }
            (Self::new(scripts), writers)
        }

        pub(crate) fn prepend(self, script: SpawnScript) -> Self {
            self.scripts.lock().unwrap().push_front(script);
            self
        }

        pub(crate) fn spawn_count(&self) -> Arc<AtomicU32> {
            Arc::clone(&self.spawns)
        }

        pub(crate) fn shutdown_count(&self) -> Arc<AtomicU32> {
            Arc::clone(&self.shutdowns)
        }
    }

    impl SourceFactory for FakeFactory {
        type Source = FakeSource;

        fn spawn(&self) -> Result<FakeSource> {
            self.spawns.fetch_add(1, Ordering::SeqCst);

            let script = self.scripts.lock().unwrap().pop_front();
            let output = match script {
                Some(SpawnScript::Open(reader)) => reader,
                Some(SpawnScript::ClosedSource) => {
                    let (writer, reader) = duplex(64);
                    drop(writer); // immediate EOF
                    reader
                }
                Some(SpawnScript::Fail) | None => {
                    return Err(Error::Spawn(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "scripted launch failure",
                    )));
                }
            };

            Ok(FakeSource {
                output: Some(output),
                shutdowns: Arc::clone(&self.shutdowns),
            })
        }
    }

    /// Sink that records every delivered segment
    pub(crate) struct CollectorSink {
        segments: Mutex<Vec<Bytes>>,
    }

    impl CollectorSink {
        pub(crate) fn new() -> Self {
            Self {
                segments: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn segments(&self) -> Vec<Bytes> {
            self.segments.lock().unwrap().clone()
        }
    }

    impl SegmentSink for CollectorSink {
        fn send(&self, segment: Bytes) -> std::result::Result<(), SinkError> {
            self.segments.lock().unwrap().push(segment);
            Ok(())
        }
    }

    /// Sink whose every delivery fails
    pub(crate) struct FailingSink;

    impl SegmentSink for FailingSink {
        fn send(&self, _segment: Bytes) -> std::result::Result<(), SinkError> {
            Err(SinkError::Delivery("scripted delivery failure".to_string()))
        }
    }
}
