//! Capture relay demo
//!
//! Run with: cargo run --example capture_relay [DEVICE]
//!
//! Requires `ffmpeg` on PATH and a V4L2 capture device (default
//! /dev/video0). Simulates one consumer connecting, prints relayed NAL
//! segment counts, and stops capture on Ctrl+C.

use std::sync::Arc;

use camrelay::{BroadcastSink, CaptureConfig, DemandEvent, DemandGate, FfmpegFactory};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("camrelay=debug".parse()?),
        )
        .init();

    let device = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/video0".to_string());
    let config = CaptureConfig::default().device(device);

    let sink = Arc::new(BroadcastSink::new(64));
    let mut segments = sink.subscribe();

    let factory = FfmpegFactory::new(config.clone());
    let gate = DemandGate::new(config, factory, Arc::clone(&sink));
    let supervisor = Arc::clone(gate.supervisor());

    let (events, events_rx) = tokio::sync::mpsc::channel(16);
    let gate_task = tokio::spawn(gate.run(events_rx));

    // One consumer connects; the camera starts.
    events.send(DemandEvent::Delta(1)).await?;

    let printer = tokio::spawn(async move {
        let mut count: u64 = 0;
        loop {
            match segments.recv().await {
                Ok(segment) => {
                    count += 1;
                    if count % 50 == 0 {
                        println!("{} segments relayed, latest {} bytes", count, segment.len());
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    println!("consumer lagged, skipped {} segments", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    println!("\nShutting down...");

    // Last consumer gone; capture stops and the gate exits.
    events.send(DemandEvent::Delta(-1)).await?;
    drop(events);
    gate_task.await?;
    printer.abort();

    let stats = supervisor.stats().snapshot();
    println!(
        "Session stats: {} segments, {} bytes, {} overflows, {} restarts",
        stats.segments_emitted, stats.bytes_emitted, stats.buffer_overflows, stats.restart_attempts
    );

    Ok(())
}
