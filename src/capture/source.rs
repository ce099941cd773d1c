//! Capture subprocess lifecycle
//!
//! [`FfmpegSource`] wraps one run of the external capture tool: stdout is
//! the H.264 byte source, stderr is drained by an independent task so the
//! encoder can never block on a full pipe, and shutdown kills and reaps the
//! child on every path.
//!
//! The [`CaptureSource`]/[`SourceFactory`] traits are the seam the
//! supervisor is generic over, so tests inject fake processes instead of
//! spawning real ones.

use std::future::Future;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use crate::error::{Error, Result};

use super::command::{capture_args, CAPTURE_COMMAND};
use super::config::CaptureConfig;

/// One running capture subprocess (or a test stand-in)
pub trait CaptureSource: Send + 'static {
    /// The byte stream carrying the raw elementary stream
    type Output: AsyncRead + Unpin + Send + 'static;

    /// Take the output stream; yields once, `None` thereafter
    fn take_output(&mut self) -> Option<Self::Output>;

    /// Terminate the source and wait for it to exit
    ///
    /// Must be safe to call regardless of which code path triggered the
    /// stop; the underlying process is reaped before this returns.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}

/// Launches capture sources, one per restart attempt
pub trait SourceFactory: Send + Sync + 'static {
    type Source: CaptureSource;

    /// Launch a fresh source
    ///
    /// Failure here is fatal to the attempt, not to the session.
    fn spawn(&self) -> Result<Self::Source>;
}

/// A live ffmpeg capture process
pub struct FfmpegSource {
    child: Child,
    stdout: Option<ChildStdout>,
}

impl CaptureSource for FfmpegSource {
    type Output = ChildStdout;

    fn take_output(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.child.start_kill() {
            // Already exited; waiting below still reaps it.
            tracing::debug!(error = %e, "Kill signal not delivered");
        }
        match self.child.wait().await {
            Ok(status) => {
                tracing::info!(exit = ?status.code(), "Capture process exited");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed waiting for capture process");
            }
        }
    }
}

/// Spawns ffmpeg with the argument vector derived from a [`CaptureConfig`]
pub struct FfmpegFactory {
    config: CaptureConfig,
}

impl FfmpegFactory {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl SourceFactory for FfmpegFactory {
    type Source = FfmpegSource;

    fn spawn(&self) -> Result<FfmpegSource> {
        let args = capture_args(&self.config);

        let mut child = Command::new(CAPTURE_COMMAND)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::Spawn)?;

        let stdout = child.stdout.take().ok_or(Error::MissingOutput)?;

        // Drain stderr for the life of the child. The task ends on its own
        // when the pipe closes.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(target: "camrelay::capture::stderr", "{}", line);
                }
            });
        }

        tracing::info!(
            command = CAPTURE_COMMAND,
            args = %args.join(" "),
            pid = child.id(),
            "Started capture process"
        );

        Ok(FfmpegSource {
            child,
            stdout: Some(stdout),
        })
    }
}
