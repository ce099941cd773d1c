//! Error types for capture sessions

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for one capture attempt
///
/// Every variant is fatal to the attempt that produced it, not to the
/// session: the supervisor's bounded restart policy decides whether another
/// attempt follows.
#[derive(Debug)]
pub enum Error {
    /// The capture executable could not be launched
    Spawn(std::io::Error),
    /// The child process exposed no stdout pipe
    MissingOutput,
    /// The capture process closed its output stream (EOF)
    SourceClosed,
    /// Reading from the capture process failed
    Read(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Spawn(e) => write!(f, "Failed to launch capture process: {}", e),
            Error::MissingOutput => write!(f, "Capture process has no stdout pipe"),
            Error::SourceClosed => write!(f, "Capture process closed its output stream"),
            Error::Read(e) => write!(f, "Failed to read from capture process: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn(e) | Error::Read(e) => Some(e),
            _ => None,
        }
    }
}
