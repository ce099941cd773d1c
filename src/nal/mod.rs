//! Annex-B NAL unit demuxing
//!
//! H.264 elementary streams in Annex-B framing carry no length prefixes;
//! NAL units are delimited by a fixed start code. The scanner here locates
//! those boundaries across arbitrarily chunked reads using a bounded
//! working buffer.

pub mod scanner;

pub use scanner::{AnnexBScanner, ScanOutput, START_CODE};
