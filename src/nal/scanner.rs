//! Incremental Annex-B start-code scanner
//!
//! Maintains a fixed-capacity working buffer and a write cursor. Each call
//! to [`AnnexBScanner::push`] appends a read chunk, then emits one segment
//! per start-code boundary found: the bytes preceding the boundary, shifted
//! out so the buffer always begins at a NAL boundary candidate.
//!
//! The buffer never grows. If it fills up without a boundary in sight, its
//! contents are dropped and scanning resumes fresh — a lossy but
//! bounded-memory policy. The truncated frame is not recovered.

use bytes::Bytes;

/// The 4-byte Annex-B NAL separator
pub const START_CODE: [u8; 4] = [0, 0, 0, 1];

/// Result of feeding one chunk to the scanner
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Completed segments, in boundary-detection order.
    ///
    /// After the first boundary has been seen, each segment begins with its
    /// leading start code; the prefix before the first-ever boundary is
    /// emitted without one.
    pub segments: Vec<Bytes>,

    /// The buffer filled up without a boundary and was reset to empty
    pub overflowed: bool,
}

/// Incremental start-code scanner over a bounded working buffer
#[derive(Debug)]
pub struct AnnexBScanner {
    buf: Box<[u8]>,
    pos: usize,
}

impl AnnexBScanner {
    /// Create a scanner with the given working-buffer capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not larger than the start code itself.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > START_CODE.len(),
            "buffer capacity must exceed the start code length"
        );
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
        }
    }

    /// Working-buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unprocessed bytes currently held
    pub fn buffered(&self) -> usize {
        self.pos
    }

    /// Append a read chunk and scan for start-code boundaries
    ///
    /// Chunks may be any size, including larger than the remaining buffer
    /// space; oversized chunks are consumed in capacity-sized pieces. A
    /// start code split across two pushes is still found, because the search
    /// window re-covers the last `START_CODE.len() - 1` processed bytes.
    pub fn push(&mut self, chunk: &[u8]) -> ScanOutput {
        let mut out = ScanOutput::default();
        let mut rest = chunk;

        while !rest.is_empty() {
            let fit = (self.buf.len() - self.pos).min(rest.len());
            let search_from = self.pos.saturating_sub(START_CODE.len() - 1);

            self.buf[self.pos..self.pos + fit].copy_from_slice(&rest[..fit]);
            self.pos += fit;
            rest = &rest[fit..];

            self.scan(search_from, &mut out.segments);

            // No boundary and the buffer is full: drop the unterminated
            // data and start over (bounded-memory policy).
            if self.pos == self.buf.len() {
                self.pos = 0;
                out.overflowed = true;
            }
        }

        out
    }

    /// Emit every boundary currently in the buffer, shifting after each one
    fn scan(&mut self, mut from: usize, segments: &mut Vec<Bytes>) {
        loop {
            let Some(rel) = find_start_code(&self.buf[from..self.pos]) else {
                return;
            };
            let idx = from + rel;

            // Marker at the buffer origin: no payload accumulated yet,
            // a zero-length segment carries no information.
            if idx == 0 {
                from = 1;
                continue;
            }

            segments.push(Bytes::copy_from_slice(&self.buf[..idx]));

            // Reframe so the buffer begins at the boundary just found.
            self.buf.copy_within(idx..self.pos, 0);
            self.pos -= idx;
            from = 1;
        }
    }
}

fn find_start_code(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(START_CODE.len())
        .position(|window| window == START_CODE)
}
