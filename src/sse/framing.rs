//! Blank-line frame assembly for Server-Sent Events.
//!
//! Bytes arrive from the network in chunks that may split a frame anywhere,
//! including in the middle of a line terminator or a multi-byte UTF-8
//! character. `FrameAssembler` buffers them and hands back complete frames.
//!
//! # Wire Format
//!
//! ```text
//! event: progress\n
//! data: {"done":1,"total":4}\n
//! \n
//! ```
//!
//! Frames end at the first blank line, written either as `\n\n` or
//! `\r\n\r\n`. Both markers are plain ASCII, so the search runs over raw
//! bytes and decoding happens once per complete frame.

use crate::job::JobError;

/// Maximum size of a single buffered frame (16MB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

const LF_BOUNDARY: &[u8] = b"\n\n";
const CRLF_BOUNDARY: &[u8] = b"\r\n\r\n";

/// Incremental splitter from byte chunks to complete frames.
///
/// Framing does not depend on where chunk boundaries fall: feeding the same
/// bytes in any partition yields the same frames in the same order.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    /// Offset below which the buffer is known to hold no boundary.
    scanned: usize,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completed, in order.
    ///
    /// # Errors
    ///
    /// Returns `JobError::MalformedFrame` if the pending partial frame grows
    /// beyond `MAX_FRAME_SIZE` without a boundary.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, JobError> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0;
        let mut search_from = self.scanned;

        while let Some((offset, len)) = find_boundary(&self.buffer[search_from..]) {
            let start = search_from + offset;
            let frame = &self.buffer[consumed..start];
            frames.push(String::from_utf8_lossy(frame).into_owned());
            consumed = start + len;
            search_from = consumed;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }
        // A boundary may still complete across the last few buffered bytes.
        self.scanned = self.buffer.len().saturating_sub(CRLF_BOUNDARY.len() - 1);

        if self.buffer.len() > MAX_FRAME_SIZE {
            return Err(JobError::MalformedFrame(format!(
                "Pending frame of {} bytes exceeds maximum {} bytes",
                self.buffer.len(),
                MAX_FRAME_SIZE
            )));
        }

        Ok(frames)
    }

    /// Bytes held back waiting for a boundary.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the assembler at end of stream.
    ///
    /// Returns the unterminated tail, if it holds anything besides whitespace.
    /// An unterminated frame is never dispatched.
    pub fn finish(self) -> Option<String> {
        let tail = String::from_utf8_lossy(&self.buffer);
        if tail.trim().is_empty() {
            None
        } else {
            Some(tail.into_owned())
        }
    }
}

/// Locate the earliest blank-line boundary as `(offset, length)`.
///
/// Every boundary contains a newline pair, so a single pass over newline
/// positions finds both forms in linear time. A CRLF boundary is seen at its
/// first `\n`, before any LF boundary that could start after it.
fn find_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    for i in memchr::memchr_iter(b'\n', buf) {
        let rest = &buf[i + 1..];
        if i > 0 && buf[i - 1] == b'\r' && rest.starts_with(b"\r\n") {
            return Some((i - 1, CRLF_BOUNDARY.len()));
        }
        if rest.first() == Some(&b'\n') {
            return Some((i, LF_BOUNDARY.len()));
        }
    }
    None
}
