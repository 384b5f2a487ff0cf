//! Incremental line reassembly over an arbitrary byte stream.
//!
//! [`BoundedLineReader`] turns arbitrarily chunked reads into discrete
//! lines while holding at most `max_line_bytes` of unterminated data
//! per stream. A run longer than the cap is split at the boundary: the
//! first `max_line_bytes` bytes come out as a complete line and the
//! remainder continues as the next one. Memory per stream stays
//! bounded no matter what the remote side emits.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE_BYTES: usize = 8192;

/// Outcome of one [`BoundedLineReader::next_line`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum LineEvent {
    /// One complete line, terminator excluded.
    Line {
        bytes: Vec<u8>,
        /// Set when the line was split at `max_line_bytes` instead of
        /// ending at a newline.
        truncated: bool,
    },
    /// Clean end of the underlying stream.
    Eof,
}

pub struct BoundedLineReader<R> {
    reader: R,
    max_line_bytes: usize,
    buffer: Vec<u8>,
    buffer_pos: usize,
    buffer_len: usize,
    current_line: Vec<u8>,
    done: bool,
}

impl<R: AsyncRead + Unpin> BoundedLineReader<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes: max_line_bytes.max(1),
            buffer: vec![0u8; CHUNK_SIZE_BYTES],
            buffer_pos: 0,
            buffer_len: 0,
            current_line: Vec::new(),
            done: false,
        }
    }

    /// Reads until one line is complete, the stream ends, or the read
    /// fails. Waits only when no buffered bytes remain.
    pub async fn next_line(&mut self) -> io::Result<LineEvent> {
        if self.done {
            return Ok(LineEvent::Eof);
        }

        loop {
            if self.buffer_pos >= self.buffer_len {
                let n = self.reader.read(&mut self.buffer).await?;
                if n == 0 {
                    self.done = true;
                    if self.current_line.is_empty() {
                        return Ok(LineEvent::Eof);
                    }
                    // Unterminated tail; emit it as the final line.
                    return Ok(LineEvent::Line {
                        bytes: std::mem::take(&mut self.current_line),
                        truncated: false,
                    });
                }
                self.buffer_pos = 0;
                self.buffer_len = n;
            }

            // Invariant: current_line is strictly under the cap here, so
            // budget is at least 1. Searching one byte past the budget
            // lets an exactly-cap-sized line still claim its newline.
            let budget = self.max_line_bytes - self.current_line.len();
            let avail = &self.buffer[self.buffer_pos..self.buffer_len];
            let search_len = avail.len().min(budget + 1);

            match avail[..search_len].iter().position(|b| *b == b'\n') {
                Some(idx) => {
                    self.current_line.extend_from_slice(&avail[..idx]);
                    self.buffer_pos += idx + 1;
                    return Ok(LineEvent::Line {
                        bytes: std::mem::take(&mut self.current_line),
                        truncated: false,
                    });
                }
                None => {
                    let take = avail.len().min(budget);
                    self.current_line
                        .extend_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + take]);
                    self.buffer_pos += take;
                    if self.current_line.len() >= self.max_line_bytes {
                        return Ok(LineEvent::Line {
                            bytes: std::mem::take(&mut self.current_line),
                            truncated: true,
                        });
                    }
                }
            }
        }
    }
}
