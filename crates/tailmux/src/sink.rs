//! Serializes completed lines to the single output destination.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::RunOptions;
use crate::TailmuxError;

/// The fan-in's one output. Each record is assembled into a scratch
/// buffer and issued as a single write, so records never interleave
/// even if the sink is ever shared. A write failure is fatal to the
/// run; if the destination cannot accept output there is nothing
/// useful left to do.
#[derive(Debug)]
pub struct OutputSink<W> {
    writer: W,
    prefix_with_host: bool,
    buffered_io: bool,
    scratch: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> OutputSink<W> {
    pub fn new(writer: W, options: &RunOptions) -> Self {
        Self {
            writer,
            prefix_with_host: options.prefix_with_host,
            buffered_io: options.buffered_io,
            scratch: Vec::new(),
        }
    }

    /// Writes one record: `host: line\n` when prefixing is enabled,
    /// `line\n` otherwise. Flushes per record unless buffered IO was
    /// requested.
    pub async fn write_line(&mut self, host: &str, line: &[u8]) -> Result<(), TailmuxError> {
        self.scratch.clear();
        if self.prefix_with_host {
            self.scratch.extend_from_slice(host.as_bytes());
            self.scratch.extend_from_slice(b": ");
        }
        self.scratch.extend_from_slice(line);
        self.scratch.push(b'\n');

        self.writer
            .write_all(&self.scratch)
            .await
            .map_err(TailmuxError::OutputWrite)?;
        if !self.buffered_io {
            self.writer
                .flush()
                .await
                .map_err(TailmuxError::OutputWrite)?;
        }
        Ok(())
    }

    /// Final flush once no streams remain.
    pub async fn finish(&mut self) -> Result<(), TailmuxError> {
        self.writer.flush().await.map_err(TailmuxError::OutputWrite)
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
