//! The fan-in run loop.
//!
//! One reader task per remote stream forwards completed lines over a
//! single bounded channel to this loop, which owns the registry and
//! the sink. Per-host line order is FIFO because each task sends in
//! read order; cross-host order is whatever the scheduler delivers.
//! A stream that ends or fails is killed and dropped without touching
//! the others; the loop exits once no stream remains alive.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::RunOptions;
use crate::reader::{BoundedLineReader, LineEvent};
use crate::sink::OutputSink;
use crate::stream::RemoteStream;
use crate::TailmuxError;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
enum StreamEvent {
    Line { index: usize, bytes: Vec<u8> },
    Ended { index: usize },
    ReadFailed { index: usize, error: io::Error },
}

/// What a completed run observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_written: u64,
    pub streams_failed: usize,
}

/// Drives every started stream to completion, writing each finished
/// line to `sink` as it arrives.
///
/// Per-stream failures are contained here: the stream is killed,
/// a warning names the host and path, and the run continues. Only a
/// sink write failure escapes as an error.
pub async fn run_fan_in<W>(
    mut streams: Vec<RemoteStream>,
    options: &RunOptions,
    sink: &mut OutputSink<W>,
) -> Result<RunSummary, TailmuxError>
where
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut alive = 0usize;
    for (index, stream) in streams.iter_mut().enumerate() {
        let stdout = stream.take_stdout()?;
        tokio::spawn(forward_lines(
            index,
            stdout,
            options.max_line_bytes,
            tx.clone(),
        ));
        alive += 1;
    }
    drop(tx);

    let mut summary = RunSummary::default();
    while alive > 0 {
        let Some(event) = rx.recv().await else {
            // Every sender is gone but the registry still has live
            // entries; a reader task must have died without reporting.
            return Err(TailmuxError::ChannelClosed);
        };
        match event {
            StreamEvent::Line { index, bytes } => {
                sink.write_line(&streams[index].target().host, &bytes)
                    .await?;
                summary.lines_written += 1;
            }
            StreamEvent::Ended { index } => {
                let stream = &mut streams[index];
                debug!(
                    host = %stream.target().host,
                    path = %stream.target().path,
                    "remote stream ended",
                );
                stream.kill();
                alive -= 1;
            }
            StreamEvent::ReadFailed { index, error } => {
                let stream = &mut streams[index];
                warn!(
                    host = %stream.target().host,
                    path = %stream.target().path,
                    %error,
                    "read failed; dropping stream",
                );
                stream.kill();
                alive -= 1;
                summary.streams_failed += 1;
            }
        }
    }

    sink.finish().await?;
    Ok(summary)
}

/// Reader task body: reassembles lines from one stream and forwards
/// them in order. Sends exactly one terminal event (`Ended` or
/// `ReadFailed`) and exits. A closed channel means the run loop is
/// gone, so the task just stops.
async fn forward_lines<R>(
    index: usize,
    reader: R,
    max_line_bytes: usize,
    tx: mpsc::Sender<StreamEvent>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BoundedLineReader::new(reader, max_line_bytes);
    loop {
        match lines.next_line().await {
            Ok(LineEvent::Line { bytes, truncated }) => {
                if truncated {
                    debug!(stream = index, max_line_bytes, "line split at cap");
                }
                if tx.send(StreamEvent::Line { index, bytes }).await.is_err() {
                    return;
                }
            }
            Ok(LineEvent::Eof) => {
                let _ = tx.send(StreamEvent::Ended { index }).await;
                return;
            }
            Err(error) => {
                let _ = tx.send(StreamEvent::ReadFailed { index, error }).await;
                return;
            }
        }
    }
}
