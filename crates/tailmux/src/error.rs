use std::io;

use thiserror::Error;

/// Run-level failures. Per-stream read errors never surface here; they
/// are contained by the fan-in loop, which drops the offending stream
/// and keeps going.
#[derive(Debug, Error)]
pub enum TailmuxError {
    #[error("no machines specified; did you forget --machines?")]
    NoMachines,
    #[error("no path specified for '{host}' and no default file (--file) set")]
    MissingPath { host: String },
    #[error("remote command is empty")]
    EmptyRemoteCommand,
    #[error("failed to spawn remote stream for {host}:{path}: {source}")]
    Spawn {
        host: String,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("internal error: missing stdout pipe for {host}")]
    MissingStdout { host: String },
    #[error("line fan-in channel closed with streams still alive")]
    ChannelClosed,
    #[error("failed writing output: {0}")]
    OutputWrite(#[source] io::Error),
}
