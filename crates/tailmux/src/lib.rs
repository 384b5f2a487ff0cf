#![forbid(unsafe_code)]
//! Multiplexed remote `tail -f`: aggregates live log output from many
//! hosts into one ordered, interleaved stream.
//!
//! For each configured machine the engine starts a remote streaming
//! command (by default `ssh host tail -f path`), reassembles its
//! output into bounded lines, and fans everything into a single sink.
//! A host that dies is dropped without disturbing the others; the run
//! ends when no stream remains alive.

mod config;
mod error;
mod reader;
mod run;
mod sink;
mod stream;
mod target;

pub use config::{RemoteCommand, RunOptions, DEFAULT_MAX_LINE_BYTES};
pub use error::TailmuxError;
pub use reader::{BoundedLineReader, LineEvent};
pub use run::{run_fan_in, RunSummary};
pub use sink::OutputSink;
pub use stream::{start_all, RemoteStream, StreamState};
pub use target::{resolve_targets, MachineTarget};
