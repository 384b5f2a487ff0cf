//! Subprocess lifecycle for one remote stream.

use std::process::Stdio;

use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use crate::config::RemoteCommand;
use crate::target::MachineTarget;
use crate::TailmuxError;

/// Liveness of a remote stream. Transitions `Alive -> Dead` exactly
/// once; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Alive,
    Dead,
}

/// One remote host's live feed: the subprocess streaming its file,
/// plus the handle needed to terminate it.
///
/// The child's stdout is a pipe owned exclusively by this handle until
/// [`RemoteStream::take_stdout`] moves it into a reader task. stdin is
/// discarded and stderr passes through to the operator, so remote-side
/// noise never lands in the line stream.
#[derive(Debug)]
pub struct RemoteStream {
    target: MachineTarget,
    state: StreamState,
    child: Child,
}

impl RemoteStream {
    /// Launches the subprocess that streams `target`'s file. Any spawn
    /// failure is reported to the caller, which treats it as fatal for
    /// the whole run: every listed host is expected to connect.
    pub fn start(target: MachineTarget, command: &RemoteCommand) -> Result<Self, TailmuxError> {
        let argv = command.argv(&target);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| TailmuxError::Spawn {
            host: target.host.clone(),
            path: target.path.clone(),
            source,
        })?;
        debug!(host = %target.host, path = %target.path, "started remote stream");

        Ok(Self {
            target,
            state: StreamState::Alive,
            child,
        })
    }

    pub fn target(&self) -> &MachineTarget {
        &self.target
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == StreamState::Alive
    }

    pub(crate) fn take_stdout(&mut self) -> Result<ChildStdout, TailmuxError> {
        self.child.stdout.take().ok_or(TailmuxError::MissingStdout {
            host: self.target.host.clone(),
        })
    }

    /// Forcibly terminates the subprocess and marks the stream dead.
    /// Idempotent; a child that already exited is left alone (the tokio
    /// runtime reaps it in the background).
    pub fn kill(&mut self) {
        if self.state == StreamState::Dead {
            return;
        }
        self.state = StreamState::Dead;
        if self.child.start_kill().is_ok() {
            debug!(host = %self.target.host, "killed remote stream");
        }
    }
}

/// Starts a stream per target, in configuration order. The first spawn
/// failure aborts the whole startup; already-started children are
/// killed on drop before any output has been written.
pub fn start_all(
    targets: Vec<MachineTarget>,
    command: &RemoteCommand,
) -> Result<Vec<RemoteStream>, TailmuxError> {
    targets
        .into_iter()
        .map(|target| RemoteStream::start(target, command))
        .collect()
}
