//! Run options and the remote command template.

use crate::target::MachineTarget;
use crate::TailmuxError;

/// Largest line payload emitted in one piece. Longer runs without a
/// newline are split at this boundary.
pub const DEFAULT_MAX_LINE_BYTES: usize = 8000;

const DEFAULT_SSH_COMMAND: &[&str] = &["ssh", "-q", "-o", "BatchMode=yes", "-o", "ConnectTimeout=30"];
const DEFAULT_TAIL_COMMAND: &[&str] = &["tail", "-f"];

/// Argv templates for the remote invocation. The spawned command line
/// is `ssh ++ [host] ++ tail ++ [path]`.
#[derive(Debug, Clone)]
pub struct RemoteCommand {
    ssh: Vec<String>,
    tail: Vec<String>,
}

impl Default for RemoteCommand {
    fn default() -> Self {
        Self {
            ssh: DEFAULT_SSH_COMMAND.iter().map(|s| s.to_string()).collect(),
            tail: DEFAULT_TAIL_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RemoteCommand {
    /// Builds a template from explicit argv vectors. The ssh part must
    /// carry at least the program to execute; the tail part may be
    /// empty (the remote side then receives only the path).
    pub fn new(ssh: Vec<String>, tail: Vec<String>) -> Result<Self, TailmuxError> {
        if ssh.is_empty() {
            return Err(TailmuxError::EmptyRemoteCommand);
        }
        Ok(Self { ssh, tail })
    }

    /// Applies `--ssh` / `--tail` overrides, each split on whitespace.
    /// A missing or blank override keeps the default.
    pub fn from_overrides(
        ssh: Option<&str>,
        tail: Option<&str>,
    ) -> Result<Self, TailmuxError> {
        let defaults = Self::default();
        let split = |raw: &str| -> Vec<String> {
            raw.split_whitespace().map(str::to_string).collect()
        };
        let ssh = match ssh.map(split) {
            Some(argv) if !argv.is_empty() => argv,
            Some(_) => return Err(TailmuxError::EmptyRemoteCommand),
            None => defaults.ssh,
        };
        let tail = match tail.map(split) {
            Some(argv) => argv,
            None => defaults.tail,
        };
        Ok(Self { ssh, tail })
    }

    pub(crate) fn argv(&self, target: &MachineTarget) -> Vec<String> {
        let mut argv =
            Vec::with_capacity(self.ssh.len() + self.tail.len() + 2);
        argv.extend(self.ssh.iter().cloned());
        argv.push(target.host.clone());
        argv.extend(self.tail.iter().cloned());
        argv.push(target.path.clone());
        argv
    }
}

/// Knobs for one fan-in run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Prefix every emitted line with `host: `.
    pub prefix_with_host: bool,
    /// Accumulate output writes instead of flushing per line. Trades
    /// latency for throughput on busy clusters.
    pub buffered_io: bool,
    /// Per-stream cap on unterminated line bytes.
    pub max_line_bytes: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            prefix_with_host: false,
            buffered_io: false,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl RunOptions {
    pub fn prefix_with_host(mut self, enabled: bool) -> Self {
        self.prefix_with_host = enabled;
        self
    }

    pub fn buffered_io(mut self, enabled: bool) -> Self {
        self.buffered_io = enabled;
        self
    }

    pub fn max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }
}
