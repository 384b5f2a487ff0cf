#![cfg(unix)]
//! End-to-end fan-in runs against real local subprocesses. The custom
//! remote-command override stands in for ssh: the spawned argv becomes
//! `sh -c <script> <host> <path>`, so each script sees its host as
//! `$0` and its path as `$1`.

use std::io::Write as _;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::time::timeout;

use tailmux::{
    run_fan_in, start_all, MachineTarget, OutputSink, RemoteCommand, RunOptions, TailmuxError,
};

fn shell_streams(entries: &[(&str, &str)]) -> Vec<tailmux::RemoteStream> {
    let targets: Vec<MachineTarget> = entries
        .iter()
        .map(|(host, _)| MachineTarget {
            host: host.to_string(),
            path: "/dev/null".to_string(),
        })
        .collect();

    // One stream per entry; each gets its own script.
    entries
        .iter()
        .zip(targets)
        .map(|((_, script), target)| {
            let command = RemoteCommand::new(
                vec!["sh".to_string(), "-c".to_string(), script.to_string()],
                Vec::new(),
            )
            .unwrap();
            tailmux::RemoteStream::start(target, &command).unwrap()
        })
        .collect()
}

async fn run_to_vec(
    streams: Vec<tailmux::RemoteStream>,
    options: RunOptions,
) -> (Vec<u8>, tailmux::RunSummary) {
    let mut sink = OutputSink::new(Vec::new(), &options);
    let summary = timeout(
        Duration::from_secs(10),
        run_fan_in(streams, &options, &mut sink),
    )
    .await
    .expect("run did not terminate")
    .expect("run failed");
    (sink.into_inner(), summary)
}

#[tokio::test]
async fn single_stream_preserves_line_order() {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..200 {
        writeln!(file, "line-{i}").unwrap();
    }
    file.flush().unwrap();

    let script = format!("cat '{}'", file.path().display());
    let streams = shell_streams(&[("alpha", script.as_str())]);
    let (output, summary) = run_to_vec(streams, RunOptions::default()).await;

    let expected: String = (0..200).map(|i| format!("line-{i}\n")).collect();
    assert_eq!(String::from_utf8(output).unwrap(), expected);
    assert_eq!(summary.lines_written, 200);
    assert_eq!(summary.streams_failed, 0);
}

#[tokio::test]
async fn dead_stream_does_not_disturb_the_others() {
    // `beta` ends immediately; `alpha` keeps producing afterwards.
    let streams = shell_streams(&[
        ("alpha", "printf 'a1\\n'; sleep 0.3; printf 'a2\\na3\\n'"),
        ("beta", "true"),
    ]);
    let options = RunOptions::default().prefix_with_host(true);
    let (output, summary) = run_to_vec(streams, options).await;

    let output = String::from_utf8(output).unwrap();
    let alpha: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("alpha: "))
        .collect();
    assert_eq!(alpha, vec!["alpha: a1", "alpha: a2", "alpha: a3"]);
    assert_eq!(summary.streams_failed, 0);
}

#[tokio::test]
async fn interleaved_hosts_keep_per_host_fifo() {
    let streams = shell_streams(&[
        ("alpha", "for i in 1 2 3 4 5; do printf \"a$i\\n\"; sleep 0.05; done"),
        ("beta", "for i in 1 2 3 4 5; do printf \"b$i\\n\"; sleep 0.05; done"),
    ]);
    let options = RunOptions::default().prefix_with_host(true);
    let (output, summary) = run_to_vec(streams, options).await;

    let output = String::from_utf8(output).unwrap();
    for host in ["alpha", "beta"] {
        let prefix = format!("{host}: ");
        let seen: Vec<&str> = output
            .lines()
            .filter_map(|l| l.strip_prefix(prefix.as_str()))
            .collect();
        let initial = &host[..1];
        let expected: Vec<String> = (1..=5).map(|i| format!("{initial}{i}")).collect();
        assert_eq!(seen, expected, "host {host} lost FIFO order");
    }
    assert_eq!(summary.lines_written, 10);
}

#[tokio::test]
async fn run_terminates_when_every_stream_ends() {
    let streams = shell_streams(&[
        ("a", "printf 'one\\n'"),
        ("b", "printf 'two\\n'"),
        ("c", "printf 'three\\n'"),
    ]);
    let (output, summary) = run_to_vec(streams, RunOptions::default()).await;

    let mut lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["one", "three", "two"]);
    assert_eq!(summary.streams_failed, 0);
}

#[tokio::test]
async fn spawn_failure_aborts_before_any_output() {
    let targets = vec![
        MachineTarget {
            host: "good".to_string(),
            path: "/var/log/app.log".to_string(),
        },
        MachineTarget {
            host: "bad".to_string(),
            path: "/var/log/app.log".to_string(),
        },
    ];
    let command = RemoteCommand::new(
        vec!["/nonexistent/tailmux-test-binary".to_string()],
        Vec::new(),
    )
    .unwrap();

    let err = start_all(targets, &command).unwrap_err();
    assert!(matches!(err, TailmuxError::Spawn { ref host, .. } if host == "good"));
}

#[tokio::test]
async fn over_long_lines_are_split_not_buffered() {
    // 25 bytes of 'x' with no newline, cap at 10: expect 10/10/5.
    let streams = shell_streams(&[("alpha", "printf 'xxxxxxxxxxxxxxxxxxxxxxxxx'")]);
    let options = RunOptions::default().max_line_bytes(10);
    let (output, summary) = run_to_vec(streams, options).await;

    let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
    assert_eq!(lines, vec!["xxxxxxxxxx", "xxxxxxxxxx", "xxxxx"]);
    assert_eq!(summary.lines_written, 3);
}
