use clap::Parser;
use tokio::io::{self, AsyncWrite, BufWriter};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tailmux::{
    resolve_targets, run_fan_in, start_all, OutputSink, RemoteCommand, RunOptions, TailmuxError,
};

#[derive(Debug, Parser)]
#[command(name = "tailmux", version)]
#[command(about = "Tail files on many remote hosts into one interleaved stream")]
struct Cli {
    /// Space separated machine list, `host[:path]` per entry
    #[arg(short, long)]
    machines: Vec<String>,
    /// Default target file to tail
    #[arg(short = 'f', long = "file")]
    file: Option<String>,
    /// Prefix every line with the source machine name
    #[arg(short, long)]
    prefix: bool,
    /// Enable IO buffering, recommended for busy clusters
    #[arg(short, long)]
    bulk: bool,
    /// Show extra debugging information
    #[arg(short, long)]
    debug: bool,
    /// Custom ssh command, whitespace separated
    #[arg(short, long)]
    ssh: Option<String>,
    /// Custom tail command, whitespace separated
    #[arg(short, long)]
    tail: Option<String>,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "tailmux=debug" } else { "tailmux=warn" };
    // Diagnostics go to stderr; stdout carries only the line stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), TailmuxError> {
    let targets = resolve_targets(&cli.machines, cli.file.as_deref())?;
    let command = RemoteCommand::from_overrides(cli.ssh.as_deref(), cli.tail.as_deref())?;
    let options = RunOptions::default()
        .prefix_with_host(cli.prefix)
        .buffered_io(cli.bulk);

    let streams = start_all(targets, &command)?;

    let writer: Box<dyn AsyncWrite + Unpin> = if cli.bulk {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(io::stdout())
    };
    let mut sink = OutputSink::new(writer, &options);

    let summary = run_fan_in(streams, &options, &mut sink).await?;
    debug!(
        lines = summary.lines_written,
        failed = summary.streams_failed,
        "run complete",
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("tailmux: {err}");
        std::process::exit(1);
    }
}
