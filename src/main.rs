//! textfreq - interactive frequency analysis and search over text files.

mod repl;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Analyze a text file: frequency counts, cached search, replace with
/// undo/redo, and persisted sessions.
#[derive(Debug, Parser)]
#[command(name = "textfreq", version, about)]
struct Args {
    /// A .txt, .json or .bin file to open on startup. When omitted, the
    /// program asks for a path.
    path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("textfreq starting");
    repl::run(args.path)
}
