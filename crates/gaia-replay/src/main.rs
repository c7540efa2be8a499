//! Gaia move log replayer.
//!
//! Reads a move log (`init` line followed by one move per line), plays it
//! through the engine and prints what happened.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;
mod session;

use report::Report;
use session::Session;

#[derive(Parser)]
#[command(name = "gaia-replay")]
#[command(about = "Replay a Gaia move log through the rules engine")]
struct Args {
    /// Move log to replay
    #[arg(value_name = "FILE")]
    log: PathBuf,

    /// Print one JSON report per line instead of text
    #[arg(long)]
    json: bool,

    /// Skip rejected moves instead of stopping at the first one
    #[arg(long)]
    keep_going: bool,

    /// Dump the final game state as JSON
    #[arg(long)]
    dump_state: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let text = std::fs::read_to_string(&args.log)
        .with_context(|| format!("reading {}", args.log.display()))?;

    info!(log = %args.log.display(), "replaying");

    let mut session = Session::new(args.keep_going);
    let reports = session.run(&text);

    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            println!("{}", report);
        }
    }

    if args.dump_state {
        let game = session.game().context("log has no init line")?;
        println!("{}", serde_json::to_string_pretty(game)?);
    }

    if let Some(Report::Rejected { line, error, .. }) =
        reports.iter().find(|r| matches!(r, Report::Rejected { .. }))
    {
        if !args.keep_going {
            anyhow::bail!("line {}: {}", line, error);
        }
    }
    Ok(())
}
