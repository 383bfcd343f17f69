//! mcbe-replay - runs a scripted scenario through every polling signal.
//!
//! The scenario drives an in-memory host tick by tick; each delivered event is
//! logged and optionally appended to a JSONL file.

mod config;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use config::{parse_kinds, Scenario};
use mcbe_testkit::JsonlSink;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a host scenario through the polling signals", long_about = None)]
struct Args {
    /// Scenario TOML file
    #[arg(long)]
    scenario: PathBuf,
    /// Override the scenario's tick count
    #[arg(long)]
    ticks: Option<u64>,
    /// Write delivered events as JSONL (overrides the scenario's `events_out`)
    #[arg(long)]
    events_out: Option<PathBuf>,
    /// Comma-separated signal names (default: the scenario's list, else all)
    #[arg(long, value_delimiter = ',')]
    signals: Vec<String>,
}

fn main() -> Result<()> {
    // WARN by default; RUST_LOG=info shows every delivered event
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    if let Some(ticks) = args.ticks {
        scenario.ticks = ticks;
    }
    let kinds = if args.signals.is_empty() {
        scenario.signal_kinds()?
    } else {
        parse_kinds(&args.signals)?
    };
    info!(ticks = scenario.ticks, signals = kinds.len(), "starting replay");

    let events_out = args.events_out.or_else(|| scenario.events_out.clone());
    let mut sink = match &events_out {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("creating event log {}", path.display()))?,
        ),
        None => None,
    };

    let report = replay::run(&scenario, &kinds, sink.as_mut())?;
    if let Some(sink) = sink {
        sink.finish()?;
    }

    println!("Replayed {} ticks, {} events", scenario.ticks, report.events.len());
    for (kind, count) in report.counts() {
        println!("  {kind:<22} {count}");
    }
    if let Some(path) = events_out {
        println!("Event log: {}", path.display());
    }
    Ok(())
}
