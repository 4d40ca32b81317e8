//! Spinbit - passive RTT estimation from captured flows
//!
//! Entry point for the command line tool.

use anyhow::{Context, Result};
use clap::Parser;
use spinbit::config::AppConfig;
use spinbit::records::reader::load_flows;
use spinbit::records::writer::{write_rtts, OutputFormat};
use spinbit::stats::store::RttStatsStore;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Estimate RTTs from the spin-bit square waves of decoded packet records
#[derive(Parser, Debug)]
#[command(name = "spinbit", version = spinbit::VERSION)]
struct Args {
    /// JSON Lines file of decoded packet records
    input: PathBuf,

    /// Write RTT rows to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output row format: csv or json
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print per-flow RTT statistics to stderr
    #[arg(short, long)]
    summary: bool,

    /// Write the effective config (file plus flags) to this path
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, config_error) = match args.config.as_deref() {
        Some(path) => AppConfig::load(path),
        None => (AppConfig::default(), None),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_filter))
                .context("Invalid log filter")?,
        )
        .init();

    info!(version = spinbit::VERSION, built = spinbit::BUILD_DATE, "spinbit starting");
    match (&args.config, config_error) {
        (_, Some(e)) => warn!(error = %e, "Using default config"),
        (Some(path), None) => info!(path = %path.display(), "Loaded config from disk"),
        (None, None) => {}
    }

    if let Some(format) = args.format {
        config.format = format;
    }
    config.summary |= args.summary;
    if let Some(path) = &args.save_config {
        config
            .save(path)
            .with_context(|| format!("Failed to save config to {}", path.display()))?;
    }

    let table = load_flows(&args.input)
        .with_context(|| format!("Failed to load packets from {}", args.input.display()))?;
    let rtts = table.estimate_all();

    let format = config.format;
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_rtts(&mut BufWriter::new(file), &rtts, format)?;
            info!(path = %path.display(), rows = rtts.len(), "RTT rows written");
        }
        None => {
            let stdout = io::stdout();
            write_rtts(&mut stdout.lock(), &rtts, format)?;
        }
    }

    if config.summary {
        let mut store = RttStatsStore::new();
        store.record_all(&rtts);
        print_summary(&store, table.len())?;
    }

    Ok(())
}

fn print_summary(store: &RttStatsStore, total_flows: usize) -> Result<()> {
    let mut err = io::stderr().lock();
    writeln!(
        err,
        "{:<24} {:>8} {:>10} {:>10} {:>10}",
        "flow", "samples", "min_ms", "avg_ms", "max_ms"
    )?;
    for (flow_id, stats) in store.summary_rows() {
        writeln!(
            err,
            "{:<24} {:>8} {:>10.3} {:>10.3} {:>10.3}",
            flow_id, stats.count, stats.min_ms, stats.avg_ms, stats.max_ms
        )?;
    }

    let overall = store.overall();
    if overall.is_empty() {
        writeln!(err, "No RTT samples in {} flow(s)", total_flows)?;
    } else {
        writeln!(
            err,
            "{} sample(s) from {} of {} flow(s), avg {:.3} ms",
            overall.count,
            store.flow_count(),
            total_flows,
            overall.avg_ms
        )?;
    }
    Ok(())
}
