//! Command-line trace replayer for the cache simulator.
//!
//! Reads a JSON configuration and a memory access trace, drives a cache over a flat main
//! memory, and prints the aggregated statistics and the eviction log.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{fs, io, process};

use cachesim_core::common::{ConfigError, ConfigLoadError};
use cachesim_core::soc::MemoryDevice;
use cachesim_core::stats::summarize;
use cachesim_core::{CacheMemory, Config, MainMemory};
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod trace;

use trace::{ReplayError, TraceError};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Set-associative cache simulator",
    long_about = "Replays a memory access trace against a configurable set-associative cache and \
                  reports hit/miss statistics and evicted entries.\n\n\
                  Set RUST_LOG (e.g. RUST_LOG=cachesim_core=trace) for per-access logging."
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace file to replay
    trace: PathBuf,

    /// Print each transaction as it closes
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("invalid cache geometry: {0}")]
    Geometry(#[from] ConfigError),

    #[error("failed to read trace {path}: {source}")]
    TraceIo { path: PathBuf, source: io::Error },

    #[error("{0}")]
    Trace(#[from] TraceError),

    #[error("{0}")]
    Replay(#[from] ReplayError),
}

fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    match path {
        Some(path) => Ok(Config::from_json_file(path)?),
        None => Ok(Config::default()),
    }
}

fn eviction_report<M: MemoryDevice>(cache: &CacheMemory<M>) -> String {
    let mut out = String::from("EVICTIONS\n");
    if cache.all_evicted_entries().is_empty() {
        out.push_str("  (none)\n");
    }
    for (index, entries) in cache.all_evicted_entries() {
        let _ = write!(out, "  line {index:>3}:");
        for entry in entries {
            let _ = write!(out, " [{entry}]");
        }
        out.push('\n');
    }
    out
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let config = load_config(cli.config.as_deref())?;
    let text = fs::read_to_string(&cli.trace).map_err(|source| CliError::TraceIo {
        path: cli.trace.clone(),
        source,
    })?;
    let ops = trace::parse_trace(&text)?;

    let memory = MainMemory::from_config(&config.memory);
    let mut cache = CacheMemory::new(memory, config.cache.to_configuration())?;
    tracing::info!(
        algorithm = cache.algorithm_name(),
        lines = cache.geometry().line_count(),
        ways = cache.geometry().associativity,
        ops = ops.len(),
        "replaying trace"
    );

    let verbose = cli.verbose;
    let closed = trace::replay(&mut cache, &ops, |tx| {
        if verbose {
            println!("{tx}");
        }
    })?;

    Ok(format!(
        "{}\n{}",
        summarize(&closed),
        eviction_report(&cache)
    ))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) => print!("{report}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
