//! qtest: command-driven test driver for strqueue.
//!
//! Reads queue commands from a script file or standard input, executes them
//! against a queue, and exits non-zero if any command failed.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use strqueue::SortStrategy;
use strqueue::config::{Config, HarnessConfig};
use strqueue::harness::{Harness, Summary};

#[derive(Parser, Debug)]
#[command(name = "qtest")]
#[command(version, about = "Drive a string queue with scripted commands")]
struct Cli {
    /// Command script to run (reads standard input when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Harness configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sort algorithm for the `sort` command
    #[arg(short, long, value_enum)]
    strategy: Option<SortStrategy>,

    /// Refuse every Nth allocation (0 disables)
    #[arg(short = 'm', long)]
    fault_period: Option<u32>,

    /// Echo each command before running it
    #[arg(short, long)]
    echo: bool,

    /// Increase log verbosity (default info, -v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(summary) if summary.errors == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!("{} of {} commands failed", summary.errors, summary.commands);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Summary> {
    let config = load_config(&cli)?;
    let stdout = io::stdout().lock();
    let mut harness = Harness::new(config, stdout);

    match &cli.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script: {}", path.display()))?;
            tracing::info!(script = %path.display(), "running script");
            harness.run(BufReader::new(file))
        }
        None => harness.run(io::stdin().lock()),
    }
}

/// Load the configuration file (if any) and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?.harness,
        None => HarnessConfig::default(),
    };

    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(period) = cli.fault_period {
        config.fault_period = period;
    }
    if cli.echo {
        config.echo = true;
    }

    let validation = config.validate()?;
    for warning in &validation.warnings {
        tracing::warn!("{warning}");
    }
    tracing::debug!(?config, "harness configured");
    Ok(config)
}

/// Filter used when `RUST_LOG` is unset.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize stderr logging; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}
