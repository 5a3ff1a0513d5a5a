//! # spikeburst - spike encoding and burst detection from the command line
//!
//! Encodes sampled signals into spike trains, detects channel and network
//! bursts in spike event files, and sweeps burst parameters against known
//! burst times.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spikeburst_cli::SpikeburstCli;

fn main() {
    let cli = SpikeburstCli::parse();

    // Initialize logging with environment variable support; --verbose wins
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute the command
    if let Err(err) = cli.execute() {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
}
