//! CLI command implementations for spikeburst

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SpikeburstConfig;
use crate::error::CliResult;

pub mod bursts;
pub mod completions;
pub mod encode;
pub mod init;
pub mod sweep;

/// spikeburst - spike encoding and burst detection for multi-channel recordings
#[derive(Parser, Debug)]
#[command(
    name = "spikeburst",
    version,
    about = "Spike encoding and burst detection for multi-channel recordings",
    long_about = "spikeburst converts sampled signals into up/down spike trains, finds \
                  per-channel and network-wide bursts in spike event files, and grid-searches \
                  burst parameters against known burst times."
)]
pub struct SpikeburstCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace directory holding spikeburst.toml (defaults to current directory)
    #[arg(short, long, global = true, env = "SPIKEBURST_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode signals into up/down spike trains
    Encode(encode::EncodeCommand),

    /// Detect channel and network bursts in spike events
    #[command(alias = "detect")]
    Bursts(bursts::BurstsCommand),

    /// Grid-search burst parameters against expected burst times
    Sweep(sweep::SweepCommand),

    /// Write a default configuration file
    Init(init::InitCommand),

    /// Generate shell completion scripts
    Completions(completions::CompletionsCommand),
}

impl SpikeburstCli {
    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        let workspace = self.workspace;
        let explicit = self.config;
        let workspace_dir = || -> CliResult<PathBuf> {
            match &workspace {
                Some(dir) => Ok(dir.clone()),
                None => Ok(std::env::current_dir()?),
            }
        };
        let load_config = || -> CliResult<SpikeburstConfig> {
            SpikeburstConfig::resolve(explicit.as_deref(), &workspace_dir()?)
        };

        match self.command {
            Commands::Encode(cmd) => cmd.execute(&load_config()?),
            Commands::Bursts(cmd) => cmd.execute(&load_config()?),
            Commands::Sweep(cmd) => cmd.execute(&load_config()?),
            Commands::Init(cmd) => cmd.execute(&workspace_dir()?, explicit.as_deref()),
            Commands::Completions(cmd) => cmd.execute(),
        }
    }
}
