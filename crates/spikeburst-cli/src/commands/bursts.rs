//! Burst detection command
//!
//! Reads one `time,channel` events file, or every `.csv` under a directory, and
//! runs the channel detector, the network detector, or both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use spikeburst_core::{
    analyze, channel_bursts, network_bursts, BurstParams, ChannelBurstReport, NetworkBurstReport,
    REPORT_VERSION,
};

use crate::config::SpikeburstConfig;
use crate::error::CliResult;
use crate::io::{collect_csv_files, file_stem, read_events, write_json};

/// Detect channel and network bursts
#[derive(Args, Debug)]
pub struct BurstsCommand {
    /// Events file (`time,channel` CSV) or a directory of them
    pub input: PathBuf,

    /// Detectors to run
    #[arg(short, long, value_enum, default_value = "both")]
    pub mode: DetectMode,

    /// Spikes (channel) or distinct channels (network) needed for a burst
    #[arg(short = 'n', long)]
    pub num_spikes: Option<usize>,

    /// Trailing window width
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Minimum gap between the previous burst and the start of the next
    #[arg(long)]
    pub min_interval: Option<f64>,

    /// JSON report path (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectMode {
    Channel,
    Network,
    Both,
}

#[derive(Debug, Serialize)]
struct BurstsReport {
    version: u32,
    mode: DetectMode,
    params: BurstParams,
    recordings: BTreeMap<String, RecordingReport>,
}

#[derive(Debug, Serialize)]
struct RecordingReport {
    events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<ChannelBurstReport<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<NetworkBurstReport<String>>,
}

impl BurstsCommand {
    pub fn execute(self, config: &SpikeburstConfig) -> CliResult<()> {
        let params = self.params(config)?;
        let files = collect_csv_files(&self.input)?;
        if files.is_empty() {
            warn!("No .csv files under {}", self.input.display());
        }

        let mut recordings = BTreeMap::new();
        for path in &files {
            let events = read_events(path)?;
            let (channel, network) = match self.mode {
                DetectMode::Channel => (Some(channel_bursts(&events, params)?), None),
                DetectMode::Network => (None, Some(network_bursts(&events, params)?)),
                DetectMode::Both => {
                    let analysis = analyze(&events, params)?;
                    (Some(analysis.channel), Some(analysis.network))
                }
            };

            let name = self.recording_name(path);
            info!(
                "{}: {} events, {} channel bursts, {} network bursts",
                name,
                events.len(),
                channel.as_ref().map_or(0, |r| r.total()),
                network.as_ref().map_or(0, |r| r.len())
            );
            recordings.insert(
                name,
                RecordingReport {
                    events: events.len(),
                    channel,
                    network,
                },
            );
        }

        let report = BurstsReport {
            version: REPORT_VERSION,
            mode: self.mode,
            params,
            recordings,
        };
        write_json(self.out.as_deref(), &report, config.output.pretty)
    }

    /// File stem for a single input, path relative to the input directory otherwise
    fn recording_name(&self, path: &Path) -> String {
        match path.strip_prefix(&self.input) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.with_extension("").display().to_string(),
            _ => file_stem(path),
        }
    }

    /// Configuration defaults overridden by flags
    fn params(&self, config: &SpikeburstConfig) -> CliResult<BurstParams> {
        let mut section = config.bursts.clone();
        if let Some(v) = self.num_spikes {
            section.num_spikes_to_burst = v;
        }
        if let Some(v) = self.max_duration {
            section.max_burst_duration = v;
        }
        if let Some(v) = self.min_interval {
            section.min_inter_burst_interval = v;
        }
        section.to_params()
    }
}
