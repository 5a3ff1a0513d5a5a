//! Parameter sweep command
//!
//! Grid-searches burst parameters over one events file and reports the grid
//! points whose detector output reproduces known burst times. A study file
//! looks like:
//!
//! ```toml
//! [study]
//! name = "culture-7"
//! events = "events.csv"        # relative to the study file
//!
//! [grid]
//! num_spikes_to_burst = [2, 3, 4]
//! max_burst_duration = [50.0, 100.0]
//! min_inter_burst_interval = [100.0, 200.0]
//!
//! [expected]
//! network = [1203.0, 5120.5]
//! tolerance = 1e-6
//!
//! [expected.channel]
//! "12" = [1190.0]
//! ```
//!
//! When both network and channel expectations are given, only the grid points
//! matching both are reported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use spikeburst_core::{intersect_keys, run_sweep, SweepGrid, SweepKey, REPORT_VERSION};

use crate::config::SpikeburstConfig;
use crate::error::{CliError, CliResult};
use crate::io::{read_events, write_json};

/// Grid-search burst parameters
#[derive(Args, Debug)]
pub struct SweepCommand {
    /// Study configuration file (.toml)
    pub study: PathBuf,

    /// Events file, overriding `study.events`
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// JSON report path (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Deserialize)]
struct StudyConfig {
    #[serde(default)]
    study: StudySection,
    grid: SweepGrid,
    #[serde(default)]
    expected: Expected,
}

#[derive(Debug, Default, Deserialize)]
struct StudySection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    events: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Expected {
    #[serde(default)]
    network: Option<Vec<f64>>,
    #[serde(default)]
    channel: Option<BTreeMap<String, Vec<f64>>>,
    #[serde(default = "default_tolerance")]
    tolerance: f64,
}

impl Default for Expected {
    fn default() -> Self {
        Self {
            network: None,
            channel: None,
            tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-9
}

/// Whether a grid point reproduced each configured expectation
#[derive(Debug, Clone, Copy)]
struct PointMatch {
    network: bool,
    channel: bool,
}

#[derive(Debug, Serialize)]
struct SweepReport {
    version: u32,
    study: String,
    events: usize,
    grid_points: usize,
    network_matches: Option<usize>,
    channel_matches: Option<usize>,
    matches: Vec<SweepKey>,
}

impl SweepCommand {
    pub fn execute(self, config: &SpikeburstConfig) -> CliResult<()> {
        let text = std::fs::read_to_string(&self.study).map_err(|e| {
            CliError::missing_resource(format!("Cannot read study {}: {}", self.study.display(), e))
        })?;
        let study: StudyConfig = toml::from_str(&text)?;

        if study.expected.network.is_none() && study.expected.channel.is_none() {
            return Err(CliError::invalid_args(
                "Study has no [expected] network or channel burst times",
            ));
        }
        if study.grid.is_empty() {
            return Err(CliError::invalid_args("Study grid has an empty axis"));
        }

        let events_path = self.events_path(&study)?;
        let events = read_events(&events_path)?;
        info!(
            "Study '{}': {} grid points over {} events",
            study.study.name,
            study.grid.len(),
            events.len()
        );

        let progress = if config.output.show_progress && !self.quiet {
            ProgressBar::new(study.grid.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .map_err(|e| CliError::Generic(anyhow::anyhow!(e)))?
                .progress_chars("#>-"),
        );
        progress.set_message("sweeping");

        let expected = &study.expected;
        let results = run_sweep(&events, &study.grid, |_, analysis| {
            let network = expected
                .network
                .as_ref()
                .map_or(true, |want| times_match(&analysis.network.trigger_times(), want, expected.tolerance));
            let channel = expected.channel.as_ref().map_or(true, |want| {
                let ends = analysis.channel.end_times();
                want.iter().all(|(ch, times)| {
                    let got = ends.get(ch).map(Vec::as_slice).unwrap_or(&[]);
                    times_match(got, times, expected.tolerance)
                })
            });
            progress.inc(1);
            PointMatch { network, channel }
        })?;
        progress.finish_and_clear();

        let network_hits: BTreeMap<SweepKey, ()> = results
            .iter()
            .filter(|(_, m)| m.network)
            .map(|(k, _)| (*k, ()))
            .collect();
        let channel_hits: BTreeMap<SweepKey, ()> = results
            .iter()
            .filter(|(_, m)| m.channel)
            .map(|(k, _)| (*k, ()))
            .collect();
        let matches = intersect_keys(&[&network_hits, &channel_hits]);

        if matches.is_empty() {
            warn!("No parameter set reproduces the expected bursts");
        } else {
            info!("{} of {} parameter sets match", matches.len(), results.len());
        }

        let report = SweepReport {
            version: REPORT_VERSION,
            study: study.study.name.clone(),
            events: events.len(),
            grid_points: results.len(),
            network_matches: expected.network.as_ref().map(|_| network_hits.len()),
            channel_matches: expected.channel.as_ref().map(|_| channel_hits.len()),
            matches,
        };
        write_json(self.out.as_deref(), &report, config.output.pretty)
    }

    fn events_path(&self, study: &StudyConfig) -> CliResult<PathBuf> {
        if let Some(path) = &self.events {
            return Ok(path.clone());
        }
        let relative = study.study.events.as_ref().ok_or_else(|| {
            CliError::invalid_args("No events file: pass --events or set study.events")
        })?;
        let base = self.study.parent().unwrap_or_else(|| Path::new(""));
        Ok(base.join(relative))
    }
}

/// Element-wise comparison within `tolerance`
fn times_match(got: &[f64], want: &[f64], tolerance: f64) -> bool {
    got.len() == want.len() && got.iter().zip(want).all(|(g, w)| (g - w).abs() <= tolerance)
}
