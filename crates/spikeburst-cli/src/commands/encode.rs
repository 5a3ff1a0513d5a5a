//! Signal-to-spike encoding command
//!
//! Example:
//!   spikeburst encode ch1.csv ch2.csv --threshold-up 0.5 --threshold-down -0.5 \
//!       --refractory 0.01 --out spikes.json --events-out events.csv

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use spikeburst_core::{
    merge_trains, EncoderParams, InterpolationKind, SignalEncoder, SpikeTrains, REPORT_VERSION,
};

use crate::config::SpikeburstConfig;
use crate::error::{CliError, CliResult};
use crate::io::{file_stem, read_signal, write_events, write_json};

/// Encode signals into up/down spike trains
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Signal files (`time,amplitude` CSV); each file becomes one channel named after its stem
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Rise above the reference level that emits an up spike
    #[arg(long)]
    pub threshold_up: Option<f64>,

    /// Signed drop below the reference level that emits a down spike (negative)
    #[arg(long, allow_hyphen_values = true)]
    pub threshold_down: Option<f64>,

    /// Minimum time between two spikes of either polarity
    #[arg(long)]
    pub refractory: Option<f64>,

    /// Resample to `round(span * factor)` points before scanning (> 1 to enable)
    #[arg(long)]
    pub interpolation_factor: Option<f64>,

    /// Interpolant used when resampling
    #[arg(long, value_enum)]
    pub interpolation: Option<InterpolationArg>,

    /// JSON report path (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Also write merged `time,channel` events for burst detection
    #[arg(long)]
    pub events_out: Option<PathBuf>,

    /// Spike trains included in the merged events file
    #[arg(long, value_enum, default_value = "up")]
    pub polarity: PolarityArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum InterpolationArg {
    None,
    Linear,
    Cubic,
}

impl From<InterpolationArg> for InterpolationKind {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::None => InterpolationKind::None,
            InterpolationArg::Linear => InterpolationKind::Linear,
            InterpolationArg::Cubic => InterpolationKind::Cubic,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolarityArg {
    Up,
    Down,
    /// Both trains, as channels `<stem>:up` and `<stem>:down`
    Both,
}

#[derive(Debug, Serialize)]
struct EncodeReport<'a> {
    version: u32,
    params: &'a EncoderParams,
    resampler: &'static str,
    channels: BTreeMap<String, SpikeTrains>,
}

impl EncodeCommand {
    pub fn execute(self, config: &SpikeburstConfig) -> CliResult<()> {
        let params = self.params(config)?;
        let encoder = SignalEncoder::new(params)?;
        info!(
            "Encoding {} signal(s) with {} resampling",
            self.inputs.len(),
            encoder.resampler_name()
        );

        let mut channels = BTreeMap::new();
        for path in &self.inputs {
            let channel = file_stem(path);
            if channels.contains_key(&channel) {
                return Err(CliError::invalid_args(format!(
                    "Duplicate channel name '{}' from {}",
                    channel,
                    path.display()
                )));
            }

            let signal = read_signal(path)?;
            let trains = encoder.encode(&signal)?;
            info!(
                "{}: {} samples -> {} up, {} down spikes",
                channel,
                signal.len(),
                trains.up.len(),
                trains.down.len()
            );
            channels.insert(channel, trains);
        }

        if let Some(events_path) = &self.events_out {
            let events = merge_trains(self.selected_trains(&channels));
            write_events(events_path, &events)?;
            info!("Wrote {} events to {}", events.len(), events_path.display());
        }

        let report = EncodeReport {
            version: REPORT_VERSION,
            params: encoder.params(),
            resampler: encoder.resampler_name(),
            channels,
        };
        write_json(self.out.as_deref(), &report, config.output.pretty)
    }

    /// Configuration defaults overridden by flags
    fn params(&self, config: &SpikeburstConfig) -> CliResult<EncoderParams> {
        let mut section = config.encoder.clone();
        if let Some(v) = self.threshold_up {
            section.threshold_up = v;
        }
        if let Some(v) = self.threshold_down {
            section.threshold_down = v;
        }
        if let Some(v) = self.refractory {
            section.refractory_period = v;
        }
        if let Some(v) = self.interpolation_factor {
            section.interpolation_factor = Some(v);
        }
        if let Some(kind) = self.interpolation {
            section.interpolation = kind.into();
        }
        section.to_params()
    }

    fn selected_trains<'a>(
        &self,
        channels: &'a BTreeMap<String, SpikeTrains>,
    ) -> Vec<(String, &'a [f64])> {
        let mut selected = Vec::new();
        for (name, trains) in channels {
            match self.polarity {
                PolarityArg::Up => selected.push((name.clone(), trains.up.as_slice())),
                PolarityArg::Down => selected.push((name.clone(), trains.down.as_slice())),
                PolarityArg::Both => {
                    selected.push((format!("{}:up", name), trains.up.as_slice()));
                    selected.push((format!("{}:down", name), trains.down.as_slice()));
                }
            }
        }
        selected
    }
}
