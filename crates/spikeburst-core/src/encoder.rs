//! Signal-to-spike encoding
//!
//! Converts a sampled analog signal into two asynchronous spike trains: an
//! "up" spike whenever the amplitude rises more than `threshold_up` above the
//! current reference level, and a "down" spike whenever it drops more than
//! `|threshold_down|` below it. The reference level starts at zero and is
//! reset to the sample amplitude on every emitted spike of either polarity,
//! after which the scan jumps past the refractory period.

use core::fmt;

use crate::{
    error::*,
    refractory::skip_refractory,
    resample::{InterpolationKind, Resample},
    signal::Signal,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for signal-to-spike encoding
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EncoderParams {
    /// Rise above the reference level that emits an up spike (> 0)
    pub threshold_up: f64,
    /// Signed drop below the reference level that emits a down spike (< 0)
    pub threshold_down: f64,
    /// Minimum time between two emitted spikes of either polarity (same unit as time)
    pub refractory_period: f64,
    /// Upsampling factor; absent or `<= 1` disables resampling
    pub interpolation_factor: Option<f64>,
    /// Interpolant used when resampling
    pub interpolation: InterpolationKind,
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            threshold_up: 1.0,
            threshold_down: -1.0,
            refractory_period: 0.0,
            interpolation_factor: None,
            interpolation: InterpolationKind::Linear,
        }
    }
}

impl EncoderParams {
    /// Create new encoder parameters with validation
    pub fn new(threshold_up: f64, threshold_down: f64, refractory_period: f64) -> Result<Self> {
        let params = Self {
            threshold_up,
            threshold_down,
            refractory_period,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the interpolation factor
    pub fn with_interpolation_factor(mut self, factor: Option<f64>) -> Self {
        self.interpolation_factor = factor;
        self
    }

    /// Set the interpolant
    pub fn with_interpolation(mut self, kind: InterpolationKind) -> Self {
        self.interpolation = kind;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_up.is_finite() || self.threshold_up <= 0.0 {
            return Err(BurstError::invalid_parameter(
                "threshold_up",
                self.threshold_up.to_string(),
                "finite and > 0.0",
            ));
        }
        if !self.threshold_down.is_finite() || self.threshold_down >= 0.0 {
            return Err(BurstError::invalid_parameter(
                "threshold_down",
                self.threshold_down.to_string(),
                "finite and < 0.0",
            ));
        }
        ensure_non_negative("refractory_period", self.refractory_period)?;
        if let Some(factor) = self.interpolation_factor {
            if factor.is_nan() || factor.is_infinite() {
                return Err(BurstError::invalid_parameter(
                    "interpolation_factor",
                    factor.to_string(),
                    "finite",
                ));
            }
        }
        Ok(())
    }

    /// Whether these parameters resample before scanning
    pub fn resamples(&self) -> bool {
        self.interpolation != InterpolationKind::None
            && self.interpolation_factor.map_or(false, |f| f > 1.0)
    }
}

/// Up and down spike trains produced from one signal
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpikeTrains {
    /// Rising threshold crossings, strictly increasing
    pub up: Vec<f64>,
    /// Falling threshold crossings, strictly increasing
    pub down: Vec<f64>,
}

impl SpikeTrains {
    /// Total number of spikes of both polarities
    pub fn total(&self) -> usize {
        self.up.len() + self.down.len()
    }

    /// Whether no spike was emitted
    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }
}

/// Spike polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Polarity {
    /// Rising crossing
    Up,
    /// Falling crossing
    Down,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Threshold-crossing encoder with a pluggable resampling strategy
pub struct SignalEncoder {
    params: EncoderParams,
    resampler: Box<dyn Resample>,
}

impl fmt::Debug for SignalEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEncoder")
            .field("params", &self.params)
            .field("resampler", &self.resampler.name())
            .finish()
    }
}

impl SignalEncoder {
    /// Create an encoder; the resampler follows `params.interpolation`
    pub fn new(params: EncoderParams) -> Result<Self> {
        params.validate()?;
        let resampler = params.interpolation.build(params.interpolation_factor)?;
        Ok(Self { params, resampler })
    }

    /// Replace the resampling strategy
    pub fn with_resampler(mut self, resampler: Box<dyn Resample>) -> Self {
        self.resampler = resampler;
        self
    }

    /// Encoder parameters
    pub fn params(&self) -> &EncoderParams {
        &self.params
    }

    /// Name of the active resampling strategy
    pub fn resampler_name(&self) -> &'static str {
        self.resampler.name()
    }

    /// Encode a signal into up and down spike trains
    pub fn encode(&self, signal: &Signal) -> Result<SpikeTrains> {
        if signal.is_empty() {
            return Ok(SpikeTrains::default());
        }

        let resampled = self.resampler.resample(signal)?;
        log::debug!(
            "Encoding {} samples ({} after {} resampling)",
            signal.len(),
            resampled.len(),
            self.resampler.name()
        );

        let trains = self.scan(resampled.times(), resampled.amplitudes());
        log::debug!(
            "Encoded {} up and {} down spikes",
            trains.up.len(),
            trains.down.len()
        );
        Ok(trains)
    }

    fn scan(&self, times: &[f64], amplitudes: &[f64]) -> SpikeTrains {
        let mut trains = SpikeTrains::default();
        let mut reference = 0.0;
        let mut idx = 0;

        while idx < times.len() {
            let delta = amplitudes[idx] - reference;
            let polarity = if delta > self.params.threshold_up {
                Polarity::Up
            } else if delta < self.params.threshold_down {
                Polarity::Down
            } else {
                idx += 1;
                continue;
            };

            match polarity {
                Polarity::Up => trains.up.push(times[idx]),
                Polarity::Down => trains.down.push(times[idx]),
            }
            reference = amplitudes[idx];
            idx = skip_refractory(times, idx, self.params.refractory_period);
        }

        trains
    }
}

/// Encode raw sample slices.
///
/// `interpolation_factor` resamples linearly when present and `> 1`.
pub fn encode(
    times: &[f64],
    amplitudes: &[f64],
    threshold_up: f64,
    threshold_down: f64,
    refractory_period: f64,
    interpolation_factor: Option<f64>,
) -> Result<SpikeTrains> {
    let params = EncoderParams::new(threshold_up, threshold_down, refractory_period)?
        .with_interpolation_factor(interpolation_factor);
    let signal = Signal::new(times.to_vec(), amplitudes.to_vec())?;
    SignalEncoder::new(params)?.encode(&signal)
}
