//! Burst detection parameters

use crate::error::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters shared by the channel and network burst detectors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BurstParams {
    /// Spikes (channel detector) or distinct channels (network detector) needed for a burst
    pub num_spikes_to_burst: usize,
    /// Width of the trailing window, from the oldest counted spike to the newest
    pub max_burst_duration: f64,
    /// Debounce: a new burst must start more than this long after the previous one
    pub min_inter_burst_interval: f64,
}

impl Default for BurstParams {
    fn default() -> Self {
        Self {
            num_spikes_to_burst: 3,
            max_burst_duration: 100.0,
            min_inter_burst_interval: 100.0,
        }
    }
}

impl BurstParams {
    /// Create new burst parameters with validation
    pub fn new(
        num_spikes_to_burst: usize,
        max_burst_duration: f64,
        min_inter_burst_interval: f64,
    ) -> Result<Self> {
        let params = Self {
            num_spikes_to_burst,
            max_burst_duration,
            min_inter_burst_interval,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("max_burst_duration", self.max_burst_duration)?;
        ensure_non_negative("min_inter_burst_interval", self.min_inter_burst_interval)?;
        Ok(())
    }

    /// Whether `spike_time` lies inside the trailing window ending at `now`
    pub(crate) fn in_window(&self, now: f64, spike_time: f64) -> bool {
        now - spike_time <= self.max_burst_duration
    }

    /// Whether a candidate starting at `first_spike` is too close to the previous burst
    pub(crate) fn debounced(&self, first_spike: f64, previous: Option<f64>) -> bool {
        previous.map_or(false, |prev| first_spike - prev <= self.min_inter_burst_interval)
    }
}
