//! Network-wide burst detection
//!
//! A network burst occurs when enough distinct channels have spiked inside one
//! trailing window. Only the most recent spike time of each channel counts, so
//! a channel spiking repeatedly contributes once.

use std::collections::{BTreeMap, HashMap};

use crate::{
    error::*,
    events::{check_event_time, validate_events, ChannelKey, SpikeEvent},
    params::BurstParams,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An accepted network burst
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkBurst<K: Ord> {
    /// Latest contributing spike time
    pub trigger_time: f64,
    /// Participating channels with their most recent spike time
    pub channels: BTreeMap<K, f64>,
}

impl<K: ChannelKey> NetworkBurst<K> {
    /// Participating channel ids in ascending order
    pub fn channel_ids(&self) -> Vec<K> {
        self.channels.keys().cloned().collect()
    }

    /// Number of participating channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Earliest contributing spike time
    pub fn first_spike_time(&self) -> f64 {
        self.channels
            .values()
            .copied()
            .fold(self.trigger_time, f64::min)
    }
}

/// Accepted network bursts in acceptance order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NetworkBurstReport<K: Ord> {
    bursts: Vec<NetworkBurst<K>>,
}

impl<K: Ord> Default for NetworkBurstReport<K> {
    fn default() -> Self {
        Self { bursts: Vec::new() }
    }
}

impl<K: ChannelKey> NetworkBurstReport<K> {
    /// All bursts
    pub fn bursts(&self) -> &[NetworkBurst<K>] {
        &self.bursts
    }

    /// Iterate bursts in acceptance order
    pub fn iter(&self) -> std::slice::Iter<'_, NetworkBurst<K>> {
        self.bursts.iter()
    }

    /// Trigger time of every burst
    pub fn trigger_times(&self) -> Vec<f64> {
        self.bursts.iter().map(|b| b.trigger_time).collect()
    }

    /// `(trigger_time, channel_ids)` per burst
    pub fn detailed(&self) -> Vec<(f64, Vec<K>)> {
        self.bursts
            .iter()
            .map(|b| (b.trigger_time, b.channel_ids()))
            .collect()
    }

    /// Number of bursts
    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    /// Whether no burst was accepted
    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }
}

/// Streaming network burst detector
#[derive(Debug)]
pub struct NetworkBurstDetector<K: ChannelKey> {
    params: BurstParams,
    active: HashMap<K, f64>,
    last_trigger: Option<f64>,
    report: NetworkBurstReport<K>,
    last_time: f64,
    processed: usize,
    rejected: usize,
}

impl<K: ChannelKey> NetworkBurstDetector<K> {
    /// Create a detector with validated parameters
    pub fn new(params: BurstParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            active: HashMap::new(),
            last_trigger: None,
            report: NetworkBurstReport::default(),
            last_time: f64::NEG_INFINITY,
            processed: 0,
            rejected: 0,
        })
    }

    /// Detector parameters
    pub fn params(&self) -> &BurstParams {
        &self.params
    }

    /// Channels currently inside the window with their latest spike time
    pub fn active_channels(&self) -> &HashMap<K, f64> {
        &self.active
    }

    /// Trigger time of the last accepted burst
    pub fn last_trigger(&self) -> Option<f64> {
        self.last_trigger
    }

    /// Number of events processed so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Candidates rejected by the inter-burst interval
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Process one event, returning the network burst it completes, if any
    pub fn process(&mut self, event: &SpikeEvent<K>) -> Result<Option<NetworkBurst<K>>> {
        check_event_time(event.time, self.last_time, self.processed)?;
        self.last_time = event.time;
        self.processed += 1;

        let now = event.time;
        let params = self.params;
        self.active.retain(|_, &mut t| params.in_window(now, t));
        self.active.insert(event.channel.clone(), now);

        if self.active.len() < params.num_spikes_to_burst {
            return Ok(None);
        }

        let first = self.active.values().copied().fold(now, f64::min);
        if params.debounced(first, self.last_trigger) {
            self.rejected += 1;
            log::trace!(
                "Network candidate of {} channels at {} too close to previous trigger, rejected",
                self.active.len(),
                now
            );
            return Ok(None);
        }

        let trigger_time = self.active.values().copied().fold(now, f64::max);
        let burst = NetworkBurst {
            trigger_time,
            channels: self.active.drain().collect(),
        };
        self.last_trigger = Some(trigger_time);
        log::trace!(
            "Network burst of {} channels accepted at {}",
            burst.channel_count(),
            trigger_time
        );

        self.report.bursts.push(burst.clone());
        Ok(Some(burst))
    }

    /// Finish the pass and return every accepted burst
    pub fn finish(self) -> NetworkBurstReport<K> {
        log::debug!(
            "Network bursts: {} accepted, {} rejected by debounce, {} events",
            self.report.len(),
            self.rejected,
            self.processed
        );
        self.report
    }
}

/// Detect network bursts over a time-ordered event sequence
pub fn detect_network_bursts<K: ChannelKey>(
    events: &[SpikeEvent<K>],
    num_spikes_to_burst: usize,
    max_burst_duration: f64,
    min_inter_burst_interval: f64,
) -> Result<NetworkBurstReport<K>> {
    let params = BurstParams::new(num_spikes_to_burst, max_burst_duration, min_inter_burst_interval)?;
    network_bursts(events, params)
}

/// Detect network bursts with prepared parameters
pub fn network_bursts<K: ChannelKey>(
    events: &[SpikeEvent<K>],
    params: BurstParams,
) -> Result<NetworkBurstReport<K>> {
    validate_events(events)?;
    let mut detector = NetworkBurstDetector::new(params)?;
    for event in events {
        detector.process(event)?;
    }
    Ok(detector.finish())
}
