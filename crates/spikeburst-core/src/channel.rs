//! Per-channel burst detection
//!
//! Each channel keeps a rolling window of its recent spike times. A burst is
//! accepted on a channel once its window holds `num_spikes_to_burst` spikes,
//! provided the oldest of them comes more than `min_inter_burst_interval` after
//! the end of that channel's previous accepted burst. Acceptance empties the
//! window, so two bursts never share a spike.
//!
//! Windows are pruned against the time of the event being processed, and every
//! channel's window is pruned on every event, not only the window of the
//! channel that spiked. All windows therefore stay aligned to the latest event
//! seen anywhere in the recording.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::{
    error::*,
    events::{check_event_time, validate_events, ChannelKey, SpikeEvent},
    params::BurstParams,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An accepted burst on one channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelBurst<K> {
    /// Channel the burst occurred on
    pub channel: K,
    /// Constituent spike times, ascending
    pub spikes: Vec<f64>,
    /// Time of the spike that completed the burst
    pub end_time: f64,
}

impl<K> ChannelBurst<K> {
    /// Time of the first constituent spike
    pub fn start_time(&self) -> f64 {
        self.spikes.first().copied().unwrap_or(self.end_time)
    }

    /// Number of constituent spikes
    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    /// Whether the burst has no spikes (never true for detector output)
    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    /// Time from first to last spike
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time()
    }
}

/// Accepted channel bursts, grouped by channel in ascending channel order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ChannelBurstReport<K: Ord> {
    bursts: BTreeMap<K, Vec<ChannelBurst<K>>>,
}

impl<K: Ord> Default for ChannelBurstReport<K> {
    fn default() -> Self {
        Self {
            bursts: BTreeMap::new(),
        }
    }
}

impl<K: ChannelKey> ChannelBurstReport<K> {
    /// Bursts accepted on `channel`, oldest first
    pub fn bursts(&self, channel: &K) -> &[ChannelBurst<K>] {
        self.bursts.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Channels with at least one burst
    pub fn channels(&self) -> impl Iterator<Item = &K> {
        self.bursts.keys()
    }

    /// Iterate `(channel, bursts)` in channel order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[ChannelBurst<K>])> {
        self.bursts.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Terminating time of every burst, per channel
    pub fn end_times(&self) -> BTreeMap<K, Vec<f64>> {
        self.bursts
            .iter()
            .map(|(k, bursts)| (k.clone(), bursts.iter().map(|b| b.end_time).collect()))
            .collect()
    }

    /// Constituent spike times of every burst, per channel
    pub fn detailed(&self) -> BTreeMap<K, Vec<Vec<f64>>> {
        self.bursts
            .iter()
            .map(|(k, bursts)| (k.clone(), bursts.iter().map(|b| b.spikes.clone()).collect()))
            .collect()
    }

    /// Total number of bursts over all channels
    pub fn total(&self) -> usize {
        self.bursts.values().map(Vec::len).sum()
    }

    /// Whether no burst was accepted
    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    fn push(&mut self, burst: ChannelBurst<K>) {
        self.bursts.entry(burst.channel.clone()).or_default().push(burst);
    }
}

/// Streaming channel burst detector.
///
/// Feed events in time order through [`process`](Self::process); collect the
/// result with [`finish`](Self::finish). One detector instance covers one pass
/// over one recording.
#[derive(Debug)]
pub struct ChannelBurstDetector<K: ChannelKey> {
    params: BurstParams,
    windows: HashMap<K, VecDeque<f64>>,
    last_end: HashMap<K, f64>,
    report: ChannelBurstReport<K>,
    last_time: f64,
    processed: usize,
    rejected: usize,
}

impl<K: ChannelKey> ChannelBurstDetector<K> {
    /// Create a detector with validated parameters
    pub fn new(params: BurstParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            windows: HashMap::new(),
            last_end: HashMap::new(),
            report: ChannelBurstReport::default(),
            last_time: f64::NEG_INFINITY,
            processed: 0,
            rejected: 0,
        })
    }

    /// Detector parameters
    pub fn params(&self) -> &BurstParams {
        &self.params
    }

    /// Pending spikes of `channel` (pruned as of the last processed event)
    pub fn window(&self, channel: &K) -> Option<&VecDeque<f64>> {
        self.windows.get(channel)
    }

    /// Number of events processed so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Candidates rejected by the inter-burst interval
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Process one event, returning the burst it completes, if any.
    ///
    /// Non-finite or decreasing times are rejected before any state changes.
    pub fn process(&mut self, event: &SpikeEvent<K>) -> Result<Option<ChannelBurst<K>>> {
        check_event_time(event.time, self.last_time, self.processed)?;
        self.last_time = event.time;
        self.processed += 1;

        let now = event.time;
        self.windows
            .entry(event.channel.clone())
            .or_default()
            .push_back(now);

        let params = self.params;
        for window in self.windows.values_mut() {
            while let Some(&oldest) = window.front() {
                if params.in_window(now, oldest) {
                    break;
                }
                window.pop_front();
            }
        }

        let window = match self.windows.get_mut(&event.channel) {
            Some(window) if window.len() >= params.num_spikes_to_burst => window,
            _ => return Ok(None),
        };

        let first = window.front().copied().unwrap_or(now);
        let previous = self.last_end.get(&event.channel).copied();
        if params.debounced(first, previous) {
            self.rejected += 1;
            log::trace!(
                "Channel {:?}: candidate at {} starts {} after previous burst, rejected",
                event.channel,
                now,
                first - previous.unwrap_or(first)
            );
            return Ok(None);
        }

        let burst = ChannelBurst {
            channel: event.channel.clone(),
            spikes: window.drain(..).collect(),
            end_time: now,
        };
        self.last_end.insert(event.channel.clone(), now);
        log::trace!(
            "Channel {:?}: burst of {} spikes accepted at {}",
            burst.channel,
            burst.len(),
            now
        );

        self.report.push(burst.clone());
        Ok(Some(burst))
    }

    /// Finish the pass and return every accepted burst
    pub fn finish(self) -> ChannelBurstReport<K> {
        log::debug!(
            "Channel bursts: {} accepted, {} rejected by debounce, {} events",
            self.report.total(),
            self.rejected,
            self.processed
        );
        self.report
    }
}

/// Detect per-channel bursts over a time-ordered event sequence
pub fn detect_channel_bursts<K: ChannelKey>(
    events: &[SpikeEvent<K>],
    num_spikes_to_burst: usize,
    max_burst_duration: f64,
    min_inter_burst_interval: f64,
) -> Result<ChannelBurstReport<K>> {
    let params = BurstParams::new(num_spikes_to_burst, max_burst_duration, min_inter_burst_interval)?;
    channel_bursts(events, params)
}

/// Detect per-channel bursts with prepared parameters
pub fn channel_bursts<K: ChannelKey>(
    events: &[SpikeEvent<K>],
    params: BurstParams,
) -> Result<ChannelBurstReport<K>> {
    validate_events(events)?;
    let mut detector = ChannelBurstDetector::new(params)?;
    for event in events {
        detector.process(event)?;
    }
    Ok(detector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(items: &[(f64, &'static str)]) -> Vec<SpikeEvent<&'static str>> {
        items.iter().map(|&(t, c)| SpikeEvent::new(t, c)).collect()
    }

    #[test]
    fn test_single_burst() {
        let evs = events(&[(0.0, "a"), (1.0, "a"), (2.0, "a")]);
        let report = detect_channel_bursts(&evs, 3, 5.0, 0.0).unwrap();
        let bursts = report.bursts(&"a");
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].spikes, vec![0.0, 1.0, 2.0]);
        assert_eq!(bursts[0].end_time, 2.0);
        assert_eq!(bursts[0].start_time(), 0.0);
        assert_eq!(report.end_times()[&"a"], vec![2.0]);
    }

    #[test]
    fn test_debounce_rejects_then_recovers() {
        let evs = events(&[
            (0.0, "a"),
            (1.0, "a"),
            (2.0, "a"),
            (3.0, "a"),
            (7.0, "a"),
            (12.0, "a"),
            (20.0, "a"),
        ]);
        let report = detect_channel_bursts(&evs, 2, 10.0, 5.0).unwrap();
        let detailed = report.detailed();
        // [2, 3] is rejected (2 - 1 <= 5) and keeps accumulating until its
        // oldest surviving spike is far enough from the first burst's end
        assert_eq!(detailed[&"a"], vec![vec![0.0, 1.0], vec![12.0, 20.0]]);
    }

    #[test]
    fn test_rejected_window_keeps_accumulating() {
        let params = BurstParams::new(2, 10.0, 5.0).unwrap();
        let mut detector = ChannelBurstDetector::new(params).unwrap();
        for t in [0.0, 1.0, 2.0, 3.0] {
            detector.process(&SpikeEvent::new(t, 'a')).unwrap();
        }
        assert_eq!(detector.rejected(), 1);
        let window: Vec<f64> = detector.window(&'a').unwrap().iter().copied().collect();
        assert_eq!(window, vec![2.0, 3.0]);
    }

    #[test]
    fn test_channels_are_independent() {
        let evs = events(&[
            (0.0, "a"),
            (0.5, "b"),
            (1.0, "a"),
            (1.5, "b"),
            (2.0, "c"),
        ]);
        let report = detect_channel_bursts(&evs, 2, 5.0, 0.0).unwrap();
        assert_eq!(report.bursts(&"a")[0].spikes, vec![0.0, 1.0]);
        assert_eq!(report.bursts(&"b")[0].spikes, vec![0.5, 1.5]);
        assert!(report.bursts(&"c").is_empty());
        assert_eq!(report.total(), 2);
        assert_eq!(report.channels().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_other_channel_events_prune_every_window() {
        let params = BurstParams::new(3, 5.0, 0.0).unwrap();
        let mut detector = ChannelBurstDetector::new(params).unwrap();
        detector.process(&SpikeEvent::new(0.0, "a")).unwrap();
        detector.process(&SpikeEvent::new(1.0, "a")).unwrap();
        assert_eq!(detector.window(&"a").unwrap().len(), 2);

        // An event on "b" at t=10 ages out everything "a" had pending
        detector.process(&SpikeEvent::new(10.0, "b")).unwrap();
        assert!(detector.window(&"a").unwrap().is_empty());
        assert_eq!(detector.window(&"b").unwrap().len(), 1);
    }

    #[test]
    fn test_window_drops_old_spikes() {
        let evs = events(&[(0.0, "a"), (1.0, "a"), (7.0, "a"), (8.0, "a")]);
        let report = detect_channel_bursts(&evs, 3, 5.0, 0.0).unwrap();
        assert!(report.is_empty());

        let evs = events(&[(0.0, "a"), (1.0, "a"), (5.0, "a")]);
        let report = detect_channel_bursts(&evs, 3, 5.0, 0.0).unwrap();
        assert_eq!(report.total(), 1);
    }

    #[test]
    fn test_single_spike_bursts() {
        let evs = events(&[(0.0, "a"), (1.0, "a"), (2.0, "a"), (5.0, "a")]);
        let report = detect_channel_bursts(&evs, 1, 0.0, 0.0).unwrap();
        assert_eq!(report.end_times()[&"a"], vec![0.0, 1.0, 2.0, 5.0]);

        let report = detect_channel_bursts(&evs, 0, 0.0, 1.5).unwrap();
        assert_eq!(report.end_times()[&"a"], vec![0.0, 2.0, 5.0]);
    }

    #[test]
    fn test_zero_duration_needs_shared_timestamp() {
        let evs = events(&[(0.0, "a"), (1.0, "a"), (1.0, "a"), (2.0, "a")]);
        let report = detect_channel_bursts(&evs, 2, 0.0, 0.0).unwrap();
        assert_eq!(report.detailed()[&"a"], vec![vec![1.0, 1.0]]);
    }

    #[test]
    fn test_invalid_input_fails_before_mutation() {
        let params = BurstParams::new(2, 5.0, 0.0).unwrap();
        let mut detector = ChannelBurstDetector::new(params).unwrap();
        detector.process(&SpikeEvent::new(3.0, "a")).unwrap();
        assert!(detector.process(&SpikeEvent::new(2.0, "a")).is_err());
        assert!(detector.process(&SpikeEvent::new(f64::NAN, "a")).is_err());
        assert_eq!(detector.processed(), 1);
        assert_eq!(detector.window(&"a").unwrap().len(), 1);

        let evs = events(&[(1.0, "a"), (0.0, "a")]);
        assert!(detect_channel_bursts(&evs, 2, 5.0, 0.0).is_err());
        assert!(detect_channel_bursts(&events(&[]), 2, -5.0, 0.0).is_err());
    }

    #[test]
    fn test_integer_channel_ids() {
        let evs: Vec<SpikeEvent<u32>> = vec![
            SpikeEvent::new(0.0, 42),
            SpikeEvent::new(0.1, 7),
            SpikeEvent::new(0.2, 42),
        ];
        let report = detect_channel_bursts(&evs, 2, 1.0, 0.0).unwrap();
        assert_eq!(report.end_times()[&42], vec![0.2]);
    }
}
