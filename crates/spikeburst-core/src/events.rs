//! Spike events shared by the burst detectors

use core::fmt::Debug;
use core::hash::Hash;

use crate::error::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounds required of a channel identifier.
///
/// Channels need not be contiguous integers; any hashable, totally ordered
/// key works. Ordering is only used to make reports deterministic.
pub trait ChannelKey: Clone + Eq + Hash + Ord + Debug {}

impl<T> ChannelKey for T where T: Clone + Eq + Hash + Ord + Debug {}

/// A single spike on one channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpikeEvent<K> {
    /// Spike time
    pub time: f64,
    /// Channel that spiked
    pub channel: K,
}

impl<K> SpikeEvent<K> {
    /// Create a new spike event
    pub fn new(time: f64, channel: K) -> Self {
        Self { time, channel }
    }
}

impl<K> From<(f64, K)> for SpikeEvent<K> {
    fn from((time, channel): (f64, K)) -> Self {
        Self { time, channel }
    }
}

/// Check that an event sequence has finite, non-decreasing times.
///
/// Equal timestamps are allowed; their order is left as given.
pub fn validate_events<K>(events: &[SpikeEvent<K>]) -> Result<()> {
    let mut previous = f64::NEG_INFINITY;
    for (idx, event) in events.iter().enumerate() {
        check_event_time(event.time, previous, idx)?;
        previous = event.time;
    }
    Ok(())
}

/// Check one event time against the time of the event processed before it.
pub(crate) fn check_event_time(time: f64, previous: f64, idx: usize) -> Result<()> {
    if !time.is_finite() {
        return Err(BurstError::invalid_parameter(
            "event time",
            format!("{} at index {}", time, idx),
            "finite",
        ));
    }
    if time < previous {
        return Err(BurstError::invalid_parameter(
            "event time",
            format!("{} after {} at index {}", time, previous, idx),
            "non-decreasing",
        ));
    }
    Ok(())
}

/// Merge per-channel spike trains into one time-ordered event sequence.
///
/// The sort is stable: events sharing a timestamp keep the order in which the
/// channels were supplied.
pub fn merge_trains<K, I, T>(trains: I) -> Vec<SpikeEvent<K>>
where
    K: Clone,
    I: IntoIterator<Item = (K, T)>,
    T: AsRef<[f64]>,
{
    let mut events: Vec<SpikeEvent<K>> = trains
        .into_iter()
        .flat_map(|(channel, train)| {
            train
                .as_ref()
                .iter()
                .map(|&time| SpikeEvent::new(time, channel.clone()))
                .collect::<Vec<_>>()
        })
        .collect();

    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_events() {
        let ok = vec![
            SpikeEvent::new(0.0, 'a'),
            SpikeEvent::new(0.0, 'b'),
            SpikeEvent::new(1.5, 'a'),
        ];
        assert!(validate_events(&ok).is_ok());

        let backwards = vec![SpikeEvent::new(2.0, 'a'), SpikeEvent::new(1.0, 'b')];
        let err = validate_events(&backwards).unwrap_err();
        assert!(err.to_string().contains("non-decreasing"));

        let nan = vec![SpikeEvent::new(f64::NAN, 'a')];
        assert!(validate_events(&nan).is_err());
    }

    #[test]
    fn test_merge_trains_orders_by_time() {
        let merged = merge_trains(vec![("b", vec![1.0, 3.0]), ("a", vec![0.5, 2.0])]);
        let times: Vec<f64> = merged.iter().map(|e| e.time).collect();
        let channels: Vec<&str> = merged.iter().map(|e| e.channel).collect();
        assert_eq!(times, vec![0.5, 1.0, 2.0, 3.0]);
        assert_eq!(channels, vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn test_merge_trains_ties_keep_channel_order() {
        let merged = merge_trains(vec![(2u32, vec![1.0]), (1u32, vec![1.0]), (3u32, vec![0.0])]);
        let channels: Vec<u32> = merged.iter().map(|e| e.channel).collect();
        assert_eq!(channels, vec![3, 2, 1]);
    }

    #[test]
    fn test_event_from_tuple() {
        let event: SpikeEvent<&str> = (4.0, "ch1").into();
        assert_eq!(event, SpikeEvent::new(4.0, "ch1"));
    }
}
