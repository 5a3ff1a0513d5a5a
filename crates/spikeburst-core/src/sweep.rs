//! Parameter sweeps over the burst detectors
//!
//! A sweep evaluates [`analyze`] at every point of a [`SweepGrid`] and keys the
//! results by [`SweepKey`]. Keys from separate sweeps over the same grid can be
//! intersected to find parameter sets that satisfy several criteria at once.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{analyze, BurstAnalysis},
    error::*,
    events::{validate_events, ChannelKey, SpikeEvent},
    params::BurstParams,
};

/// Composite key of one burst parameter set.
///
/// Floats compare with [`f64::total_cmp`] so keys have a total order.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepKey {
    /// Spikes or channels needed for a burst
    pub num_spikes_to_burst: usize,
    /// Trailing window width
    pub max_burst_duration: f64,
    /// Debounce interval
    pub min_inter_burst_interval: f64,
}

impl SweepKey {
    /// Parameters this key stands for
    pub fn params(&self) -> BurstParams {
        BurstParams {
            num_spikes_to_burst: self.num_spikes_to_burst,
            max_burst_duration: self.max_burst_duration,
            min_inter_burst_interval: self.min_inter_burst_interval,
        }
    }
}

impl From<BurstParams> for SweepKey {
    fn from(params: BurstParams) -> Self {
        Self {
            num_spikes_to_burst: params.num_spikes_to_burst,
            max_burst_duration: params.max_burst_duration,
            min_inter_burst_interval: params.min_inter_burst_interval,
        }
    }
}

impl PartialEq for SweepKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SweepKey {}

impl PartialOrd for SweepKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.num_spikes_to_burst
            .cmp(&other.num_spikes_to_burst)
            .then_with(|| self.max_burst_duration.total_cmp(&other.max_burst_duration))
            .then_with(|| {
                self.min_inter_burst_interval
                    .total_cmp(&other.min_inter_burst_interval)
            })
    }
}

impl fmt::Display for SweepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "num={} max={} min={}",
            self.num_spikes_to_burst, self.max_burst_duration, self.min_inter_burst_interval
        )
    }
}

/// Axes of a parameter grid
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepGrid {
    /// Candidate spike/channel counts
    pub num_spikes_to_burst: Vec<usize>,
    /// Candidate window widths
    pub max_burst_duration: Vec<f64>,
    /// Candidate debounce intervals
    pub min_inter_burst_interval: Vec<f64>,
}

impl SweepGrid {
    /// Create a grid from its three axes
    pub fn new(
        num_spikes_to_burst: Vec<usize>,
        max_burst_duration: Vec<f64>,
        min_inter_burst_interval: Vec<f64>,
    ) -> Self {
        Self {
            num_spikes_to_burst,
            max_burst_duration,
            min_inter_burst_interval,
        }
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.num_spikes_to_burst.len()
            * self.max_burst_duration.len()
            * self.min_inter_burst_interval.len()
    }

    /// Whether any axis is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product of the axes, each point validated
    pub fn points(&self) -> Result<Vec<BurstParams>> {
        let mut points = Vec::with_capacity(self.len());
        for &num in &self.num_spikes_to_burst {
            for &max in &self.max_burst_duration {
                for &min in &self.min_inter_burst_interval {
                    points.push(BurstParams::new(num, max, min)?);
                }
            }
        }
        Ok(points)
    }
}

/// Run both detectors at every grid point and map each analysis with `f`.
///
/// Duplicate grid values collapse onto one key.
pub fn run_sweep<K, T, F>(
    events: &[SpikeEvent<K>],
    grid: &SweepGrid,
    f: F,
) -> Result<BTreeMap<SweepKey, T>>
where
    K: ChannelKey + Send + Sync,
    T: Send,
    F: Fn(&BurstParams, &BurstAnalysis<K>) -> T + Sync,
{
    validate_events(events)?;
    let points = grid.points()?;
    log::debug!("Sweeping {} parameter sets over {} events", points.len(), events.len());

    let evaluate = |params: &BurstParams| -> Result<(SweepKey, T)> {
        let analysis = analyze(events, *params)?;
        Ok((SweepKey::from(*params), f(params, &analysis)))
    };

    #[cfg(feature = "parallel")]
    let results: Result<Vec<(SweepKey, T)>> = points.par_iter().map(evaluate).collect();

    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<(SweepKey, T)>> = points.iter().map(evaluate).collect();

    Ok(results?.into_iter().collect())
}

/// Keys present in every map, ascending.
///
/// An empty slice yields no keys.
pub fn intersect_keys<V>(maps: &[&BTreeMap<SweepKey, V>]) -> Vec<SweepKey> {
    let Some(smallest) = maps.iter().min_by_key(|m| m.len()) else {
        return Vec::new();
    };

    smallest
        .keys()
        .filter(|key| maps.iter().all(|m| m.contains_key(key)))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> Vec<SpikeEvent<&'static str>> {
        vec![
            SpikeEvent::new(0.0, "a"),
            SpikeEvent::new(0.1, "b"),
            SpikeEvent::new(0.2, "a"),
            SpikeEvent::new(0.3, "c"),
            SpikeEvent::new(0.4, "a"),
            SpikeEvent::new(5.0, "b"),
            SpikeEvent::new(5.1, "c"),
            SpikeEvent::new(5.2, "a"),
        ]
    }

    #[test]
    fn test_key_order_is_total() {
        let a = SweepKey::from(BurstParams::new(2, 1.0, 0.0).unwrap());
        let b = SweepKey::from(BurstParams::new(2, 1.5, 0.0).unwrap());
        let c = SweepKey::from(BurstParams::new(3, 0.5, 0.0).unwrap());
        assert!(a < b && b < c);
        assert_eq!(a, SweepKey::from(a.params()));
        assert_eq!(a.to_string(), "num=2 max=1 min=0");
    }

    #[test]
    fn test_grid_points() {
        let grid = SweepGrid::new(vec![2, 3], vec![1.0, 2.0], vec![0.0, 0.5, 1.0]);
        assert_eq!(grid.len(), 12);
        let points = grid.points().unwrap();
        assert_eq!(points.len(), 12);
        assert_eq!(points[0], BurstParams::new(2, 1.0, 0.0).unwrap());
        assert_eq!(points[11], BurstParams::new(3, 2.0, 1.0).unwrap());

        let bad = SweepGrid::new(vec![2], vec![-1.0], vec![0.0]);
        assert!(bad.points().is_err());
        assert!(SweepGrid::default().is_empty());
    }

    #[test]
    fn test_run_sweep_maps_every_point() {
        let grid = SweepGrid::new(vec![2, 3], vec![0.5, 1.0], vec![0.0]);
        let results = run_sweep(&recording(), &grid, |_, analysis| {
            analysis.network.trigger_times()
        })
        .unwrap();

        assert_eq!(results.len(), 4);
        let key = SweepKey::from(BurstParams::new(3, 0.5, 0.0).unwrap());
        assert_eq!(results[&key], vec![0.3, 5.2]);
    }

    #[test]
    fn test_intersect_keys() {
        let grid = SweepGrid::new(vec![2, 3], vec![0.5, 1.0], vec![0.0, 10.0]);
        let events = recording();

        let network = run_sweep(&events, &grid, |_, a| a.network.trigger_times()).unwrap();
        let matching_network: BTreeMap<SweepKey, ()> = network
            .iter()
            .filter(|(_, times)| times.as_slice() == [0.3, 5.2])
            .map(|(k, _)| (*k, ()))
            .collect();

        let channel = run_sweep(&events, &grid, |_, a| a.channel.end_times()).unwrap();
        let matching_channel: BTreeMap<SweepKey, ()> = channel
            .iter()
            .filter(|(_, ends)| ends.get("a").map(Vec::as_slice) == Some(&[0.4][..]))
            .map(|(k, _)| (*k, ()))
            .collect();

        let both = intersect_keys(&[&matching_network, &matching_channel]);
        assert_eq!(
            both,
            vec![
                SweepKey::from(BurstParams::new(3, 0.5, 0.0).unwrap()),
                SweepKey::from(BurstParams::new(3, 1.0, 0.0).unwrap()),
            ]
        );
        assert!(intersect_keys::<()>(&[]).is_empty());
    }
}
