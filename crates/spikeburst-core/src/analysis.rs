//! Combined channel and network burst analysis

use crate::{
    channel::{channel_bursts, ChannelBurstReport},
    error::*,
    events::{validate_events, ChannelKey, SpikeEvent},
    network::{network_bursts, NetworkBurstReport},
    params::BurstParams,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Both detectors' output over one event sequence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BurstAnalysis<K: Ord> {
    /// Per-channel bursts
    pub channel: ChannelBurstReport<K>,
    /// Network bursts
    pub network: NetworkBurstReport<K>,
}

/// Run the channel and network detectors over the same events.
///
/// The detectors share no state. With the `parallel` feature they run on two
/// rayon tasks; without it they run one after the other.
pub fn analyze<K>(events: &[SpikeEvent<K>], params: BurstParams) -> Result<BurstAnalysis<K>>
where
    K: ChannelKey + Send + Sync,
{
    params.validate()?;
    validate_events(events)?;

    #[cfg(feature = "parallel")]
    let (channel, network) = rayon::join(
        || channel_bursts(events, params),
        || network_bursts(events, params),
    );

    #[cfg(not(feature = "parallel"))]
    let (channel, network) = (channel_bursts(events, params), network_bursts(events, params));

    Ok(BurstAnalysis {
        channel: channel?,
        network: network?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::detect_channel_bursts;
    use crate::network::detect_network_bursts;

    #[test]
    fn test_matches_individual_detectors() {
        let events: Vec<SpikeEvent<u16>> = [
            (0.0, 1),
            (0.2, 2),
            (0.4, 1),
            (0.5, 3),
            (0.6, 1),
            (3.0, 2),
            (3.1, 2),
            (3.2, 3),
            (3.3, 2),
        ]
        .into_iter()
        .map(SpikeEvent::from)
        .collect();

        let params = BurstParams::new(3, 1.0, 0.5).unwrap();
        let analysis = analyze(&events, params).unwrap();

        assert_eq!(analysis.channel, detect_channel_bursts(&events, 3, 1.0, 0.5).unwrap());
        assert_eq!(analysis.network, detect_network_bursts(&events, 3, 1.0, 0.5).unwrap());
        assert_eq!(analysis.channel.end_times()[&1], vec![0.6]);
        assert_eq!(analysis.channel.end_times()[&2], vec![3.3]);
        assert_eq!(analysis.network.trigger_times(), vec![0.5]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let events = vec![SpikeEvent::new(1.0, 'a'), SpikeEvent::new(0.0, 'b')];
        assert!(analyze(&events, BurstParams::default()).is_err());

        let bad = BurstParams {
            max_burst_duration: -1.0,
            ..BurstParams::default()
        };
        assert!(analyze::<char>(&[], bad).is_err());
    }
}
