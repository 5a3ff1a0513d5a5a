//! Spike encoding and burst detection for multi-channel recordings
//!
//! This crate turns sampled analog signals into asynchronous up/down spike
//! trains and finds bursts in multi-channel spike data, both per channel and
//! across the network of channels. Every function is pure and synchronous;
//! reading recordings and rendering results is left to the caller.
//!
//! ```
//! use spikeburst_core::{detect_network_bursts, encode, merge_trains};
//!
//! let trains = encode(&[0.0, 1.0, 2.0], &[0.0, 2.0, 0.0], 1.0, -1.0, 0.0, None)?;
//! let events = merge_trains(vec![("up", trains.up), ("down", trains.down)]);
//! let bursts = detect_network_bursts(&events, 2, 5.0, 0.0)?;
//! assert_eq!(bursts.trigger_times(), vec![2.0]);
//! # Ok::<(), spikeburst_core::BurstError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod signal;
pub mod resample;
pub mod refractory;
pub mod encoder;
pub mod events;
pub mod params;
pub mod channel;
pub mod network;
pub mod analysis;
pub mod sweep;

// Re-export essential types
pub use error::{BurstError, Result};
pub use signal::Signal;
pub use resample::{CubicSpline, Identity, InterpolationKind, Linear, Resample};
pub use refractory::skip_refractory;
pub use encoder::{encode, EncoderParams, Polarity, SignalEncoder, SpikeTrains};
pub use events::{merge_trains, validate_events, ChannelKey, SpikeEvent};
pub use params::BurstParams;
pub use channel::{
    channel_bursts, detect_channel_bursts, ChannelBurst, ChannelBurstDetector, ChannelBurstReport,
};
pub use network::{
    detect_network_bursts, network_bursts, NetworkBurst, NetworkBurstDetector, NetworkBurstReport,
};
pub use analysis::{analyze, BurstAnalysis};
pub use sweep::{intersect_keys, run_sweep, SweepGrid, SweepKey};

/// Report format version, bumped when serialized report layouts change
pub const REPORT_VERSION: u32 = 1;
