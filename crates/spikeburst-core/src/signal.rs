//! Sampled analog signals

use crate::error::*;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A sampled signal: strictly increasing sample times with one amplitude each.
///
/// Only constructible through [`Signal::new`], so every `Signal` in circulation
/// has already passed validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Signal {
    times: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl Signal {
    /// Create a signal, checking lengths, finiteness and time ordering
    pub fn new(times: Vec<f64>, amplitudes: Vec<f64>) -> Result<Self> {
        if times.len() != amplitudes.len() {
            return Err(BurstError::invalid_parameter(
                "amplitudes",
                format!("{} samples (with {} times)", amplitudes.len(), times.len()),
                "same length as times",
            ));
        }

        if let Some(idx) = times.iter().position(|t| !t.is_finite()) {
            return Err(BurstError::invalid_parameter(
                "times",
                format!("{} at index {}", times[idx], idx),
                "finite",
            ));
        }

        if let Some(idx) = amplitudes.iter().position(|a| !a.is_finite()) {
            return Err(BurstError::invalid_parameter(
                "amplitudes",
                format!("{} at index {}", amplitudes[idx], idx),
                "finite",
            ));
        }

        if let Some(idx) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(BurstError::invalid_parameter(
                "times",
                format!("{} followed by {} at index {}", times[idx], times[idx + 1], idx + 1),
                "strictly increasing",
            ));
        }

        Ok(Self { times, amplitudes })
    }

    /// An empty signal
    pub fn empty() -> Self {
        Self {
            times: Vec::new(),
            amplitudes: Vec::new(),
        }
    }

    /// Sample times
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample amplitudes
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the signal has no samples
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First and last sample time
    pub fn span(&self) -> Option<(f64, f64)> {
        match (self.times.first(), self.times.last()) {
            (Some(&first), Some(&last)) => Some((first, last)),
            _ => None,
        }
    }

    /// Iterate `(time, amplitude)` pairs
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.amplitudes.iter().copied())
    }

    /// Split back into `(times, amplitudes)`
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.times, self.amplitudes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_signal() {
        let signal = Signal::new(vec![0.0, 0.5, 1.0], vec![1.0, -1.0, 2.0]).unwrap();
        assert_eq!(signal.len(), 3);
        assert_eq!(signal.span(), Some((0.0, 1.0)));
        assert_eq!(signal.samples().nth(1), Some((0.5, -1.0)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = Signal::new(vec![0.0, 1.0], vec![1.0]).unwrap_err();
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn test_non_monotonic_rejected() {
        assert!(Signal::new(vec![0.0, 1.0, 1.0], vec![0.0; 3]).is_err());
        assert!(Signal::new(vec![0.0, 2.0, 1.0], vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Signal::new(vec![0.0, f64::NAN], vec![0.0; 2]).is_err());
        assert!(Signal::new(vec![0.0, 1.0], vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_empty_signal() {
        let signal = Signal::new(Vec::new(), Vec::new()).unwrap();
        assert!(signal.is_empty());
        assert_eq!(signal.span(), None);
        assert_eq!(signal, Signal::empty());
    }
}
