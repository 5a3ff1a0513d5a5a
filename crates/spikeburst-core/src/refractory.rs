//! Refractory skipping over a sorted time axis

/// Index of the first sample at or beyond `times[idx] + refractory_period`.
///
/// Returns the smallest `j > idx` with `times[j] >= times[idx] + refractory_period`,
/// or `times.len()` when no such sample exists (the scan is over). `times` must be
/// sorted ascending.
pub fn skip_refractory(times: &[f64], idx: usize, refractory_period: f64) -> usize {
    if idx >= times.len() {
        return times.len();
    }

    let target = times[idx] + refractory_period;
    let tail = &times[idx + 1..];
    idx + 1 + tail.partition_point(|&t| t < target)
}
