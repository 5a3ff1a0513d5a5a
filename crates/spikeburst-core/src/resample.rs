//! Resampling strategies applied before spike encoding
//!
//! A [`Resample`] implementation turns one [`Signal`] into another. The encoder
//! only ever talks to the trait, so the interpolant can be swapped (identity,
//! piecewise-linear, natural cubic spline) without touching the threshold scan.
//!
//! All non-trivial strategies evaluate on the same uniform grid: for a signal
//! spanning `[min, max]` and an interpolation factor `f`, the grid holds
//! `round((max - min) * f)` points from `min` to `max` inclusive. Rounding is
//! half-to-even.

use core::fmt;
use core::str::FromStr;

use crate::{error::*, signal::Signal};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A resampling strategy: `resample(signal) -> signal`
pub trait Resample: Send + Sync {
    /// Produce the resampled signal
    fn resample(&self, signal: &Signal) -> Result<Signal>;

    /// Short strategy name for logs and reports
    fn name(&self) -> &'static str;
}

/// Selects a resampling strategy by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InterpolationKind {
    /// Never resample
    None,
    /// Piecewise-linear interpolant
    #[default]
    Linear,
    /// Natural cubic spline interpolant
    Cubic,
}

impl InterpolationKind {
    /// Build the strategy for an optional interpolation factor.
    ///
    /// An absent factor, or one `<= 1`, always yields [`Identity`].
    pub fn build(self, factor: Option<f64>) -> Result<Box<dyn Resample>> {
        let factor = match factor {
            None => return Ok(Box::new(Identity)),
            Some(f) if f.is_nan() => {
                return Err(BurstError::invalid_parameter(
                    "interpolation_factor",
                    f.to_string(),
                    "a number",
                ))
            }
            Some(f) if f <= 1.0 => return Ok(Box::new(Identity)),
            Some(f) => f,
        };

        Ok(match self {
            Self::None => Box::new(Identity),
            Self::Linear => Box::new(Linear::new(factor)?),
            Self::Cubic => Box::new(CubicSpline::new(factor)?),
        })
    }
}

impl fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Linear => write!(f, "linear"),
            Self::Cubic => write!(f, "cubic"),
        }
    }
}

impl FromStr for InterpolationKind {
    type Err = BurstError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "identity" => Ok(Self::None),
            "linear" => Ok(Self::Linear),
            "cubic" | "spline" => Ok(Self::Cubic),
            other => Err(BurstError::invalid_parameter(
                "interpolation",
                other,
                "one of none, linear, cubic",
            )),
        }
    }
}

/// Pass-through strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Resample for Identity {
    fn resample(&self, signal: &Signal) -> Result<Signal> {
        Ok(signal.clone())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Piecewise-linear resampling onto a uniform grid
#[derive(Debug, Clone, Copy)]
pub struct Linear {
    factor: f64,
}

impl Linear {
    /// Create a linear resampler; `factor` must be finite and `> 0`
    pub fn new(factor: f64) -> Result<Self> {
        check_factor(factor)?;
        Ok(Self { factor })
    }

    /// Interpolation factor
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Resample for Linear {
    fn resample(&self, signal: &Signal) -> Result<Signal> {
        let grid = uniform_grid(signal, self.factor, self.name())?;
        let (times, amps) = (signal.times(), signal.amplitudes());
        let values = evaluate_grid(&grid, |x| linear_at(times, amps, x));
        Signal::new(grid, values)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Natural cubic spline resampling onto a uniform grid.
///
/// Signals with fewer than three samples have no interior knots and are
/// resampled linearly.
#[derive(Debug, Clone, Copy)]
pub struct CubicSpline {
    factor: f64,
}

impl CubicSpline {
    /// Create a spline resampler; `factor` must be finite and `> 0`
    pub fn new(factor: f64) -> Result<Self> {
        check_factor(factor)?;
        Ok(Self { factor })
    }

    /// Interpolation factor
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Resample for CubicSpline {
    fn resample(&self, signal: &Signal) -> Result<Signal> {
        let grid = uniform_grid(signal, self.factor, self.name())?;
        let (times, amps) = (signal.times(), signal.amplitudes());
        let values = if times.len() < 3 {
            evaluate_grid(&grid, |x| linear_at(times, amps, x))
        } else {
            let second = natural_second_derivatives(times, amps);
            evaluate_grid(&grid, |x| spline_at(times, amps, &second, x))
        };
        Signal::new(grid, values)
    }

    fn name(&self) -> &'static str {
        "cubic"
    }
}

fn check_factor(factor: f64) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(BurstError::invalid_parameter(
            "interpolation_factor",
            factor.to_string(),
            "finite and > 0.0",
        ));
    }
    Ok(())
}

/// Uniform grid of `round((max - min) * factor)` points over `[min, max]`
fn uniform_grid(signal: &Signal, factor: f64, operation: &str) -> Result<Vec<f64>> {
    let (start, stop) = signal
        .span()
        .ok_or_else(|| BurstError::empty_input(format!("{} resampling", operation)))?;

    let count = ((stop - start) * factor).round_ties_even();
    if !count.is_finite() || count > MAX_GRID_POINTS as f64 {
        return Err(BurstError::invalid_parameter(
            "interpolation_factor",
            factor.to_string(),
            "grid size within memory limits",
        ));
    }
    let num = if count > 0.0 { count as usize } else { 0 };

    let mut grid = Vec::new();
    grid.try_reserve_exact(num).map_err(|_| {
        BurstError::invalid_parameter(
            "interpolation_factor",
            factor.to_string(),
            "grid size within memory limits",
        )
    })?;
    grid.extend(linspace(start, stop, num));

    // steps finer than the float spacing at this time offset collapse
    if let Some(i) = grid.windows(2).position(|w| w[0] >= w[1]) {
        return Err(BurstError::invalid_parameter(
            "interpolation_factor",
            factor.to_string(),
            format!("grid step representable at time {}", grid[i]),
        ));
    }

    Ok(grid)
}

/// Largest grid a `Vec<f64>` can address
const MAX_GRID_POINTS: usize = isize::MAX as usize / std::mem::size_of::<f64>();

fn linspace(start: f64, stop: f64, num: usize) -> impl Iterator<Item = f64> {
    let step = if num > 1 {
        (stop - start) / (num - 1) as f64
    } else {
        0.0
    };
    // pin the endpoint against accumulated rounding
    (0..num).map(move |i| {
        if num > 1 && i == num - 1 {
            stop
        } else {
            start + step * i as f64
        }
    })
}

fn evaluate_grid<F>(grid: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let values: Vec<f64> = grid.par_iter().map(|&x| f(x)).collect();

    #[cfg(not(feature = "parallel"))]
    let values: Vec<f64> = grid.iter().map(|&x| f(x)).collect();

    values
}

/// Index `i` such that `x` lies in `[times[i], times[i + 1]]`.
///
/// `times` must hold at least two samples and `x` must lie within the span.
fn segment(times: &[f64], x: f64) -> usize {
    let upper = times.partition_point(|&t| t <= x);
    upper.clamp(1, times.len() - 1) - 1
}

fn linear_at(times: &[f64], amps: &[f64], x: f64) -> f64 {
    if times.len() == 1 {
        return amps[0];
    }
    let i = segment(times, x);
    let (x0, x1) = (times[i], times[i + 1]);
    let (y0, y1) = (amps[i], amps[i + 1]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Second derivatives at the knots with natural boundary conditions,
/// solved with the Thomas algorithm.
fn natural_second_derivatives(times: &[f64], amps: &[f64]) -> Vec<f64> {
    let n = times.len();
    let mut second = vec![0.0; n];
    let interior = n - 2;

    let h: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();

    let mut diag = vec![0.0; interior];
    let mut upper = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];

    for k in 0..interior {
        let i = k + 1;
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        upper[k] = h[i];
        rhs[k] = 6.0 * ((amps[i + 1] - amps[i]) / h[i] - (amps[i] - amps[i - 1]) / h[i - 1]);
    }

    // forward elimination; sub-diagonal entry of row k is h[k]
    for k in 1..interior {
        let w = h[k] / diag[k - 1];
        diag[k] -= w * upper[k - 1];
        rhs[k] -= w * rhs[k - 1];
    }

    // back substitution
    for k in (0..interior).rev() {
        let next = if k + 1 < interior { second[k + 2] } else { 0.0 };
        second[k + 1] = (rhs[k] - upper[k] * next) / diag[k];
    }

    second
}

fn spline_at(times: &[f64], amps: &[f64], second: &[f64], x: f64) -> f64 {
    let i = segment(times, x);
    let (x0, x1) = (times[i], times[i + 1]);
    let h = x1 - x0;
    let (a, b) = (x1 - x, x - x0);

    second[i] * a.powi(3) / (6.0 * h)
        + second[i + 1] * b.powi(3) / (6.0 * h)
        + (amps[i] / h - second[i] * h / 6.0) * a
        + (amps[i + 1] / h - second[i + 1] * h / 6.0) * b
}
