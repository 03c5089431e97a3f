//! Piecewise constant and piecewise linear densities over explicit breakpoints.
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use super::{ensure, rejected, unit};
use crate::error::{Error, Result};

/// Sub-intervals per segment for numerical moments of piecewise linear densities.
const SIMPSON_STEPS: usize = 64;

fn check_breakpoints(distribution: &str, intervals: &[f64]) -> Result<()> {
    ensure(intervals.len() >= 2, || {
        format!("For {distribution}, 'intervals' needs at least 2 breakpoints")
    })?;
    if intervals.iter().any(|x| !x.is_finite()) {
        return Err(Error::InvalidRange(format!(
            "For {distribution}, 'intervals' must be finite"
        )));
    }
    ensure(intervals.windows(2).all(|w| w[0] < w[1]), || {
        format!("For {distribution}, 'intervals' must be strictly increasing")
    })
}

fn check_densities(distribution: &str, densities: &[f64]) -> Result<()> {
    ensure(densities.iter().all(|d| d.is_finite() && *d >= 0.0), || {
        format!("For {distribution}, 'densities' must be finite and non-negative")
    })
}

/// Segment chooser over per-segment masses, with their total.
fn segment_index(distribution: &str, masses: &[f64]) -> Result<(WeightedIndex<f64>, f64)> {
    let total: f64 = masses.iter().sum();
    ensure(total > 0.0 && total.is_finite(), || {
        format!("For {distribution}, the total mass must be greater than 0")
    })?;
    let index = WeightedIndex::new(masses).map_err(|e| rejected(distribution, e))?;
    Ok((index, total))
}

/// Density constant on each `[x_i, x_{i+1})`.
#[derive(Clone, Debug)]
pub struct PiecewiseConstant {
    intervals: Vec<f64>,
    densities: Vec<f64>,
    segments: WeightedIndex<f64>,
    total: f64,
}

impl PiecewiseConstant {
    pub fn new(intervals: &[f64], densities: &[f64]) -> Result<Self> {
        check_breakpoints("piecewise_constant", intervals)?;
        ensure(densities.len() + 1 == intervals.len(), || {
            let (expected, got) = (intervals.len() - 1, densities.len());
            format!("For piecewise_constant, 'densities' needs {expected} entries (got {got})")
        })?;
        check_densities("piecewise_constant", densities)?;
        let masses: Vec<f64> = intervals
            .windows(2)
            .zip(densities)
            .map(|(w, d)| (w[1] - w[0]) * d)
            .collect();
        let (segments, total) = segment_index("piecewise_constant", &masses)?;
        Ok(Self {
            intervals: intervals.to_vec(),
            densities: densities.to_vec(),
            segments,
            total,
        })
    }

    pub fn support(&self) -> (f64, f64) {
        (self.intervals[0], self.intervals[self.intervals.len() - 1])
    }

    pub(crate) fn sample(&self, rng: &mut dyn Rng) -> f64 {
        let i: usize = self.segments.sample(rng);
        let (x0, x1) = (self.intervals[i], self.intervals[i + 1]);
        x0 + (x1 - x0) * unit(rng)
    }

    fn raw_moment(&self, k: i32) -> f64 {
        self.intervals
            .windows(2)
            .zip(&self.densities)
            .map(|(w, d)| d * (w[1].powi(k + 1) - w[0].powi(k + 1)) / f64::from(k + 1))
            .sum::<f64>()
            / self.total
    }

    pub(crate) fn mean(&self) -> f64 {
        self.raw_moment(1)
    }

    pub(crate) fn variance(&self) -> f64 {
        let mean = self.mean();
        (self.raw_moment(2) - mean * mean).max(0.0)
    }
}

/// Density interpolated linearly between `(x_i, d_i)` breakpoints.
#[derive(Clone, Debug)]
pub struct PiecewiseLinear {
    intervals: Vec<f64>,
    densities: Vec<f64>,
    segments: WeightedIndex<f64>,
    total: f64,
}

impl PiecewiseLinear {
    pub fn new(intervals: &[f64], densities: &[f64]) -> Result<Self> {
        check_breakpoints("piecewise_linear", intervals)?;
        ensure(densities.len() == intervals.len(), || {
            let (expected, got) = (intervals.len(), densities.len());
            format!("For piecewise_linear, 'densities' needs {expected} entries (got {got})")
        })?;
        check_densities("piecewise_linear", densities)?;
        let masses: Vec<f64> = intervals
            .windows(2)
            .zip(densities.windows(2))
            .map(|(x, d)| 0.5 * (x[1] - x[0]) * (d[0] + d[1]))
            .collect();
        let (segments, total) = segment_index("piecewise_linear", &masses)?;
        Ok(Self {
            intervals: intervals.to_vec(),
            densities: densities.to_vec(),
            segments,
            total,
        })
    }

    pub fn support(&self) -> (f64, f64) {
        (self.intervals[0], self.intervals[self.intervals.len() - 1])
    }

    pub(crate) fn sample(&self, rng: &mut dyn Rng) -> f64 {
        let i: usize = self.segments.sample(rng);
        let (x0, x1) = (self.intervals[i], self.intervals[i + 1]);
        let (d0, d1) = (self.densities[i], self.densities[i + 1]);
        let v = unit(rng);
        let slope = d1 - d0;
        // Invert the segment CDF d0*t + slope*t^2/2 = v*(d0 + d1)/2 for t in [0, 1].
        let t = if slope.abs() <= 1e-12 * d0.max(d1) {
            v
        } else {
            ((d0 * d0 + v * (d1 * d1 - d0 * d0)).max(0.0).sqrt() - d0) / slope
        };
        x0 + (x1 - x0) * t.clamp(0.0, 1.0)
    }

    fn density_at(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.intervals[i], self.intervals[i + 1]);
        let (d0, d1) = (self.densities[i], self.densities[i + 1]);
        d0 + (d1 - d0) * (x - x0) / (x1 - x0)
    }

    /// `E[X^k]` by composite Simpson's rule over every segment.
    fn raw_moment(&self, k: i32) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.intervals.len() - 1 {
            let (x0, x1) = (self.intervals[i], self.intervals[i + 1]);
            let h = (x1 - x0) / SIMPSON_STEPS as f64;
            let f = |x: f64| x.powi(k) * self.density_at(i, x);
            let mut acc = f(x0) + f(x1);
            for j in 1..SIMPSON_STEPS {
                let w = if j % 2 == 1 { 4.0 } else { 2.0 };
                acc += w * f(x0 + j as f64 * h);
            }
            sum += acc * h / 3.0;
        }
        sum / self.total
    }

    pub(crate) fn mean(&self) -> f64 {
        self.raw_moment(1)
    }

    pub(crate) fn variance(&self) -> f64 {
        let mean = self.mean();
        (self.raw_moment(2) - mean * mean).max(0.0)
    }
}
