//! Integer-valued distributions.
use rand::distr::weighted::WeightedIndex;
use rand::distr::{Bernoulli, Distribution, Uniform};
use rand::Rng;
use rand_distr::{Binomial, Gamma, Geometric, Poisson};

use super::{ensure, rejected, Sampler};
use crate::descriptor::{ParameterSet, PixelType};
use crate::error::{Error, Result};

fn probability(distribution: &str, name: &str, p: f64, open_low: bool) -> Result<f64> {
    let ok = if open_low {
        p > 0.0 && p <= 1.0
    } else {
        (0.0..=1.0).contains(&p)
    };
    ensure(ok, || {
        let range = if open_low { "(0, 1]" } else { "[0, 1]" };
        format!("For {distribution}, '{name}' must lie in {range} (got {p})")
    })?;
    Ok(p)
}

impl Sampler {
    pub fn uniform_integer(a: i128, b: i128) -> Result<Self> {
        ensure(a <= b, || {
            format!("For uniform_integer, 'a' must not be greater than 'b' (a = {a}, b = {b}).")
        })?;
        let dist = Uniform::new_inclusive(a, b).map_err(|e| rejected("uniform_integer", e))?;
        Ok(Sampler::UniformInteger { a, b, dist })
    }

    pub fn bernoulli(p: f64) -> Result<Self> {
        let p = probability("bernoulli", "p", p, false)?;
        let dist = Bernoulli::new(p).map_err(|e| rejected("bernoulli", e))?;
        Ok(Sampler::Bernoulli { p, dist })
    }

    /// Successes in `t` trials.
    pub fn binomial(t: i128, p: f64) -> Result<Self> {
        ensure(t >= 0, || format!("For binomial, 't' must not be negative (got {t})"))?;
        let p = probability("binomial", "p", p, false)?;
        let trials = u64::try_from(t).map_err(|_| {
            Error::InvalidRange(format!("For binomial, 't' must not exceed {} (got {t})", u64::MAX))
        })?;
        let dist = Binomial::new(trials, p).map_err(|e| rejected("binomial", e))?;
        Ok(Sampler::Binomial { t, p, dist })
    }

    /// Failures before the `k`-th success.
    pub fn negative_binomial(k: i128, p: f64) -> Result<Self> {
        ensure(k > 0, || format!("For negative_binomial, 'k' must be greater than 0 (got {k})"))?;
        let p = probability("negative_binomial", "p", p, true)?;
        let mixing = if p < 1.0 {
            let gamma = Gamma::new(k as f64, (1.0 - p) / p)
                .map_err(|e| rejected("negative_binomial", e))?;
            Some(gamma)
        } else {
            None
        };
        Ok(Sampler::NegativeBinomial { k, p, mixing })
    }

    /// Failures before the first success.
    pub fn geometric(p: f64) -> Result<Self> {
        let p = probability("geometric", "p", p, true)?;
        let dist = Geometric::new(p).map_err(|e| rejected("geometric", e))?;
        Ok(Sampler::Geometric { p, dist })
    }

    pub fn poisson(mean: f64) -> Result<Self> {
        ensure(mean > 0.0 && mean.is_finite(), || {
            format!("For poisson, 'mean' must be greater than 0 (got {mean})")
        })?;
        let dist = Poisson::new(mean).map_err(|e| rejected("poisson", e))?;
        Ok(Sampler::Poisson { mean, dist })
    }
}

pub(crate) fn build_uniform_integer(
    params: &ParameterSet,
    _pixel_type: PixelType,
) -> Result<Sampler> {
    Sampler::uniform_integer(params.integer("a")?, params.integer("b")?)
}

pub(crate) fn build_bernoulli(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::bernoulli(params.real("p")?)
}

pub(crate) fn build_binomial(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::binomial(params.integer("t")?, params.real("p")?)
}

pub(crate) fn build_negative_binomial(
    params: &ParameterSet,
    _pixel_type: PixelType,
) -> Result<Sampler> {
    Sampler::negative_binomial(params.integer("k")?, params.real("p")?)
}

pub(crate) fn build_geometric(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::geometric(params.real("p")?)
}

pub(crate) fn build_poisson(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::poisson(params.real("mean")?)
}

pub(crate) fn build_discrete(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Discrete::new(params.list("weights")?).map(Sampler::Discrete)
}

/// Poisson count whose mean is drawn from `mixing`; `None` always yields zero.
pub(crate) fn negative_binomial(rng: &mut dyn Rng, mixing: Option<&Gamma<f64>>) -> i128 {
    let Some(mixing) = mixing else {
        return 0;
    };
    let lambda: f64 = mixing.sample(rng);
    if lambda <= 0.0 {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(poisson) => {
            let count: f64 = poisson.sample(rng);
            count as i128
        }
        // Beyond the largest Poisson mean rand_distr accepts, the relative spread of the
        // count is below 1e-9.
        Err(_) => lambda as i128,
    }
}

/// Index-valued distribution with probabilities proportional to `weights`.
#[derive(Clone, Debug)]
pub struct Discrete {
    probabilities: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl Discrete {
    pub fn new(weights: &[f64]) -> Result<Self> {
        ensure(!weights.is_empty(), || {
            "For discrete, 'weights' must not be empty".to_owned()
        })?;
        if let Some((i, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(Error::InvalidRange(format!(
                "For discrete, weights must be finite and non-negative (weights[{i}] = {w})"
            )));
        }
        let total: f64 = weights.iter().sum();
        ensure(total > 0.0 && total.is_finite(), || {
            "For discrete, the sum of 'weights' must be greater than 0".to_owned()
        })?;
        let index = WeightedIndex::new(weights).map_err(|e| rejected("discrete", e))?;
        Ok(Self {
            probabilities: weights.iter().map(|w| w / total).collect(),
            index,
        })
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Probability of category `i`.
    pub fn probability(&self, i: usize) -> f64 {
        self.probabilities[i]
    }

    pub(crate) fn sample(&self, rng: &mut dyn Rng) -> i128 {
        let i: usize = self.index.sample(rng);
        i as i128
    }

    pub(crate) fn mean(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| i as f64 * p)
            .sum()
    }

    pub(crate) fn variance(&self) -> f64 {
        let mean = self.mean();
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64 - mean).powi(2) * p)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamValue;
    use crate::distribution::SampleValue;
    use crate::error::ErrorKind;
    use crate::stream::PixelStream;

    fn draws(sampler: &Sampler, n: u64) -> Vec<i128> {
        (0..n)
            .map(|i| match sampler.sample(&mut PixelStream::new(2024, i)) {
                SampleValue::Integer(v) => v,
                other => panic!("{} produced {other:?}", sampler.name()),
            })
            .collect()
    }

    #[test]
    fn uniform_integer_stays_in_range_and_hits_both_ends() {
        let values = draws(&Sampler::uniform_integer(-100, 100).unwrap(), 5_000);
        assert!(values.iter().all(|v| (-100..=100).contains(v)));
        assert!(values.contains(&-100));
        assert!(values.contains(&100));
    }

    #[test]
    fn uniform_integer_full_u64_span() {
        let values = draws(&Sampler::uniform_integer(0, u64::MAX as i128).unwrap(), 100);
        assert!(values.iter().all(|v| (0..=u64::MAX as i128).contains(v)));
        let (lo, hi) = (i64::MIN as i128, i64::MAX as i128);
        let values = draws(&Sampler::uniform_integer(lo, hi).unwrap(), 100);
        assert!(values.iter().all(|v| (lo..=hi).contains(v)));
    }

    #[test]
    fn degenerate_uniform_integer() {
        let values = draws(&Sampler::uniform_integer(7, 7).unwrap(), 10);
        assert!(values.iter().all(|&v| v == 7));
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let params = ParameterSet::new()
            .with("a", ParamValue::Integer(100))
            .with("b", ParamValue::Integer(-100));
        let err = build_uniform_integer(&params, PixelType::Int16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert!(err.to_string().contains("'a' must not be greater than 'b'"));
    }

    #[test]
    fn binomial_handles_large_trial_counts() {
        let values = draws(&Sampler::binomial(1_000_000, 0.3).unwrap(), 4_000);
        assert!(values.iter().all(|v| (0..=1_000_000).contains(v)));
        let mean = values.iter().sum::<i128>() as f64 / values.len() as f64;
        assert!((mean - 300_000.0).abs() < 100.0, "mean={mean}");
    }

    #[test]
    fn binomial_edges() {
        let none = draws(&Sampler::binomial(10, 0.0).unwrap(), 10);
        assert!(none.iter().all(|&v| v == 0));
        let all = draws(&Sampler::binomial(10, 1.0).unwrap(), 10);
        assert!(all.iter().all(|&v| v == 10));
        let most = draws(&Sampler::binomial(5, 0.9).unwrap(), 200);
        assert!(most.iter().all(|v| (0..=5).contains(v)));
        assert!(Sampler::binomial(u64::MAX as i128 + 1, 0.5).is_err());
    }

    #[test]
    fn certain_success_yields_zero_failures() {
        let geometric = draws(&Sampler::geometric(1.0).unwrap(), 10);
        assert!(geometric.iter().all(|&v| v == 0));
        let negative = draws(&Sampler::negative_binomial(4, 1.0).unwrap(), 10);
        assert!(negative.iter().all(|&v| v == 0));
    }

    #[test]
    fn poisson_is_non_negative() {
        for mean in [0.5, 5.0, 12.0, 250.0] {
            let values = draws(&Sampler::poisson(mean).unwrap(), 2_000);
            assert!(values.iter().all(|&v| v >= 0));
        }
    }

    #[test]
    fn probabilities_are_validated() {
        let params = ParameterSet::new().with("p", ParamValue::Real(1.5));
        assert_eq!(
            build_bernoulli(&params, PixelType::Byte).unwrap_err().kind(),
            ErrorKind::InvalidRange
        );
        let params = ParameterSet::new().with("p", ParamValue::Real(0.0));
        assert!(build_geometric(&params, PixelType::Byte).is_err());
        let params = ParameterSet::new()
            .with("k", ParamValue::Integer(0))
            .with("p", ParamValue::Real(0.5));
        assert!(build_negative_binomial(&params, PixelType::Byte).is_err());
        let params = ParameterSet::new().with("mean", ParamValue::Real(-1.0));
        assert!(build_poisson(&params, PixelType::Byte).is_err());
    }

    #[test]
    fn discrete_respects_weights() {
        let d = Discrete::new(&[0.0, 3.0, 0.0, 1.0]).unwrap();
        let values: Vec<i128> = (0..8_000)
            .map(|i| d.sample(&mut PixelStream::new(2024, i)))
            .collect();
        assert!(values.iter().all(|&v| v == 1 || v == 3));
        let ones = values.iter().filter(|&&v| v == 1).count() as f64 / values.len() as f64;
        assert!((ones - 0.75).abs() < 0.03, "ones={ones}");
        assert!((d.mean() - 1.5).abs() < 1e-12);
        assert!((d.probability(3) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn discrete_rejects_bad_weights() {
        assert!(Discrete::new(&[]).is_err());
        assert!(Discrete::new(&[1.0, -1.0]).is_err());
        assert!(Discrete::new(&[0.0, 0.0]).is_err());
    }
}
