//! Probability distributions that generate pixel values.
//!
//! A [`Sampler`] is built once per dataset from a validated parameter set and then drawn
//! from for every pixel. Drawing takes a [`SampleContext`] (seed and linear pixel index)
//! and is a pure function of it. The variates come from `rand_distr` and `rand`, driven
//! by the pixel's own [`PixelStream`].
use rand::distr::{Distribution, StandardUniform, Uniform};
use rand::Rng;

use crate::descriptor::PixelType;
use crate::error::{Error, Result};
use crate::stream::PixelStream;

mod bounds;
pub mod integer;
pub mod piecewise;
pub mod real;
pub mod registry;

pub use bounds::MAX_SATURATED_MASS;
pub use integer::Discrete;
pub use piecewise::{PiecewiseConstant, PiecewiseLinear};
pub use registry::{DistributionRegistry, DistributionSpec, SamplerBuilder};

/// Whether a distribution emits integers or reals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Integer,
    Real,
}

impl Family {
    /// Returns true if values of this family may be stored in `pixel_type`.
    pub fn accepts(self, pixel_type: PixelType) -> bool {
        match self {
            Family::Integer => pixel_type.is_integer(),
            Family::Real => !pixel_type.is_integer(),
        }
    }
}

/// One generated value, before encoding into a pixel type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleValue {
    Integer(i128),
    Real(f64),
}

impl SampleValue {
    pub fn as_f64(self) -> f64 {
        match self {
            SampleValue::Integer(v) => v as f64,
            SampleValue::Real(v) => v,
        }
    }
}

/// Identifies the pixel being generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleContext {
    pub seed: u64,
    /// Row-major linear index, `row * cols + col`.
    pub pixel_index: u64,
}

impl SampleContext {
    pub fn new(seed: u64, pixel_index: u64) -> Self {
        Self { seed, pixel_index }
    }

    pub fn stream(&self) -> PixelStream {
        PixelStream::new(self.seed, self.pixel_index)
    }
}

/// A distribution with validated parameters.
///
/// Each variant keeps its parameters next to the prebuilt distribution it draws from.
/// Construct through the associated functions (`Sampler::normal`, ...) or a
/// [`SamplerBuilder`].
#[derive(Clone, Debug)]
pub enum Sampler {
    UniformInteger {
        a: i128,
        b: i128,
        dist: Uniform<i128>,
    },
    Bernoulli {
        p: f64,
        dist: rand::distr::Bernoulli,
    },
    Binomial {
        t: i128,
        p: f64,
        dist: rand_distr::Binomial,
    },
    /// `mixing` is `None` when `p == 1` and every draw is zero.
    NegativeBinomial {
        k: i128,
        p: f64,
        mixing: Option<rand_distr::Gamma<f64>>,
    },
    Geometric {
        p: f64,
        dist: rand_distr::Geometric,
    },
    Poisson {
        mean: f64,
        dist: rand_distr::Poisson<f64>,
    },
    Discrete(Discrete),
    UniformReal {
        a: f64,
        b: f64,
    },
    Normal {
        mean: f64,
        stddev: f64,
        dist: rand_distr::Normal<f64>,
    },
    Lognormal {
        m: f64,
        s: f64,
        dist: rand_distr::LogNormal<f64>,
    },
    Gamma {
        alpha: f64,
        beta: f64,
        dist: rand_distr::Gamma<f64>,
    },
    Exponential {
        lambda: f64,
        dist: rand_distr::Exp<f64>,
    },
    Weibull {
        a: f64,
        b: f64,
        dist: rand_distr::Weibull<f64>,
    },
    /// Gumbel law with location `a` and scale `b`.
    ExtremeValue {
        a: f64,
        b: f64,
        dist: rand_distr::Gumbel<f64>,
    },
    Cauchy {
        a: f64,
        b: f64,
        dist: rand_distr::Cauchy<f64>,
    },
    FisherF {
        m: f64,
        n: f64,
        dist: rand_distr::FisherF<f64>,
    },
    StudentT {
        n: f64,
        dist: rand_distr::StudentT<f64>,
    },
    ChiSquared {
        n: f64,
        dist: rand_distr::ChiSquared<f64>,
    },
    PiecewiseConstant(PiecewiseConstant),
    PiecewiseLinear(PiecewiseLinear),
}

impl Sampler {
    /// Registry name of the distribution.
    pub fn name(&self) -> &'static str {
        match self {
            Sampler::UniformInteger { .. } => "uniform_integer",
            Sampler::Bernoulli { .. } => "bernoulli",
            Sampler::Binomial { .. } => "binomial",
            Sampler::NegativeBinomial { .. } => "negative_binomial",
            Sampler::Geometric { .. } => "geometric",
            Sampler::Poisson { .. } => "poisson",
            Sampler::Discrete(_) => "discrete",
            Sampler::UniformReal { .. } => "uniform_real",
            Sampler::Normal { .. } => "normal",
            Sampler::Lognormal { .. } => "lognormal",
            Sampler::Gamma { .. } => "gamma",
            Sampler::Exponential { .. } => "exponential",
            Sampler::Weibull { .. } => "weibull",
            Sampler::ExtremeValue { .. } => "extreme_value",
            Sampler::Cauchy { .. } => "cauchy",
            Sampler::FisherF { .. } => "fisher_f",
            Sampler::StudentT { .. } => "student_t",
            Sampler::ChiSquared { .. } => "chi_squared",
            Sampler::PiecewiseConstant(_) => "piecewise_constant",
            Sampler::PiecewiseLinear(_) => "piecewise_linear",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Sampler::UniformInteger { .. }
            | Sampler::Bernoulli { .. }
            | Sampler::Binomial { .. }
            | Sampler::NegativeBinomial { .. }
            | Sampler::Geometric { .. }
            | Sampler::Poisson { .. }
            | Sampler::Discrete(_) => Family::Integer,
            _ => Family::Real,
        }
    }

    /// Draws one value from `rng`.
    pub fn sample(&self, rng: &mut dyn Rng) -> SampleValue {
        match self {
            Sampler::UniformInteger { dist, .. } => SampleValue::Integer(dist.sample(rng)),
            Sampler::Bernoulli { dist, .. } => {
                let hit: bool = dist.sample(rng);
                SampleValue::Integer(i128::from(hit))
            }
            Sampler::Binomial { dist, .. } => {
                let successes: u64 = dist.sample(rng);
                SampleValue::Integer(i128::from(successes))
            }
            Sampler::NegativeBinomial { mixing, .. } => {
                SampleValue::Integer(integer::negative_binomial(rng, mixing.as_ref()))
            }
            Sampler::Geometric { dist, .. } => {
                let failures: u64 = dist.sample(rng);
                SampleValue::Integer(i128::from(failures))
            }
            Sampler::Poisson { dist, .. } => {
                let count: f64 = dist.sample(rng);
                SampleValue::Integer(count as i128)
            }
            Sampler::Discrete(d) => SampleValue::Integer(d.sample(rng)),
            Sampler::UniformReal { a, b } => SampleValue::Real(real::uniform_real(rng, *a, *b)),
            Sampler::Normal { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::Lognormal { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::Gamma { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::Exponential { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::Weibull { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::ExtremeValue { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::Cauchy { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::FisherF { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::StudentT { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::ChiSquared { dist, .. } => SampleValue::Real(dist.sample(rng)),
            Sampler::PiecewiseConstant(pc) => SampleValue::Real(pc.sample(rng)),
            Sampler::PiecewiseLinear(pl) => SampleValue::Real(pl.sample(rng)),
        }
    }

    /// Draws the value of one pixel from its own stream.
    pub fn sample_at(&self, ctx: SampleContext) -> SampleValue {
        self.sample(&mut ctx.stream())
    }

    /// Inclusive support as `f64`, with infinite ends for unbounded sides.
    pub fn support(&self) -> (f64, f64) {
        if let Some((lo, hi)) = self.integer_support() {
            return (lo as f64, hi.map_or(f64::INFINITY, |h| h as f64));
        }
        match self {
            Sampler::UniformReal { a, b } => (*a, *b),
            Sampler::Normal { .. }
            | Sampler::ExtremeValue { .. }
            | Sampler::Cauchy { .. }
            | Sampler::StudentT { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Sampler::PiecewiseConstant(pc) => pc.support(),
            Sampler::PiecewiseLinear(pl) => pl.support(),
            _ => (0.0, f64::INFINITY),
        }
    }

    /// Exact integer support for integer distributions; `None` upper bound is unbounded.
    fn integer_support(&self) -> Option<(i128, Option<i128>)> {
        match self {
            Sampler::UniformInteger { a, b, .. } => Some((*a, Some(*b))),
            Sampler::Bernoulli { .. } => Some((0, Some(1))),
            Sampler::Binomial { t, .. } => Some((0, Some(*t))),
            Sampler::Discrete(d) => Some((0, Some(d.len() as i128 - 1))),
            Sampler::NegativeBinomial { .. }
            | Sampler::Geometric { .. }
            | Sampler::Poisson { .. } => Some((0, None)),
            _ => None,
        }
    }

    /// Theoretical mean, `None` where it is undefined or infinite.
    pub fn mean(&self) -> Option<f64> {
        self.raw_mean().filter(|mean| mean.is_finite())
    }

    /// Mean as computed, possibly overflowed to infinity; `None` only where undefined.
    fn raw_mean(&self) -> Option<f64> {
        let mean = match self {
            Sampler::UniformInteger { a, b, .. } => (*a as f64 + *b as f64) / 2.0,
            Sampler::Bernoulli { p, .. } => *p,
            Sampler::Binomial { t, p, .. } => *t as f64 * p,
            Sampler::NegativeBinomial { k, p, .. } => *k as f64 * (1.0 - p) / p,
            Sampler::Geometric { p, .. } => (1.0 - p) / p,
            Sampler::Poisson { mean, .. } => *mean,
            Sampler::Discrete(d) => d.mean(),
            Sampler::UniformReal { a, b } => 0.5 * a + 0.5 * b,
            Sampler::Normal { mean, .. } => *mean,
            Sampler::Lognormal { m, s, .. } => (m + s * s / 2.0).exp(),
            Sampler::Gamma { alpha, beta, .. } => alpha * beta,
            Sampler::Exponential { lambda, .. } => 1.0 / lambda,
            Sampler::Weibull { a, b, .. } => b * bounds::ln_gamma(1.0 + 1.0 / a).exp(),
            Sampler::ExtremeValue { a, b, .. } => a + b * EULER_GAMMA,
            Sampler::Cauchy { .. } => return None,
            Sampler::FisherF { n, .. } if *n > 2.0 => n / (n - 2.0),
            Sampler::FisherF { .. } => return None,
            Sampler::StudentT { n, .. } if *n > 1.0 => 0.0,
            Sampler::StudentT { .. } => return None,
            Sampler::ChiSquared { n, .. } => *n,
            Sampler::PiecewiseConstant(pc) => pc.mean(),
            Sampler::PiecewiseLinear(pl) => pl.mean(),
        };
        Some(mean)
    }

    /// Theoretical variance, `None` where it is undefined or infinite.
    pub fn variance(&self) -> Option<f64> {
        let var = match self {
            Sampler::UniformInteger { a, b, .. } => {
                let n = *b as f64 - *a as f64 + 1.0;
                (n * n - 1.0) / 12.0
            }
            Sampler::Bernoulli { p, .. } => p * (1.0 - p),
            Sampler::Binomial { t, p, .. } => *t as f64 * p * (1.0 - p),
            Sampler::NegativeBinomial { k, p, .. } => *k as f64 * (1.0 - p) / (p * p),
            Sampler::Geometric { p, .. } => (1.0 - p) / (p * p),
            Sampler::Poisson { mean, .. } => *mean,
            Sampler::Discrete(d) => d.variance(),
            Sampler::UniformReal { a, b } => (b - a) * (b - a) / 12.0,
            Sampler::Normal { stddev, .. } => stddev * stddev,
            Sampler::Lognormal { m, s, .. } => ((s * s).exp() - 1.0) * (2.0 * m + s * s).exp(),
            Sampler::Gamma { alpha, beta, .. } => alpha * beta * beta,
            Sampler::Exponential { lambda, .. } => 1.0 / (lambda * lambda),
            Sampler::Weibull { a, b, .. } => {
                let g1 = bounds::ln_gamma(1.0 + 1.0 / a).exp();
                let g2 = bounds::ln_gamma(1.0 + 2.0 / a).exp();
                b * b * (g2 - g1 * g1)
            }
            Sampler::ExtremeValue { b, .. } => std::f64::consts::PI.powi(2) * b * b / 6.0,
            Sampler::Cauchy { .. } => return None,
            Sampler::FisherF { m, n, .. } if *n > 4.0 => {
                2.0 * n * n * (m + n - 2.0) / (m * (n - 2.0).powi(2) * (n - 4.0))
            }
            Sampler::FisherF { .. } => return None,
            Sampler::StudentT { n, .. } if *n > 2.0 => n / (n - 2.0),
            Sampler::StudentT { .. } => return None,
            Sampler::ChiSquared { n, .. } => 2.0 * n,
            Sampler::PiecewiseConstant(pc) => pc.variance(),
            Sampler::PiecewiseLinear(pl) => pl.variance(),
        };
        var.is_finite().then_some(var)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(|v| v.max(0.0).sqrt())
    }

    /// Checks that every value this sampler can emit fits `pixel_type`.
    ///
    /// Finite support bounds must lie in the type's range. An unbounded side needs a
    /// representable mean and at most [`MAX_SATURATED_MASS`] of probability past the type
    /// limit, so encoding never clamps more than a negligible share of pixels.
    pub fn check_representable(&self, pixel_type: PixelType) -> Result<()> {
        if !self.family().accepts(pixel_type) {
            return Err(Error::IncompatiblePixelType {
                distribution: self.name().to_owned(),
                pixel_type: pixel_type.name().to_owned(),
            });
        }

        let name = self.name();
        let (type_lo, type_hi) = pixel_type.real_range();
        if let Some((lo, hi)) = self.integer_support() {
            let (tmin, tmax) = pixel_type.integer_range().unwrap_or((i128::MIN, i128::MAX));
            if lo < tmin {
                return Err(Error::InvalidRange(format!(
                    "{name} produces values down to {lo}, below the {pixel_type} minimum {tmin}"
                )));
            }
            match hi {
                Some(hi) if hi > tmax => {
                    return Err(Error::InvalidRange(format!(
                        "{name} produces values up to {hi}, above the {pixel_type} maximum {tmax}"
                    )));
                }
                Some(_) => {}
                None => {
                    self.check_mean(pixel_type)?;
                    self.check_saturation(pixel_type, self.mass_above(type_hi), "above", type_hi)?;
                }
            }
            return Ok(());
        }

        let (lo, hi) = self.support();
        if (lo.is_finite() && !pixel_type.contains_real(lo))
            || (hi.is_finite() && !pixel_type.contains_real(hi))
        {
            return Err(Error::InvalidRange(format!(
                "{name} support [{lo}, {hi}] does not fit {pixel_type}"
            )));
        }
        if !lo.is_finite() || !hi.is_finite() {
            self.check_mean(pixel_type)?;
        }
        if !hi.is_finite() {
            self.check_saturation(pixel_type, self.mass_above(type_hi), "above", type_hi)?;
        }
        if !lo.is_finite() {
            self.check_saturation(pixel_type, self.mass_below(type_lo), "below", type_lo)?;
        }
        Ok(())
    }

    fn check_mean(&self, pixel_type: PixelType) -> Result<()> {
        match self.raw_mean() {
            Some(mean) if !pixel_type.contains_real(mean) => Err(Error::InvalidRange(format!(
                "{} mean {mean} is not representable as {pixel_type}",
                self.name()
            ))),
            _ => Ok(()),
        }
    }

    fn check_saturation(
        &self,
        pixel_type: PixelType,
        mass: f64,
        side: &str,
        limit: f64,
    ) -> Result<()> {
        ensure(mass <= MAX_SATURATED_MASS, || {
            format!(
                "{} puts up to {mass:.3e} of its probability {side} the {pixel_type} limit {limit}",
                self.name()
            )
        })
    }
}

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Uniform float in `[0, 1)`.
#[inline]
pub(crate) fn unit(rng: &mut dyn Rng) -> f64 {
    StandardUniform.sample(rng)
}

/// Fails with [`Error::InvalidRange`] built by `message` unless `ok` holds.
pub(crate) fn ensure(ok: bool, message: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidRange(message()))
    }
}

/// Turns a `rand`/`rand_distr` constructor error into [`Error::InvalidRange`].
pub(crate) fn rejected(distribution: &str, reason: impl std::fmt::Display) -> Error {
    Error::InvalidRange(format!("For {distribution}, {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ParamValue, ParameterSet};
    use crate::error::ErrorKind;

    fn mean_of(sampler: &Sampler, n: u64) -> f64 {
        (0..n)
            .map(|i| sampler.sample_at(SampleContext::new(99, i)).as_f64())
            .sum::<f64>()
            / n as f64
    }

    fn build(name: &str, params: ParameterSet, pixel_type: PixelType) -> Result<Sampler> {
        registry::sampler_for(name).unwrap().build(&params, pixel_type)
    }

    #[test]
    fn sample_at_is_reproducible() {
        let s = Sampler::normal(5.0, 2.0).unwrap();
        let ctx = SampleContext::new(123, 17);
        assert_eq!(s.sample_at(ctx), s.sample_at(ctx));
        assert_eq!(s.sample_at(ctx), s.clone().sample_at(ctx));
    }

    #[test]
    fn family_follows_variant() {
        assert_eq!(Sampler::poisson(2.0).unwrap().family(), Family::Integer);
        assert_eq!(Sampler::chi_squared(2.0).unwrap().family(), Family::Real);
        assert!(Family::Integer.accepts(PixelType::UInt16));
        assert!(!Family::Integer.accepts(PixelType::Float32));
        assert!(Family::Real.accepts(PixelType::Float64));
    }

    #[test]
    fn integer_bounds_must_fit_pixel_type() {
        let s = Sampler::binomial(300, 0.5).unwrap();
        let err = s.check_representable(PixelType::Byte).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert!(s.check_representable(PixelType::UInt16).is_ok());
    }

    #[test]
    fn unbounded_supports_need_a_representable_mean() {
        let s = Sampler::poisson(1000.0).unwrap();
        assert_eq!(
            s.check_representable(PixelType::Byte).unwrap_err().kind(),
            ErrorKind::InvalidRange
        );
        assert!(Sampler::poisson(4.0)
            .unwrap()
            .check_representable(PixelType::Byte)
            .is_ok());

        let lognormal = Sampler::lognormal(100.0, 1.0).unwrap();
        assert!(lognormal.check_representable(PixelType::Float32).is_err());
        assert!(lognormal.check_representable(PixelType::Float64).is_ok());
    }

    #[test]
    fn overflowing_means_are_rejected() {
        let lognormal = Sampler::lognormal(1000.0, 1.0).unwrap();
        assert_eq!(lognormal.mean(), None);
        for pixel_type in [PixelType::Float32, PixelType::Float64] {
            let err = lognormal.check_representable(pixel_type).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRange);
            assert!(err.to_string().contains("mean inf"), "{err}");
        }

        let params = ParameterSet::new()
            .with("m", ParamValue::Real(1000.0))
            .with("s", ParamValue::Real(1.0));
        let err = build("lognormal", params, PixelType::Float32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);

        let params = ParameterSet::new().with("p", ParamValue::Real(1e-320));
        let err = build("geometric", params, PixelType::Byte).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn saturating_integer_tails_are_rejected() {
        // About 7.6% of geometric(0.01) draws exceed 255.
        let params = ParameterSet::new().with("p", ParamValue::Real(0.01));
        let err = build("geometric", params.clone(), PixelType::Byte).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert!(err.to_string().contains("above the Byte limit 255"), "{err}");
        assert!(build("geometric", params, PixelType::UInt16).is_ok());
        assert!(Sampler::geometric(0.5)
            .unwrap()
            .check_representable(PixelType::Byte)
            .is_ok());

        // A representable mean is not enough when the tail still reaches the limit.
        assert!(Sampler::poisson(200.0)
            .unwrap()
            .check_representable(PixelType::Byte)
            .is_err());
        assert!(Sampler::negative_binomial(2, 0.5)
            .unwrap()
            .check_representable(PixelType::Byte)
            .is_ok());
        assert!(Sampler::negative_binomial(20, 0.1)
            .unwrap()
            .check_representable(PixelType::Byte)
            .is_err());
    }

    #[test]
    fn saturating_real_tails_are_rejected() {
        assert!(Sampler::normal(0.0, 1e37)
            .unwrap()
            .check_representable(PixelType::Float32)
            .is_ok());
        let err = Sampler::normal(0.0, 1e38)
            .unwrap()
            .check_representable(PixelType::Float32)
            .unwrap_err();
        assert!(err.to_string().contains("above the Float32 limit"), "{err}");

        assert!(Sampler::cauchy(0.0, 1.0)
            .unwrap()
            .check_representable(PixelType::Float32)
            .is_ok());
        assert!(Sampler::student_t(0.05)
            .unwrap()
            .check_representable(PixelType::Float32)
            .is_err());
    }

    #[test]
    fn family_mismatch_is_unsupported_type() {
        let err = Sampler::normal(0.0, 1.0)
            .unwrap()
            .check_representable(PixelType::Int16)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn moments_match_sample_means() {
        let cases = [
            Sampler::binomial(40, 0.3),
            Sampler::negative_binomial(3, 0.4),
            Sampler::geometric(0.25),
            Sampler::poisson(3.5),
            Sampler::poisson(40.0),
            Sampler::gamma(2.0, 3.0),
            Sampler::weibull(1.5, 2.0),
            Sampler::extreme_value(1.0, 2.0),
            Sampler::chi_squared(4.0),
            Sampler::fisher_f(5.0, 10.0),
        ];
        for s in cases.iter().map(|s| s.as_ref().unwrap()) {
            let expected = s.mean().unwrap();
            let sd = s.std_dev().unwrap();
            let got = mean_of(s, 20_000);
            // Five standard errors of the mean.
            let tol = 5.0 * sd / (20_000f64).sqrt() + 1e-9;
            assert!(
                (got - expected).abs() < tol,
                "{}: expected {expected}, got {got}",
                s.name()
            );
        }
    }

    #[test]
    fn heavy_tailed_moments_are_undefined() {
        assert_eq!(Sampler::cauchy(0.0, 1.0).unwrap().mean(), None);
        assert_eq!(Sampler::student_t(1.0).unwrap().mean(), None);
        assert_eq!(Sampler::student_t(2.0).unwrap().std_dev(), None);
        assert_eq!(Sampler::student_t(5.0).unwrap().mean(), Some(0.0));
    }
}
