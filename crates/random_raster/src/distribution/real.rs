//! Real-valued distributions.
use rand::Rng;
use rand_distr::{
    Cauchy, ChiSquared, Exp, FisherF, Gamma, Gumbel, LogNormal, Normal, StudentT, Weibull,
};

use super::piecewise::{PiecewiseConstant, PiecewiseLinear};
use super::{ensure, rejected, unit, Sampler};
use crate::descriptor::{ParameterSet, PixelType};
use crate::error::Result;

fn positive(distribution: &str, name: &str, value: f64) -> Result<f64> {
    ensure(value > 0.0 && value.is_finite(), || {
        format!("For {distribution}, '{name}' must be greater than 0 (got {value})")
    })?;
    Ok(value)
}

fn finite(distribution: &str, name: &str, value: f64) -> Result<f64> {
    ensure(value.is_finite(), || {
        format!("For {distribution}, '{name}' must be finite (got {value})")
    })?;
    Ok(value)
}

impl Sampler {
    pub fn uniform_real(a: f64, b: f64) -> Result<Self> {
        let a = finite("uniform_real", "a", a)?;
        let b = finite("uniform_real", "b", b)?;
        ensure(a <= b, || {
            format!("For uniform_real, 'a' must not be greater than 'b' (a = {a}, b = {b}).")
        })?;
        Ok(Sampler::UniformReal { a, b })
    }

    pub fn normal(mean: f64, stddev: f64) -> Result<Self> {
        let mean = finite("normal", "mean", mean)?;
        let stddev = positive("normal", "stddev", stddev)?;
        let dist = Normal::new(mean, stddev).map_err(|e| rejected("normal", e))?;
        Ok(Sampler::Normal { mean, stddev, dist })
    }

    /// `exp(N(m, s))`.
    pub fn lognormal(m: f64, s: f64) -> Result<Self> {
        let m = finite("lognormal", "m", m)?;
        let s = positive("lognormal", "s", s)?;
        let dist = LogNormal::new(m, s).map_err(|e| rejected("lognormal", e))?;
        Ok(Sampler::Lognormal { m, s, dist })
    }

    /// Shape `alpha`, scale `beta`.
    pub fn gamma(alpha: f64, beta: f64) -> Result<Self> {
        let alpha = positive("gamma", "alpha", alpha)?;
        let beta = positive("gamma", "beta", beta)?;
        let dist = Gamma::new(alpha, beta).map_err(|e| rejected("gamma", e))?;
        Ok(Sampler::Gamma { alpha, beta, dist })
    }

    pub fn exponential(lambda: f64) -> Result<Self> {
        let lambda = positive("exponential", "lambda", lambda)?;
        let dist = Exp::new(lambda).map_err(|e| rejected("exponential", e))?;
        Ok(Sampler::Exponential { lambda, dist })
    }

    /// Shape `a`, scale `b`.
    pub fn weibull(a: f64, b: f64) -> Result<Self> {
        let a = positive("weibull", "a", a)?;
        let b = positive("weibull", "b", b)?;
        let dist = Weibull::new(b, a).map_err(|e| rejected("weibull", e))?;
        Ok(Sampler::Weibull { a, b, dist })
    }

    /// Location `a`, scale `b`.
    pub fn extreme_value(a: f64, b: f64) -> Result<Self> {
        let a = finite("extreme_value", "a", a)?;
        let b = positive("extreme_value", "b", b)?;
        let dist = Gumbel::new(a, b).map_err(|e| rejected("extreme_value", e))?;
        Ok(Sampler::ExtremeValue { a, b, dist })
    }

    pub fn cauchy(a: f64, b: f64) -> Result<Self> {
        let a = finite("cauchy", "a", a)?;
        let b = positive("cauchy", "b", b)?;
        let dist = Cauchy::new(a, b).map_err(|e| rejected("cauchy", e))?;
        Ok(Sampler::Cauchy { a, b, dist })
    }

    pub fn fisher_f(m: f64, n: f64) -> Result<Self> {
        let m = positive("fisher_f", "m", m)?;
        let n = positive("fisher_f", "n", n)?;
        let dist = FisherF::new(m, n).map_err(|e| rejected("fisher_f", e))?;
        Ok(Sampler::FisherF { m, n, dist })
    }

    pub fn student_t(n: f64) -> Result<Self> {
        let n = positive("student_t", "n", n)?;
        let dist = StudentT::new(n).map_err(|e| rejected("student_t", e))?;
        Ok(Sampler::StudentT { n, dist })
    }

    pub fn chi_squared(n: f64) -> Result<Self> {
        let n = positive("chi_squared", "n", n)?;
        let dist = ChiSquared::new(n).map_err(|e| rejected("chi_squared", e))?;
        Ok(Sampler::ChiSquared { n, dist })
    }
}

pub(crate) fn build_uniform_real(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::uniform_real(params.real("a")?, params.real("b")?)
}

pub(crate) fn build_normal(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::normal(params.real("mean")?, params.real("stddev")?)
}

pub(crate) fn build_lognormal(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::lognormal(params.real("m")?, params.real("s")?)
}

pub(crate) fn build_gamma(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::gamma(params.real("alpha")?, params.real("beta")?)
}

pub(crate) fn build_exponential(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::exponential(params.real("lambda")?)
}

pub(crate) fn build_weibull(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::weibull(params.real("a")?, params.real("b")?)
}

pub(crate) fn build_extreme_value(
    params: &ParameterSet,
    _pixel_type: PixelType,
) -> Result<Sampler> {
    Sampler::extreme_value(params.real("a")?, params.real("b")?)
}

pub(crate) fn build_cauchy(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::cauchy(params.real("a")?, params.real("b")?)
}

pub(crate) fn build_fisher_f(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::fisher_f(params.real("m")?, params.real("n")?)
}

pub(crate) fn build_student_t(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::student_t(params.real("n")?)
}

pub(crate) fn build_chi_squared(params: &ParameterSet, _pixel_type: PixelType) -> Result<Sampler> {
    Sampler::chi_squared(params.real("n")?)
}

pub(crate) fn build_piecewise_constant(
    params: &ParameterSet,
    _pixel_type: PixelType,
) -> Result<Sampler> {
    PiecewiseConstant::new(params.list("intervals")?, params.list("densities")?)
        .map(Sampler::PiecewiseConstant)
}

pub(crate) fn build_piecewise_linear(
    params: &ParameterSet,
    _pixel_type: PixelType,
) -> Result<Sampler> {
    PiecewiseLinear::new(params.list("intervals")?, params.list("densities")?)
        .map(Sampler::PiecewiseLinear)
}

/// Uniform in `[a, b]`.
///
/// Interpolates between the bounds so spans wider than `f64::MAX` stay finite.
pub(crate) fn uniform_real(rng: &mut dyn Rng, a: f64, b: f64) -> f64 {
    let u = unit(rng);
    (a * (1.0 - u) + b * u).clamp(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamValue;
    use crate::distribution::SampleContext;
    use crate::error::ErrorKind;
    use crate::stream::PixelStream;

    fn draws(sampler: &Sampler, n: u64) -> Vec<f64> {
        (0..n)
            .map(|i| sampler.sample(&mut PixelStream::new(77, i)).as_f64())
            .collect()
    }

    #[test]
    fn uniform_real_stays_in_bounds() {
        let values = draws(&Sampler::uniform_real(-2.0, 3.0).unwrap(), 5_000);
        assert!(values.iter().all(|v| (-2.0..=3.0).contains(v)));
    }

    #[test]
    fn uniform_real_covers_spans_wider_than_f64_max() {
        let (a, b) = (-1e308, 1e308);
        let sampler = Sampler::uniform_real(a, b).unwrap();
        assert!(sampler.check_representable(PixelType::Float64).is_ok());
        let values = draws(&sampler, 2_000);
        assert!(values.iter().all(|v| v.is_finite() && (a..=b).contains(v)));
        assert!(values.iter().any(|&v| v < -1e307));
        assert!(values.iter().any(|&v| v > 1e307));
        let mean = values.iter().map(|v| v / b).sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 0.1, "mean={mean}");
    }

    #[test]
    fn positive_supports_stay_non_negative() {
        let weibull = draws(&Sampler::weibull(0.7, 2.0).unwrap(), 2_000);
        assert!(weibull.iter().all(|&v| v >= 0.0));
        let fisher = draws(&Sampler::fisher_f(3.0, 7.0).unwrap(), 2_000);
        assert!(fisher.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn cauchy_median_is_location() {
        let mut values = draws(&Sampler::cauchy(10.0, 1.0).unwrap(), 4_001);
        values.sort_by(f64::total_cmp);
        let median = values[values.len() / 2];
        assert!((median - 10.0).abs() < 0.15, "median={median}");
    }

    #[test]
    fn student_t_is_symmetric() {
        let values = draws(&Sampler::student_t(8.0).unwrap(), 10_000);
        let positive = values.iter().filter(|&&v| v > 0.0).count() as f64 / values.len() as f64;
        assert!((positive - 0.5).abs() < 0.03);
    }

    #[test]
    fn scale_parameters_must_be_positive() {
        let params = ParameterSet::new()
            .with("mean", ParamValue::Real(0.0))
            .with("stddev", ParamValue::Real(0.0));
        let err = build_normal(&params, PixelType::Float32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert!(err.to_string().contains("'stddev'"));

        let params = ParameterSet::new().with("n", ParamValue::Real(-3.0));
        assert!(build_chi_squared(&params, PixelType::Float64).is_err());
        assert!(build_student_t(&params, PixelType::Float64).is_err());
    }

    #[test]
    fn uniform_real_rejects_reversed_bounds() {
        let params = ParameterSet::new()
            .with("a", ParamValue::Real(1.0))
            .with("b", ParamValue::Real(0.0));
        assert!(build_uniform_real(&params, PixelType::Float32).is_err());
    }

    #[test]
    fn normal_sample_moments() {
        let sampler = Sampler::normal(5.0, 2.0).unwrap();
        let values: Vec<f64> = (0..20_000)
            .map(|i| sampler.sample_at(SampleContext::new(1, i)).as_f64())
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64)
            .sqrt();
        assert!((mean - 5.0).abs() < 0.06, "mean={mean}");
        assert!((sd - 2.0).abs() < 0.06, "sd={sd}");
    }
}
