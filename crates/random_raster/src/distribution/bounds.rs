//! Special functions and tail bounds used when validating samplers against pixel types.
//!
//! A sampler with an unbounded side is accepted for a pixel type only if the probability
//! of drawing past the type limit is negligible. The bounds below are closed forms or
//! Chernoff/Markov style upper bounds, so a passing check never understates the mass that
//! would saturate.
use std::f64::consts::PI;

use super::Sampler;

/// Largest probability a sampler may place beyond the range of its pixel type.
pub const MAX_SATURATED_MASS: f64 = 1e-9;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0` (Lanczos approximation).
pub(crate) fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Gamma(x) Gamma(1 - x) = pi / sin(pi x)
        return (PI / (PI * x).sin()).abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// `P(Z > z)` of a standard normal is at most `exp(-z^2 / 2) / 2` for `z >= 0`.
fn normal_above(z: f64) -> f64 {
    if z <= 0.0 {
        1.0
    } else {
        0.5 * (-0.5 * z * z).exp()
    }
}

/// Chernoff bound for Gamma(shape, scale).
fn gamma_above(shape: f64, scale: f64, x: f64) -> f64 {
    let t = x / (shape * scale);
    if t <= 1.0 {
        1.0
    } else if !t.is_finite() {
        0.0
    } else {
        (shape * (1.0 + t.ln() - t)).exp()
    }
}

/// Mass of a discrete law past `x`, given `ln pmf(k)` at the first integer `k > x` and a
/// bound `ratio < 1` on `pmf(j + 1) / pmf(j)` for every `j >= k`.
fn geometric_series_above(ln_pmf: f64, ratio: f64) -> f64 {
    if ratio >= 1.0 {
        1.0
    } else {
        (ln_pmf.exp() / (1.0 - ratio)).min(1.0)
    }
}

fn poisson_above(mean: f64, x: f64) -> f64 {
    let k = x.floor() + 1.0;
    if k <= mean {
        return 1.0;
    }
    let ln_pmf = -mean + k * mean.ln() - ln_gamma(k + 1.0);
    geometric_series_above(ln_pmf, mean / (k + 1.0))
}

fn negative_binomial_above(r: f64, p: f64, x: f64) -> f64 {
    if p >= 1.0 {
        return 0.0;
    }
    let k = x.floor() + 1.0;
    let ln_q = (-p).ln_1p();
    let ln_pmf = ln_gamma(k + r) - ln_gamma(r) - ln_gamma(k + 1.0) + r * p.ln() + k * ln_q;
    // The term ratio (j + r) / (j + 1) * (1 - p) only shrinks as j grows for r >= 1.
    geometric_series_above(ln_pmf, (k + r) / (k + 1.0) * (1.0 - p))
}

/// Markov bound `E|X|^q / x^q` from the log of a fractional absolute moment.
fn markov_above(ln_moment: f64, q: f64, x: f64) -> f64 {
    if x <= 0.0 {
        1.0
    } else {
        (ln_moment - q * x.ln()).exp().min(1.0)
    }
}

/// `ln E|T|^q` of Student's t with `n` degrees of freedom, `q < n`.
fn student_t_ln_moment(n: f64, q: f64) -> f64 {
    0.5 * q * n.ln() + ln_gamma(0.5 * (q + 1.0)) + ln_gamma(0.5 * (n - q))
        - 0.5 * PI.ln()
        - ln_gamma(0.5 * n)
}

/// `ln E[F^q]` of Fisher's F with `(m, n)` degrees of freedom, `q < n / 2`.
fn fisher_f_ln_moment(m: f64, n: f64, q: f64) -> f64 {
    q * (n / m).ln() + ln_gamma(0.5 * m + q) + ln_gamma(0.5 * n - q)
        - ln_gamma(0.5 * m)
        - ln_gamma(0.5 * n)
}

impl Sampler {
    /// Upper bound on `P(X > x)`.
    pub fn mass_above(&self, x: f64) -> f64 {
        let bound = match self {
            Sampler::Geometric { p, .. } => ((x.floor() + 1.0) * (-p).ln_1p()).exp(),
            Sampler::Poisson { mean, .. } => poisson_above(*mean, x),
            Sampler::NegativeBinomial { k, p, .. } => negative_binomial_above(*k as f64, *p, x),
            Sampler::Normal { mean, stddev, .. } => normal_above((x - mean) / stddev),
            Sampler::Lognormal { m, s, .. } if x > 0.0 => normal_above((x.ln() - m) / s),
            Sampler::Gamma { alpha, beta, .. } => gamma_above(*alpha, *beta, x),
            Sampler::ChiSquared { n, .. } => gamma_above(0.5 * n, 2.0, x),
            Sampler::Exponential { lambda, .. } => (-lambda * x.max(0.0)).exp(),
            Sampler::Weibull { a, b, .. } => (-(x.max(0.0) / b).powf(*a)).exp(),
            Sampler::ExtremeValue { a, b, .. } => (-(x - a) / b).exp(),
            Sampler::Cauchy { a, b, .. } => {
                let z = (x - a) / b;
                if z > 0.0 {
                    (1.0 / z).atan() / PI
                } else {
                    1.0
                }
            }
            Sampler::StudentT { n, .. } => {
                let q = (0.5 * n).min(2.0);
                markov_above(student_t_ln_moment(*n, q), q, x)
            }
            Sampler::FisherF { m, n, .. } => {
                let q = (0.25 * n).min(2.0);
                markov_above(fisher_f_ln_moment(*m, *n, q), q, x)
            }
            _ => {
                if self.support().1 > x {
                    1.0
                } else {
                    0.0
                }
            }
        };
        if bound.is_nan() {
            1.0
        } else {
            bound.clamp(0.0, 1.0)
        }
    }

    /// Upper bound on `P(X < x)`.
    pub fn mass_below(&self, x: f64) -> f64 {
        let bound = match self {
            Sampler::Normal { mean, stddev, .. } => normal_above((mean - x) / stddev),
            Sampler::ExtremeValue { a, b, .. } => (-(-(x - a) / b).exp()).exp(),
            Sampler::Cauchy { a, b, .. } => {
                let z = (a - x) / b;
                if z > 0.0 {
                    (1.0 / z).atan() / PI
                } else {
                    1.0
                }
            }
            Sampler::StudentT { n, .. } => {
                let q = (0.5 * n).min(2.0);
                markov_above(student_t_ln_moment(*n, q), q, -x)
            }
            _ => {
                if self.support().0 < x {
                    1.0
                } else {
                    0.0
                }
            }
        };
        if bound.is_nan() {
            1.0
        } else {
            bound.clamp(0.0, 1.0)
        }
    }
}
