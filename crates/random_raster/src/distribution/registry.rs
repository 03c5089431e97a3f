//! Catalog of supported distributions.
//!
//! Each [`DistributionSpec`] carries the distribution name, its value family, the parameter
//! schema and a constructor. The built-in table is process-wide and read-only:
//! - Look up schemas with [`DistributionRegistry::schema_for`].
//! - Build samplers through [`DistributionRegistry::sampler_for`].
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use super::{integer, real, Family, Sampler};
use crate::descriptor::{ParamDefault, ParamKind, ParameterSet, ParameterSpec, PixelType};
use crate::error::{Error, Result};

type BuildFn = fn(&ParameterSet, PixelType) -> Result<Sampler>;

/// Static description of one distribution.
pub struct DistributionSpec {
    pub name: &'static str,
    pub family: Family,
    pub parameters: &'static [ParameterSpec],
    build: BuildFn,
}

impl DistributionSpec {
    /// Fails with [`Error::IncompatiblePixelType`] if `pixel_type` cannot hold this family.
    pub fn check_pixel_type(&self, pixel_type: PixelType) -> Result<()> {
        if self.family.accepts(pixel_type) {
            Ok(())
        } else {
            Err(Error::IncompatiblePixelType {
                distribution: self.name.to_owned(),
                pixel_type: pixel_type.name().to_owned(),
            })
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Debug for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionSpec")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Builds validated samplers of one distribution.
#[derive(Clone, Copy, Debug)]
pub struct SamplerBuilder {
    spec: &'static DistributionSpec,
}

impl SamplerBuilder {
    pub fn spec(&self) -> &'static DistributionSpec {
        self.spec
    }

    /// Builds a sampler for `pixel_type`.
    ///
    /// Absent parameters take their schema defaults. The result is checked for joint
    /// parameter consistency and for fitting the pixel type.
    pub fn build(&self, params: &ParameterSet, pixel_type: PixelType) -> Result<Sampler> {
        self.spec.check_pixel_type(pixel_type)?;
        let params = params.completed(self.spec.parameters, pixel_type)?;
        let sampler = (self.spec.build)(&params, pixel_type)?;
        sampler.check_representable(pixel_type)?;
        debug!(
            "Built {} sampler for {} pixels.",
            self.spec.name, pixel_type
        );
        Ok(sampler)
    }
}

/// Name-indexed view over the distribution table.
#[non_exhaustive]
pub struct DistributionRegistry {
    specs: &'static [DistributionSpec],
    by_name: HashMap<&'static str, usize>,
}

impl DistributionRegistry {
    /// Returns the process-wide registry of built-in distributions.
    pub fn builtin() -> &'static DistributionRegistry {
        static REGISTRY: OnceLock<DistributionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let by_name = BUILTIN
                .iter()
                .enumerate()
                .map(|(i, spec)| (spec.name, i))
                .collect();
            DistributionRegistry {
                specs: BUILTIN,
                by_name,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns the schema of distribution `name` (case-sensitive).
    pub fn schema_for(&self, name: &str) -> Option<&'static DistributionSpec> {
        let specs = self.specs;
        self.by_name.get(name).map(|&i| &specs[i])
    }

    pub fn sampler_for(&self, name: &str) -> Option<SamplerBuilder> {
        self.schema_for(name).map(|spec| SamplerBuilder { spec })
    }

    /// Distribution names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.specs.iter().map(|s| s.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static DistributionSpec> {
        self.specs.iter()
    }
}

impl fmt::Debug for DistributionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Shorthand for [`DistributionRegistry::builtin`]`().schema_for(name)`.
pub fn schema_for(name: &str) -> Option<&'static DistributionSpec> {
    DistributionRegistry::builtin().schema_for(name)
}

/// Shorthand for [`DistributionRegistry::builtin`]`().sampler_for(name)`.
pub fn sampler_for(name: &str) -> Option<SamplerBuilder> {
    DistributionRegistry::builtin().sampler_for(name)
}

use ParamKind::{Integer as Int, Real, RealList};

const fn req(name: &'static str, kind: ParamKind) -> ParameterSpec {
    ParameterSpec::required(name, kind)
}

const fn real_or(name: &'static str, default: f64) -> ParameterSpec {
    ParameterSpec::optional(name, Real, ParamDefault::Real(default))
}

static BUILTIN: &[DistributionSpec] = &[
    DistributionSpec {
        name: "uniform_integer",
        family: Family::Integer,
        parameters: &[
            ParameterSpec::optional("a", Int, ParamDefault::TypeMin),
            ParameterSpec::optional("b", Int, ParamDefault::TypeMax),
        ],
        build: integer::build_uniform_integer,
    },
    DistributionSpec {
        name: "bernoulli",
        family: Family::Integer,
        parameters: &[real_or("p", 0.5)],
        build: integer::build_bernoulli,
    },
    DistributionSpec {
        name: "binomial",
        family: Family::Integer,
        parameters: &[req("t", Int), req("p", Real)],
        build: integer::build_binomial,
    },
    DistributionSpec {
        name: "negative_binomial",
        family: Family::Integer,
        parameters: &[req("k", Int), req("p", Real)],
        build: integer::build_negative_binomial,
    },
    DistributionSpec {
        name: "geometric",
        family: Family::Integer,
        parameters: &[req("p", Real)],
        build: integer::build_geometric,
    },
    DistributionSpec {
        name: "poisson",
        family: Family::Integer,
        parameters: &[req("mean", Real)],
        build: integer::build_poisson,
    },
    DistributionSpec {
        name: "discrete",
        family: Family::Integer,
        parameters: &[req("weights", RealList)],
        build: integer::build_discrete,
    },
    DistributionSpec {
        name: "uniform_real",
        family: Family::Real,
        parameters: &[real_or("a", 0.0), real_or("b", 1.0)],
        build: real::build_uniform_real,
    },
    DistributionSpec {
        name: "normal",
        family: Family::Real,
        parameters: &[real_or("mean", 0.0), real_or("stddev", 1.0)],
        build: real::build_normal,
    },
    DistributionSpec {
        name: "lognormal",
        family: Family::Real,
        parameters: &[real_or("m", 0.0), real_or("s", 1.0)],
        build: real::build_lognormal,
    },
    DistributionSpec {
        name: "gamma",
        family: Family::Real,
        parameters: &[req("alpha", Real), real_or("beta", 1.0)],
        build: real::build_gamma,
    },
    DistributionSpec {
        name: "exponential",
        family: Family::Real,
        parameters: &[real_or("lambda", 1.0)],
        build: real::build_exponential,
    },
    DistributionSpec {
        name: "weibull",
        family: Family::Real,
        parameters: &[req("a", Real), req("b", Real)],
        build: real::build_weibull,
    },
    DistributionSpec {
        name: "extreme_value",
        family: Family::Real,
        parameters: &[real_or("a", 0.0), real_or("b", 1.0)],
        build: real::build_extreme_value,
    },
    DistributionSpec {
        name: "cauchy",
        family: Family::Real,
        parameters: &[real_or("a", 0.0), real_or("b", 1.0)],
        build: real::build_cauchy,
    },
    DistributionSpec {
        name: "fisher_f",
        family: Family::Real,
        parameters: &[req("m", Real), req("n", Real)],
        build: real::build_fisher_f,
    },
    DistributionSpec {
        name: "student_t",
        family: Family::Real,
        parameters: &[req("n", Real)],
        build: real::build_student_t,
    },
    DistributionSpec {
        name: "chi_squared",
        family: Family::Real,
        parameters: &[req("n", Real)],
        build: real::build_chi_squared,
    },
    DistributionSpec {
        name: "piecewise_constant",
        family: Family::Real,
        parameters: &[req("intervals", RealList), req("densities", RealList)],
        build: real::build_piecewise_constant,
    },
    DistributionSpec {
        name: "piecewise_linear",
        family: Family::Real,
        parameters: &[req("intervals", RealList), req("densities", RealList)],
        build: real::build_piecewise_linear,
    },
];
