//! Distribution parameters and their schema.
//!
//! A [`ParameterSpec`] describes one named parameter of a distribution. Raw JSON parameter
//! objects are checked against the schema by [`ParameterSet::resolve`], which reads each
//! value strictly (no string-to-number coercion), checks integer parameters against the
//! pixel type, fills defaults and reports unknown keys.
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::descriptor::PixelType;
use crate::error::{Error, Result};

/// Value shape of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// JSON integer, read in the pixel type's domain.
    Integer,
    /// Any JSON number.
    Real,
    /// JSON array of numbers.
    RealList,
}

impl ParamKind {
    fn expected(self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Real => "number",
            ParamKind::RealList => "array of numbers",
        }
    }
}

/// Value used when a parameter is absent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamDefault {
    Required,
    Integer(i128),
    Real(f64),
    /// Lowest value of the pixel type.
    TypeMin,
    /// Highest value of the pixel type.
    TypeMax,
    /// Empty list.
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamDefault,
}

impl ParameterSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            default: ParamDefault::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, default: ParamDefault) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }

    pub fn is_required(&self) -> bool {
        self.default == ParamDefault::Required
    }

    fn default_value(&self, pixel_type: PixelType) -> Result<Option<ParamValue>> {
        let value = match self.default {
            ParamDefault::Required => return Ok(None),
            ParamDefault::Integer(v) => ParamValue::Integer(v),
            ParamDefault::Real(v) => ParamValue::Real(v),
            ParamDefault::Empty => ParamValue::RealList(Vec::new()),
            ParamDefault::TypeMin | ParamDefault::TypeMax => {
                let (lo, hi) = pixel_type.integer_range().ok_or_else(|| {
                    Error::InvalidParameterType {
                        name: self.name.to_owned(),
                        expected: "integer",
                        found: format!("pixel type {pixel_type}"),
                    }
                })?;
                if self.default == ParamDefault::TypeMin {
                    ParamValue::Integer(lo)
                } else {
                    ParamValue::Integer(hi)
                }
            }
        };
        Ok(Some(value))
    }

    fn read(&self, value: &Value, pixel_type: PixelType) -> Result<ParamValue> {
        match self.kind {
            ParamKind::Integer => {
                let v = value
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| value.as_u64().map(i128::from))
                    .ok_or_else(|| Error::invalid_parameter_type(self.name, "integer", value))?;
                if !pixel_type.contains_integer(v) {
                    return Err(Error::InvalidRange(format!(
                        "parameter '{}' = {v} is not representable as {pixel_type}",
                        self.name
                    )));
                }
                Ok(ParamValue::Integer(v))
            }
            ParamKind::Real => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| Error::invalid_parameter_type(self.name, "number", value))?;
                if !pixel_type.is_integer() && !pixel_type.contains_real(v) {
                    return Err(Error::InvalidRange(format!(
                        "parameter '{}' = {v} is not representable as {pixel_type}",
                        self.name
                    )));
                }
                Ok(ParamValue::Real(v))
            }
            ParamKind::RealList => {
                let items = value.as_array().ok_or_else(|| {
                    Error::invalid_parameter_type(self.name, "array of numbers", value)
                })?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        item.as_f64().ok_or_else(|| {
                            Error::invalid_parameter_type(
                                format!("{}[{i}]", self.name),
                                "number",
                                item,
                            )
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(ParamValue::RealList)
            }
        }
    }
}

/// A typed parameter value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i128),
    Real(f64),
    RealList(Vec<f64>),
}

/// Resolved parameters of one distribution, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads an integer parameter.
    pub fn integer(&self, name: &str) -> Result<i128> {
        match self.values.get(name) {
            Some(ParamValue::Integer(v)) => Ok(*v),
            Some(other) => Err(Error::InvalidParameterType {
                name: name.to_owned(),
                expected: "integer",
                found: describe(other),
            }),
            None => Err(missing(name)),
        }
    }

    /// Reads a real parameter. Integer values widen to `f64`.
    pub fn real(&self, name: &str) -> Result<f64> {
        match self.values.get(name) {
            Some(ParamValue::Real(v)) => Ok(*v),
            Some(ParamValue::Integer(v)) => Ok(*v as f64),
            Some(other) => Err(Error::InvalidParameterType {
                name: name.to_owned(),
                expected: "number",
                found: describe(other),
            }),
            None => Err(missing(name)),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[f64]> {
        match self.values.get(name) {
            Some(ParamValue::RealList(v)) => Ok(v),
            Some(other) => Err(Error::InvalidParameterType {
                name: name.to_owned(),
                expected: "array of numbers",
                found: describe(other),
            }),
            None => Err(missing(name)),
        }
    }

    /// Reads a raw JSON parameter object against `schema`.
    ///
    /// Unknown keys are logged and ignored, or rejected when `deny_unknown` is set.
    pub fn resolve(
        distribution: &str,
        schema: &[ParameterSpec],
        raw: &Map<String, Value>,
        pixel_type: PixelType,
        deny_unknown: bool,
    ) -> Result<Self> {
        for (key, value) in raw {
            if schema.iter().any(|p| p.name == key) {
                continue;
            }
            if deny_unknown {
                return Err(Error::invalid_parameter_type(
                    key.as_str(),
                    "a known parameter name",
                    value,
                ));
            }
            warn!("Ignoring unknown parameter '{}' for {}.", key, distribution);
        }

        let mut set = ParameterSet::new();
        for spec in schema {
            match raw.get(spec.name) {
                Some(value) => {
                    set.insert(spec.name, spec.read(value, pixel_type)?);
                }
                None => {
                    let value = spec.default_value(pixel_type)?.ok_or_else(|| missing(spec.name))?;
                    set.insert(spec.name, value);
                }
            }
        }
        Ok(set)
    }

    /// Fills absent parameters with schema defaults and checks the kinds of present ones.
    pub fn completed(&self, schema: &[ParameterSpec], pixel_type: PixelType) -> Result<Self> {
        let mut set = self.clone();
        for spec in schema {
            match self.values.get(spec.name) {
                Some(value) => check_kind(spec, value)?,
                None => {
                    let value = spec.default_value(pixel_type)?.ok_or_else(|| missing(spec.name))?;
                    set.insert(spec.name, value);
                }
            }
        }
        Ok(set)
    }
}

fn check_kind(spec: &ParameterSpec, value: &ParamValue) -> Result<()> {
    let ok = matches!(
        (spec.kind, value),
        (ParamKind::Integer, ParamValue::Integer(_))
            | (ParamKind::Real, ParamValue::Real(_) | ParamValue::Integer(_))
            | (ParamKind::RealList, ParamValue::RealList(_))
    );
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidParameterType {
            name: spec.name.to_owned(),
            expected: spec.kind.expected(),
            found: describe(value),
        })
    }
}

fn missing(name: &str) -> Error {
    Error::missing_field(format!("distribution_parameters.{name}"))
}

fn describe(value: &ParamValue) -> String {
    match value {
        ParamValue::Integer(v) => format!("integer {v}"),
        ParamValue::Real(v) => format!("number {v}"),
        ParamValue::RealList(v) => format!("array of {} numbers", v.len()),
    }
}
