//! Raster descriptors: the JSON documents that define a random raster.
//!
//! A descriptor names the raster size, the pixel type, the seed and a distribution with
//! its parameters:
//!
//! ```json
//! {
//!   "type": "RANDOM_RASTER",
//!   "rows": 64, "cols": 64,
//!   "data_type": "Int16",
//!   "seed": 123,
//!   "distribution": "uniform_integer",
//!   "distribution_parameters": { "a": -100, "b": 100 }
//! }
//! ```
//!
//! Parsing works over [`serde_json::Value`] with strict type checks so every failure maps
//! onto one [`ErrorKind`](crate::error::ErrorKind).
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::OpenConfig;
use crate::distribution::registry::{self, DistributionSpec};
use crate::distribution::Sampler;
use crate::error::{describe_json, Error, Result};

pub mod params;
pub mod pixel_type;

pub use params::{ParamDefault, ParamKind, ParamValue, ParameterSet, ParameterSpec};
pub use pixel_type::PixelType;

/// Value of the `type` field that marks a random raster descriptor.
pub const DESCRIPTOR_TYPE: &str = "RANDOM_RASTER";

const REQUIRED_FIELDS: [&str; 6] = [
    "rows",
    "cols",
    "data_type",
    "seed",
    "distribution",
    "distribution_parameters",
];

/// Parsed, type-checked raster definition. Immutable once built.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RasterDescriptor {
    pub rows: usize,
    pub cols: usize,
    #[serde(rename = "data_type")]
    pub pixel_type: PixelType,
    pub seed: u64,
    pub distribution: String,
    #[serde(rename = "distribution_parameters")]
    pub parameters: ParameterSet,
    pub block_rows: usize,
    pub block_cols: usize,
}

impl RasterDescriptor {
    /// Creates a descriptor programmatically; parameters are resolved on [`Self::validate`].
    pub fn new(
        rows: usize,
        cols: usize,
        pixel_type: PixelType,
        seed: u64,
        distribution: impl Into<String>,
        parameters: ParameterSet,
    ) -> Self {
        let (block_rows, block_cols) = OpenConfig::default().default_block_size;
        Self {
            rows,
            cols,
            pixel_type,
            seed,
            distribution: distribution.into(),
            parameters,
            block_rows,
            block_cols,
        }
    }

    /// Sets the natural block size.
    pub fn with_block_size(mut self, rows: usize, cols: usize) -> Self {
        self.block_rows = rows;
        self.block_cols = cols;
        self
    }

    /// Reads a descriptor from a JSON value with the default [`OpenConfig`].
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_json_with(value, &OpenConfig::default())
    }

    /// Reads a descriptor from a JSON value.
    ///
    /// The `type` field is not checked here; see [`is_random_raster_json`].
    pub fn from_json_with(value: &Value, config: &OpenConfig) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            Error::Parse(format!(
                "root must be an object, found {}",
                describe_json(value)
            ))
        })?;

        if let Some(name) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
            return Err(Error::missing_field(*name));
        }

        let rows = read_dimension(obj, "rows")?;
        let cols = read_dimension(obj, "cols")?;
        let pixel_type = read_pixel_type(&obj["data_type"])?;
        let seed = read_seed(&obj["seed"])?;
        let spec = read_distribution(&obj["distribution"])?;
        spec.check_pixel_type(pixel_type)?;

        let raw_params = &obj["distribution_parameters"];
        let raw_params = raw_params.as_object().ok_or_else(|| {
            Error::invalid_parameter_type("distribution_parameters", "object", raw_params)
        })?;
        let parameters = ParameterSet::resolve(
            spec.name,
            spec.parameters,
            raw_params,
            pixel_type,
            config.deny_unknown_parameters,
        )?;

        let (default_rows, default_cols) = config.default_block_size;
        let block_rows = read_optional_dimension(obj, "block_rows")?.unwrap_or(default_rows);
        let block_cols = read_optional_dimension(obj, "block_cols")?.unwrap_or(default_cols);

        Ok(Self {
            rows,
            cols,
            pixel_type,
            seed,
            distribution: spec.name.to_owned(),
            parameters,
            block_rows,
            block_cols,
        })
    }

    /// Checks dimensions and builds the sampler, rejecting inconsistent parameters.
    pub fn validate(&self) -> Result<()> {
        self.sampler().map(|_| ())
    }

    /// Builds the validated sampler for this descriptor.
    pub fn sampler(&self) -> Result<Sampler> {
        for (name, value) in [
            ("rows", self.rows),
            ("cols", self.cols),
            ("block_rows", self.block_rows),
            ("block_cols", self.block_cols),
        ] {
            check_dimension(name, value)?;
        }
        let builder = registry::sampler_for(&self.distribution).ok_or_else(|| {
            Error::UnsupportedDistribution {
                name: self.distribution.clone(),
            }
        })?;
        builder.build(&self.parameters, self.pixel_type)
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    /// Serializes the effective descriptor (defaults filled in) as JSON.
    pub fn to_json(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert("type".to_owned(), Value::from(DESCRIPTOR_TYPE));
        }
        Ok(value)
    }
}

/// Parses and validates a descriptor document with the default [`OpenConfig`].
pub fn parse_descriptor(bytes: &[u8]) -> Result<RasterDescriptor> {
    parse_descriptor_with(bytes, &OpenConfig::default())
}

/// Parses and validates a descriptor document.
pub fn parse_descriptor_with(bytes: &[u8], config: &OpenConfig) -> Result<RasterDescriptor> {
    let value: Value = serde_json::from_slice(bytes)?;
    let descriptor = RasterDescriptor::from_json_with(&value, config)?;
    descriptor.validate()?;
    Ok(descriptor)
}

/// Returns true if `value` is an object whose `type` is `RANDOM_RASTER`.
pub fn is_random_raster_json(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some(DESCRIPTOR_TYPE)
}

fn check_dimension(name: &str, value: usize) -> Result<()> {
    if value == 0 || value > i32::MAX as usize {
        return Err(Error::InvalidDimensions(format!(
            "'{name}' must be between 1 and {}, found {value}",
            i32::MAX
        )));
    }
    Ok(())
}

fn read_dimension(obj: &Map<String, Value>, name: &str) -> Result<usize> {
    read_optional_dimension(obj, name)?.ok_or_else(|| Error::missing_field(name))
}

fn read_optional_dimension(obj: &Map<String, Value>, name: &str) -> Result<Option<usize>> {
    let Some(value) = obj.get(name) else {
        return Ok(None);
    };
    match value.as_i64() {
        Some(v) if v > 0 && v <= i64::from(i32::MAX) => Ok(Some(v as usize)),
        _ => Err(Error::InvalidDimensions(format!(
            "'{name}' must be a positive integer no larger than {}, found {}",
            i32::MAX,
            describe_json(value)
        ))),
    }
}

fn read_pixel_type(value: &Value) -> Result<PixelType> {
    match value.as_str() {
        Some(name) => name.parse(),
        None => Err(Error::UnsupportedType {
            name: describe_json(value),
        }),
    }
}

fn read_seed(value: &Value) -> Result<u64> {
    value
        .as_u64()
        .or_else(|| value.as_i64().map(|v| v as u64))
        .ok_or_else(|| Error::invalid_parameter_type("seed", "integer", value))
}

fn read_distribution(value: &Value) -> Result<&'static DistributionSpec> {
    let name = value.as_str().ok_or_else(|| Error::UnsupportedDistribution {
        name: describe_json(value),
    })?;
    registry::schema_for(name).ok_or_else(|| Error::UnsupportedDistribution {
        name: name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn scenario() -> Value {
        json!({
            "type": "RANDOM_RASTER",
            "rows": 64,
            "cols": 64,
            "data_type": "Int16",
            "seed": 123,
            "distribution": "uniform_integer",
            "distribution_parameters": { "a": -100, "b": 100 }
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut doc = scenario();
        doc[field] = value;
        doc
    }

    fn without(field: &str) -> Value {
        let mut doc = scenario();
        doc.as_object_mut().unwrap().remove(field);
        doc
    }

    fn parse(doc: &Value) -> Result<RasterDescriptor> {
        parse_descriptor(doc.to_string().as_bytes())
    }

    #[test]
    fn parses_scenario_descriptor() {
        let d = parse(&scenario()).unwrap();
        assert_eq!((d.rows, d.cols), (64, 64));
        assert_eq!(d.pixel_type, PixelType::Int16);
        assert_eq!(d.seed, 123);
        assert_eq!(d.distribution, "uniform_integer");
        assert_eq!(d.parameters.integer("a").unwrap(), -100);
        assert_eq!(d.parameters.integer("b").unwrap(), 100);
        assert_eq!((d.block_rows, d.block_cols), (256, 256));
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        let err = parse_descriptor(b"{\"rows\": 64,").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        let err = parse_descriptor(b"[1, 2]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn every_required_field_is_reported() {
        for field in REQUIRED_FIELDS {
            let err = parse(&without(field)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingField, "field {field}");
            assert!(err.to_string().contains(field));
        }
    }

    #[test]
    fn dimensions_must_be_positive_integers() {
        for bad in [json!(0), json!(-3), json!("64"), json!(6.5), json!(3_000_000_000u64)] {
            let err = parse(&with("rows", bad.clone())).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDimensions, "rows={bad}");
        }
        let err = parse(&with("block_cols", json!(0))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDimensions);
    }

    #[test]
    fn explicit_block_size_is_kept() {
        let mut doc = scenario();
        doc["block_rows"] = json!(16);
        doc["block_cols"] = json!(32);
        let d = parse(&doc).unwrap();
        assert_eq!((d.block_rows, d.block_cols), (16, 32));
    }

    #[test]
    fn unknown_pixel_type_is_unsupported() {
        for bad in [json!("Float16"), json!("int16"), json!(16)] {
            let err = parse(&with("data_type", bad)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        }
    }

    #[test]
    fn seed_must_be_an_integer() {
        let err = parse(&with("seed", json!("123"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
        let d = parse(&with("seed", json!(-1))).unwrap();
        assert_eq!(d.seed, u64::MAX);
    }

    #[test]
    fn unknown_distribution_is_reported_by_name() {
        let err = parse(&with("distribution", json!("zipf"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedDistribution);
        assert!(err.to_string().contains("zipf"));
    }

    #[test]
    fn reversed_bounds_are_an_invalid_range() {
        let doc = with("distribution_parameters", json!({ "a": 100, "b": -100 }));
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        let msg = err.to_string();
        assert!(msg.contains("Invalid range") || msg.contains("'a' must not be greater than 'b'"));
    }

    #[test]
    fn string_bounds_are_a_type_error() {
        let doc = with(
            "distribution_parameters",
            json!({ "a": "hello", "b": "world" }),
        );
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
    }

    #[test]
    fn negative_bound_for_unsigned_type_is_a_range_error() {
        let mut doc = with("distribution_parameters", json!({ "a": -5, "b": 10 }));
        doc["data_type"] = json!("UInt16");
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn real_distribution_on_integer_pixels_is_rejected() {
        let mut doc = with("distribution", json!("normal"));
        doc["distribution_parameters"] = json!({});
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn parameters_must_be_an_object() {
        let err = parse(&with("distribution_parameters", json!([1, 2]))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
    }

    #[test]
    fn to_json_round_trips_through_the_parser() {
        let d = parse(&scenario()).unwrap();
        let json = d.to_json().unwrap();
        assert!(is_random_raster_json(&json));
        assert_eq!(json["data_type"], "Int16");
        let again = RasterDescriptor::from_json(&json).unwrap();
        assert_eq!(again, d);
    }

    #[test]
    fn programmatic_descriptors_are_validated() {
        let d = RasterDescriptor::new(
            0,
            8,
            PixelType::Byte,
            1,
            "uniform_integer",
            ParameterSet::new(),
        );
        assert_eq!(d.validate().unwrap_err().kind(), ErrorKind::InvalidDimensions);

        let d = RasterDescriptor::new(8, 8, PixelType::Byte, 1, "zipf", ParameterSet::new());
        assert_eq!(
            d.validate().unwrap_err().kind(),
            ErrorKind::UnsupportedDistribution
        );
    }
}
