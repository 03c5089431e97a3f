//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`], the crate-wide [Result] alias and the
//! payload-free [`ErrorKind`] taxonomy. Variants cover malformed descriptors, missing or
//! mistyped fields, unsupported pixel types and distributions, inconsistent parameter
//! ranges, rejected opens, descriptor IO, invalid read requests and bad open configuration.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`enum@Error`], stable across message wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseFailure,
    MissingField,
    UnsupportedType,
    InvalidDimensions,
    UnsupportedDistribution,
    InvalidParameterType,
    InvalidRange,
    OpenRejected,
    Io,
    InvalidWindow,
    InvalidConfig,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed descriptor: {0}")]
    Parse(String),

    #[error("Missing required field '{name}'")]
    MissingField { name: String },

    #[error("Unknown or unsupported pixel data type: {name}")]
    UnsupportedType { name: String },

    #[error("Distribution '{distribution}' cannot produce values for pixel type {pixel_type}")]
    IncompatiblePixelType {
        distribution: String,
        pixel_type: String,
    },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("{name} is not a supported distribution type")]
    UnsupportedDistribution { name: String },

    #[error("Type error for parameter '{name}': expected {expected}, found {found}")]
    InvalidParameterType {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("{driver} open rejected: {source}")]
    OpenRejected {
        driver: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to read descriptor '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Descriptor '{name}' is {size} bytes, above the {limit} byte limit")]
    DescriptorTooLarge { name: String, size: u64, limit: u64 },

    #[error("Invalid read window: {0}")]
    InvalidWindow(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns the taxonomy case of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(_) => ErrorKind::ParseFailure,
            Error::MissingField { .. } => ErrorKind::MissingField,
            Error::UnsupportedType { .. } | Error::IncompatiblePixelType { .. } => {
                ErrorKind::UnsupportedType
            }
            Error::InvalidDimensions(_) => ErrorKind::InvalidDimensions,
            Error::UnsupportedDistribution { .. } => ErrorKind::UnsupportedDistribution,
            Error::InvalidParameterType { .. } => ErrorKind::InvalidParameterType,
            Error::InvalidRange(_) => ErrorKind::InvalidRange,
            Error::OpenRejected { .. } | Error::DescriptorTooLarge { .. } => {
                ErrorKind::OpenRejected
            }
            Error::Io { .. } => ErrorKind::Io,
            Error::InvalidWindow(_) => ErrorKind::InvalidWindow,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Returns the kind of the innermost error, looking through [`Error::OpenRejected`].
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            Error::OpenRejected { source, .. } => source.root_kind(),
            other => other.kind(),
        }
    }

    pub(crate) fn missing_field(name: impl Into<String>) -> Self {
        Error::MissingField { name: name.into() }
    }

    pub(crate) fn invalid_parameter_type(
        name: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Error::InvalidParameterType {
            name: name.into(),
            expected,
            found: describe_json(found),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Parse(value.to_string())
    }
}

/// Short description of a JSON value for error messages, e.g. `string "hello"`.
pub(crate) fn describe_json(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string \"{s}\""),
        Value::Array(_) => "array".to_owned(),
        Value::Object(_) => "object".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn open_rejected_message_includes_cause() {
        let err = Error::OpenRejected {
            driver: "RANDOM_RASTER",
            source: Box::new(Error::InvalidRange(
                "For uniform_integer, 'a' must not be greater than 'b'.".into(),
            )),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid range"));
        assert!(msg.contains("'a' must not be greater than 'b'"));
        assert_eq!(err.kind(), ErrorKind::OpenRejected);
        assert_eq!(err.root_kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn parameter_type_error_names_parameter_and_value() {
        let err = Error::invalid_parameter_type("a", "integer", &json!("hello"));
        assert_eq!(
            err.to_string(),
            "Type error for parameter 'a': expected integer, found string \"hello\""
        );
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
    }

    #[test]
    fn json_errors_become_parse_failures() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{\"rows\": ")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        assert!(err.to_string().starts_with("Malformed descriptor"));
    }

    #[test]
    fn incompatible_pixel_type_is_an_unsupported_type() {
        let err = Error::IncompatiblePixelType {
            distribution: "normal".into(),
            pixel_type: "Int16".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }
}
