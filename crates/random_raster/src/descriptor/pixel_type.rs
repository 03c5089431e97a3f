//! Pixel data types and their native encodings.
//!
//! [`PixelType`] names the numeric representation of a band. It knows its representable
//! range, its byte width, and how to encode a [`SampleValue`] into native-endian bytes.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::distribution::SampleValue;
use crate::error::Error;

/// Numeric representation of generated pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PixelType {
    Byte,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl PixelType {
    pub const ALL: [PixelType; 10] = [
        PixelType::Byte,
        PixelType::Int8,
        PixelType::UInt16,
        PixelType::Int16,
        PixelType::UInt32,
        PixelType::Int32,
        PixelType::UInt64,
        PixelType::Int64,
        PixelType::Float32,
        PixelType::Float64,
    ];

    /// Canonical (case-sensitive) name, as written in descriptors.
    pub fn name(self) -> &'static str {
        match self {
            PixelType::Byte => "Byte",
            PixelType::Int8 => "Int8",
            PixelType::UInt16 => "UInt16",
            PixelType::Int16 => "Int16",
            PixelType::UInt32 => "UInt32",
            PixelType::Int32 => "Int32",
            PixelType::UInt64 => "UInt64",
            PixelType::Int64 => "Int64",
            PixelType::Float32 => "Float32",
            PixelType::Float64 => "Float64",
        }
    }

    /// Looks up a pixel type by name. `UInt8` is accepted as an alias of `Byte`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "UInt8" {
            return Some(PixelType::Byte);
        }
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Width of one pixel in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            PixelType::Byte | PixelType::Int8 => 1,
            PixelType::UInt16 | PixelType::Int16 => 2,
            PixelType::UInt32 | PixelType::Int32 | PixelType::Float32 => 4,
            PixelType::UInt64 | PixelType::Int64 | PixelType::Float64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    /// Inclusive integer range, or `None` for floating point types.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            PixelType::Byte => (u8::MIN as i128, u8::MAX as i128),
            PixelType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            PixelType::UInt16 => (u16::MIN as i128, u16::MAX as i128),
            PixelType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            PixelType::UInt32 => (u32::MIN as i128, u32::MAX as i128),
            PixelType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            PixelType::UInt64 => (u64::MIN as i128, u64::MAX as i128),
            PixelType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            PixelType::Float32 | PixelType::Float64 => return None,
        };
        Some(range)
    }

    /// Inclusive range as `f64` (lowest and highest finite values for floats).
    pub fn real_range(self) -> (f64, f64) {
        match self {
            PixelType::Float32 => (f32::MIN as f64, f32::MAX as f64),
            PixelType::Float64 => (f64::MIN, f64::MAX),
            _ => {
                let (lo, hi) = self.integer_range().unwrap_or((0, 0));
                (lo as f64, hi as f64)
            }
        }
    }

    pub fn contains_integer(self, value: i128) -> bool {
        match self.integer_range() {
            Some((lo, hi)) => (lo..=hi).contains(&value),
            None => {
                let (lo, hi) = self.real_range();
                (lo..=hi).contains(&(value as f64))
            }
        }
    }

    pub fn contains_real(self, value: f64) -> bool {
        let (lo, hi) = self.real_range();
        (lo..=hi).contains(&value)
    }

    /// Writes `value` into `out` in this type's native-endian encoding.
    ///
    /// Values beyond the representable range saturate at the type limits; real values
    /// written to integer types are rounded to the nearest integer first.
    /// `out` must be exactly [`PixelType::size_bytes`] long.
    pub fn encode(self, value: SampleValue, out: &mut [u8]) {
        macro_rules! encode_int {
            ($t:ty) => {{
                let v: $t = match value {
                    SampleValue::Integer(i) => i.clamp(<$t>::MIN as i128, <$t>::MAX as i128) as $t,
                    SampleValue::Real(r) => r.round() as $t,
                };
                out.copy_from_slice(&v.to_ne_bytes());
            }};
        }

        match self {
            PixelType::Byte => encode_int!(u8),
            PixelType::Int8 => encode_int!(i8),
            PixelType::UInt16 => encode_int!(u16),
            PixelType::Int16 => encode_int!(i16),
            PixelType::UInt32 => encode_int!(u32),
            PixelType::Int32 => encode_int!(i32),
            PixelType::UInt64 => encode_int!(u64),
            PixelType::Int64 => encode_int!(i64),
            PixelType::Float32 => {
                let v = value.as_f64().clamp(f32::MIN as f64, f32::MAX as f64) as f32;
                out.copy_from_slice(&v.to_ne_bytes());
            }
            PixelType::Float64 => {
                let v = value.as_f64().clamp(f64::MIN, f64::MAX);
                out.copy_from_slice(&v.to_ne_bytes());
            }
        }
    }

    /// Reads one native-endian pixel from the front of `bytes`.
    pub fn decode(self, bytes: &[u8]) -> SampleValue {
        macro_rules! decode_int {
            ($t:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                SampleValue::Integer(<$t>::from_ne_bytes(buf) as i128)
            }};
        }

        match self {
            PixelType::Byte => decode_int!(u8),
            PixelType::Int8 => decode_int!(i8),
            PixelType::UInt16 => decode_int!(u16),
            PixelType::Int16 => decode_int!(i16),
            PixelType::UInt32 => decode_int!(u32),
            PixelType::Int32 => decode_int!(i32),
            PixelType::UInt64 => decode_int!(u64),
            PixelType::Int64 => decode_int!(i64),
            PixelType::Float32 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&bytes[..4]);
                SampleValue::Real(f32::from_ne_bytes(buf) as f64)
            }
            PixelType::Float64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                SampleValue::Real(f64::from_ne_bytes(buf))
            }
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelType::from_name(s).ok_or_else(|| Error::UnsupportedType { name: s.to_owned() })
    }
}
