#![forbid(unsafe_code)]
//! random_raster: Raster data source that synthesizes reproducible pixels from a JSON
//! distribution descriptor.
//!
//! Modules:
//! - descriptor: parse and validate descriptors, pixel types, distribution parameters
//! - distribution: registry of distributions and their samplers
//! - stream: per-pixel deterministic random streams
//! - raster: datasets, bands, windowed and block reads, statistics
//! - driver: registration, identification, opening and the last-error channel
//!
//! Pixel values depend only on `(seed, row, col)`, so any window read in any order or
//! from any thread yields the same bytes.
pub mod config;
pub mod descriptor;
pub mod distribution;
pub mod driver;
pub mod error;
pub mod raster;
pub mod stream;

/// Convenient re-exports for common types. Import with `use random_raster::prelude::*;`.
pub mod prelude {
    pub use crate::config::OpenConfig;
    pub use crate::descriptor::{
        parse_descriptor, parse_descriptor_with, ParamValue, ParameterSet, PixelType,
        RasterDescriptor,
    };
    pub use crate::distribution::{
        DistributionRegistry, DistributionSpec, Family, SampleContext, SampleValue, Sampler,
        SamplerBuilder,
    };
    pub use crate::driver::{
        driver_manager, error_reset, last_error_kind, last_error_msg,
        register_random_raster_driver, Driver, DriverManager, OpenInfo,
    };
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::raster::{BandStatistics, PixelBlock, RandomRasterDataset, RasterBand, Window};
    pub use crate::stream::{value_at, PixelStream};
}
