//! Driver registration, identification and opening.
//!
//! The random raster driver is registered explicitly into a process-wide [`DriverManager`]
//! with [`register_random_raster_driver`]. Opening follows the usual data source protocol:
//! - [`Driver::identify`] decides quietly whether a source is a random raster descriptor.
//! - [`Driver::try_open`] parses, validates and builds a dataset, or explains why not.
//! - [`Driver::open_document`] builds a dataset from a document `identify` already parsed.
//! - [`Driver::open`] does both and records failures in the per-thread [`last_error`]
//!   channel.
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::OpenConfig;
use crate::descriptor::{is_random_raster_json, RasterDescriptor, DESCRIPTOR_TYPE};
use crate::error::{Error, Result};
use crate::raster::RandomRasterDataset;

pub mod last_error;
pub mod open_info;

pub use last_error::{error_reset, last_error, last_error_kind, last_error_msg, LastError};
pub use open_info::{DescriptorSource, OpenInfo};

/// Short name of the random raster driver.
pub const DRIVER_NAME: &str = "RANDOM_RASTER";

pub const DMD_LONGNAME: &str = "DMD_LONGNAME";
pub const DMD_HELPTOPIC: &str = "DMD_HELPTOPIC";
pub const DMD_EXTENSION: &str = "DMD_EXTENSION";
pub const DCAP_RASTER: &str = "DCAP_RASTER";
pub const DCAP_VIRTUALIO: &str = "DCAP_VIRTUALIO";

/// A raster format driver.
#[derive(Debug)]
pub struct Driver {
    description: String,
    metadata: BTreeMap<String, String>,
    config: OpenConfig,
}

impl Driver {
    /// The random raster driver with the default [`OpenConfig`].
    pub fn random_raster() -> Self {
        Self::build(OpenConfig::default())
    }

    /// The random raster driver with a custom configuration.
    pub fn random_raster_with(config: OpenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: OpenConfig) -> Self {
        let metadata = [
            (DMD_LONGNAME, "Random Distribution Raster"),
            (
                DMD_HELPTOPIC,
                "https://github.com/ahhz/random-raster/blob/main/docs/random_raster_driver.md",
            ),
            (DCAP_VIRTUALIO, "YES"),
            (DCAP_RASTER, "YES"),
            (DMD_EXTENSION, "json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        Self {
            description: DRIVER_NAME.to_owned(),
            metadata,
            config,
        }
    }

    /// Short name, e.g. `RANDOM_RASTER`.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metadata_item(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn config(&self) -> &OpenConfig {
        &self.config
    }

    /// Returns true if `info` holds a random raster descriptor.
    ///
    /// The source needs a JSON signature, must fit the size limit and must parse as JSON
    /// with `"type": "RANDOM_RASTER"`. Never fails; unreadable sources are not identified.
    pub fn identify(&self, info: &OpenInfo) -> bool {
        self.identified_document(info).is_some()
    }

    /// The parsed descriptor document of `info`, if this driver identifies it.
    pub fn identified_document(&self, info: &OpenInfo) -> Option<Value> {
        if !info.has_json_signature() {
            return None;
        }
        self.read_document(info).ok().filter(is_random_raster_json)
    }

    fn read_document(&self, info: &OpenInfo) -> Result<Value> {
        let bytes = info.read(self.config.max_descriptor_bytes)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Opens `info` as a dataset, wrapping any failure in [`Error::OpenRejected`].
    pub fn try_open(&self, info: &OpenInfo) -> Result<RandomRasterDataset> {
        self.read_document(info)
            .and_then(|document| self.build_dataset(info, &document))
            .map_err(rejected_open)
    }

    /// Builds a dataset from a document already read from `info`.
    pub fn open_document(
        &self,
        info: &OpenInfo,
        document: &Value,
    ) -> Result<RandomRasterDataset> {
        self.build_dataset(info, document).map_err(rejected_open)
    }

    fn build_dataset(&self, info: &OpenInfo, document: &Value) -> Result<RandomRasterDataset> {
        if !is_random_raster_json(document) {
            return Err(Error::Parse(format!(
                "'type' must be \"{DESCRIPTOR_TYPE}\""
            )));
        }
        let descriptor = RasterDescriptor::from_json_with(document, &self.config)?;
        let dataset = RandomRasterDataset::new(descriptor)?;
        info!(
            "Opened '{}': {}x{} {} from {}.",
            info.name(),
            dataset.width(),
            dataset.height(),
            dataset.pixel_type(),
            dataset.descriptor().distribution
        );
        Ok(dataset)
    }

    /// Opens `info` if it is identified as a random raster.
    ///
    /// Resets the error channel first. Returns `None` quietly for sources that are not
    /// random rasters; for identified sources that fail to open, the reason is recorded
    /// and readable through [`last_error_msg`].
    pub fn open(&self, info: &OpenInfo) -> Option<RandomRasterDataset> {
        error_reset();
        match self.identified_document(info) {
            Some(document) => self.open_identified(info, &document),
            None => {
                debug!("'{}' is not a {} source.", info.name(), DRIVER_NAME);
                None
            }
        }
    }

    fn open_identified(&self, info: &OpenInfo, document: &Value) -> Option<RandomRasterDataset> {
        match self.open_document(info, document) {
            Ok(dataset) => Some(dataset),
            Err(err) => {
                warn!("Failed to open '{}': {}", info.name(), err);
                last_error::set_last_error(&err);
                None
            }
        }
    }
}

fn rejected_open(source: Error) -> Error {
    Error::OpenRejected {
        driver: DRIVER_NAME,
        source: Box::new(source),
    }
}

/// Process-wide set of registered drivers.
#[derive(Debug, Default)]
pub struct DriverManager {
    drivers: RwLock<Vec<Arc<Driver>>>,
}

impl DriverManager {
    /// Adds `driver` unless one with the same name is registered. Returns true if added.
    pub fn register(&self, driver: Driver) -> bool {
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        if drivers.iter().any(|d| d.description() == driver.description()) {
            return false;
        }
        info!("Registered driver '{}'.", driver.description());
        drivers.push(Arc::new(driver));
        true
    }

    pub fn get_driver_by_name(&self, name: &str) -> Option<Arc<Driver>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.description() == name)
            .cloned()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Short names of registered drivers, keyed to their long names.
    pub fn driver_names(&self) -> HashMap<String, String> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| {
                let long = d.metadata_item(DMD_LONGNAME).unwrap_or_default().to_owned();
                (d.description().to_owned(), long)
            })
            .collect()
    }

    /// Opens `info` with the first driver that identifies it.
    ///
    /// The source is read and parsed once per driver asked; the identifying driver opens
    /// the document it already parsed.
    pub fn open(&self, info: &OpenInfo) -> Option<RandomRasterDataset> {
        error_reset();
        let drivers = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for driver in drivers {
            if let Some(document) = driver.identified_document(info) {
                return driver.open_identified(info, &document);
            }
        }
        debug!("No driver identified '{}'.", info.name());
        None
    }
}

/// Returns the process-wide driver manager.
pub fn driver_manager() -> &'static DriverManager {
    static MANAGER: OnceLock<DriverManager> = OnceLock::new();
    MANAGER.get_or_init(DriverManager::default)
}

/// Registers the random raster driver. Repeated calls are no-ops.
pub fn register_random_raster_driver() {
    let manager = driver_manager();
    if manager.get_driver_by_name(DRIVER_NAME).is_some() {
        return;
    }
    manager.register(Driver::random_raster());
}
