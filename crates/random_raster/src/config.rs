//! Settings that control how descriptors are read and opened.
use crate::error::{Error, Result};

/// Largest descriptor accepted by default (10 MiB).
pub const DEFAULT_MAX_DESCRIPTOR_BYTES: u64 = 10 * 1024 * 1024;

/// Block edge used when a descriptor does not set `block_rows`/`block_cols`.
pub const DEFAULT_BLOCK_EDGE: usize = 256;

/// Configuration for parsing and opening descriptors.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConfig {
    /// Upper bound on the descriptor size in bytes.
    pub max_descriptor_bytes: u64,
    /// Natural block size `(rows, cols)` when the descriptor does not specify one.
    pub default_block_size: (usize, usize),
    /// Reject unknown distribution parameters instead of logging and ignoring them.
    pub deny_unknown_parameters: bool,
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            max_descriptor_bytes: DEFAULT_MAX_DESCRIPTOR_BYTES,
            default_block_size: (DEFAULT_BLOCK_EDGE, DEFAULT_BLOCK_EDGE),
            deny_unknown_parameters: false,
        }
    }
}

impl OpenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the descriptor size limit.
    pub fn with_max_descriptor_bytes(mut self, max_descriptor_bytes: u64) -> Self {
        self.max_descriptor_bytes = max_descriptor_bytes;
        self
    }

    /// Sets the fallback block size.
    pub fn with_default_block_size(mut self, rows: usize, cols: usize) -> Self {
        self.default_block_size = (rows, cols);
        self
    }

    pub fn with_deny_unknown_parameters(mut self, deny: bool) -> Self {
        self.deny_unknown_parameters = deny;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_descriptor_bytes == 0 {
            return Err(Error::InvalidConfig(
                "max_descriptor_bytes must be > 0".into(),
            ));
        }
        if self.default_block_size.0 == 0 || self.default_block_size.1 == 0 {
            return Err(Error::InvalidConfig(
                "default_block_size must be > 0 in both dimensions".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_valid() {
        let config = OpenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_descriptor_bytes, 10 * 1024 * 1024);
        assert_eq!(config.default_block_size, (256, 256));
        assert!(!config.deny_unknown_parameters);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = OpenConfig::new()
            .with_default_block_size(0, 16)
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(OpenConfig::new()
            .with_max_descriptor_bytes(0)
            .validate()
            .is_err());
    }
}
