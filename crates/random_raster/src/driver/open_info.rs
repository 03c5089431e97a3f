//! Sources a descriptor can be opened from.
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Where descriptor bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorSource {
    /// A file on disk.
    Path(PathBuf),
    /// A named in-memory buffer, like a virtual file.
    Memory { name: String, bytes: Arc<[u8]> },
    /// The JSON text itself.
    Inline(String),
}

/// Everything a driver needs to identify and open a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenInfo {
    source: DescriptorSource,
}

impl OpenInfo {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DescriptorSource::Path(path.into()),
        }
    }

    /// An in-memory buffer named `name` (e.g. `/vsimem/scenario.json`).
    pub fn from_memory(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            source: DescriptorSource::Memory {
                name: name.into(),
                bytes: bytes.into(),
            },
        }
    }

    pub fn from_inline(json: impl Into<String>) -> Self {
        Self {
            source: DescriptorSource::Inline(json.into()),
        }
    }

    /// Interprets `name` the way a dataset name is usually given: text starting with `{`
    /// is inline JSON, anything else is a path.
    pub fn from_name(name: &str) -> Self {
        if name.trim_start().starts_with('{') {
            Self::from_inline(name)
        } else {
            Self::from_path(name)
        }
    }

    pub fn source(&self) -> &DescriptorSource {
        &self.source
    }

    /// Display name of the source.
    pub fn name(&self) -> Cow<'_, str> {
        match &self.source {
            DescriptorSource::Path(path) => path.to_string_lossy(),
            DescriptorSource::Memory { name, .. } => Cow::Borrowed(name.as_str()),
            DescriptorSource::Inline(_) => Cow::Borrowed("<inline>"),
        }
    }

    /// True for names ending in `.json` (any case) and for inline text starting with `{`.
    pub fn has_json_signature(&self) -> bool {
        match &self.source {
            DescriptorSource::Path(path) => has_json_extension(path),
            DescriptorSource::Memory { name, .. } => has_json_extension(Path::new(name)),
            DescriptorSource::Inline(text) => text.trim_start().starts_with('{'),
        }
    }

    /// Reads the descriptor bytes, refusing sources above `limit` bytes.
    pub fn read(&self, limit: u64) -> Result<Cow<'_, [u8]>> {
        let too_large = |size: u64| Error::DescriptorTooLarge {
            name: self.name().into_owned(),
            size,
            limit,
        };
        match &self.source {
            DescriptorSource::Path(path) => {
                let io_err = |source: std::io::Error| Error::Io {
                    path: path.clone(),
                    source,
                };
                let meta = fs::metadata(path).map_err(io_err)?;
                if !meta.is_file() {
                    return Err(Error::Io {
                        path: path.clone(),
                        source: std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "not a regular file",
                        ),
                    });
                }
                if meta.len() > limit {
                    return Err(too_large(meta.len()));
                }
                fs::read(path).map(Cow::Owned).map_err(io_err)
            }
            DescriptorSource::Memory { bytes, .. } => {
                if bytes.len() as u64 > limit {
                    return Err(too_large(bytes.len() as u64));
                }
                Ok(Cow::Borrowed(&bytes[..]))
            }
            DescriptorSource::Inline(text) => {
                if text.len() as u64 > limit {
                    return Err(too_large(text.len() as u64));
                }
                Ok(Cow::Borrowed(text.as_bytes()))
            }
        }
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn signature_checks() {
        assert!(OpenInfo::from_path("a/b/scene.JSON").has_json_signature());
        assert!(!OpenInfo::from_path("scene.tif").has_json_signature());
        assert!(OpenInfo::from_memory("/vsimem/x.json", b"{}".to_vec()).has_json_signature());
        assert!(OpenInfo::from_inline("  {\"rows\": 1}").has_json_signature());
        assert!(!OpenInfo::from_inline("rows").has_json_signature());
    }

    #[test]
    fn from_name_detects_inline_json() {
        assert!(matches!(
            OpenInfo::from_name("{\"type\": \"RANDOM_RASTER\"}").source(),
            DescriptorSource::Inline(_)
        ));
        assert!(matches!(
            OpenInfo::from_name("scene.json").source(),
            DescriptorSource::Path(_)
        ));
    }

    #[test]
    fn read_enforces_limit() {
        let info = OpenInfo::from_memory("big.json", vec![b' '; 64]);
        assert_eq!(info.read(64).unwrap().len(), 64);
        let err = info.read(63).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpenRejected);
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{\"k\": 1}").unwrap();
        let info = OpenInfo::from_path(file.path());
        assert!(info.has_json_signature());
        assert_eq!(&*info.read(1024).unwrap(), b"{\"k\": 1}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let info = OpenInfo::from_path(dir.path().join("absent.json"));
        assert_eq!(info.read(1024).unwrap_err().kind(), ErrorKind::Io);
        let info = OpenInfo::from_path(dir.path());
        assert_eq!(info.read(1024).unwrap_err().kind(), ErrorKind::Io);
    }
}
