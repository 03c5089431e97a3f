//! Single-band datasets backed by a distribution.
use tracing::debug;

use super::band::RasterBand;
use super::Window;
use crate::descriptor::{PixelType, RasterDescriptor};
use crate::distribution::{SampleContext, SampleValue, Sampler};
use crate::error::{Error, Result};

/// A read-only raster whose pixels are generated on demand.
///
/// Nothing is cached: every read recomputes its pixels from `(seed, pixel index)`, so
/// datasets are `Send + Sync` and concurrent reads need no locking.
#[derive(Clone, Debug)]
pub struct RandomRasterDataset {
    descriptor: RasterDescriptor,
    sampler: Sampler,
}

impl RandomRasterDataset {
    /// Validates `descriptor` and builds its sampler.
    pub fn new(descriptor: RasterDescriptor) -> Result<Self> {
        let sampler = descriptor.sampler()?;
        Ok(Self {
            descriptor,
            sampler,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.descriptor.cols
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.descriptor.rows
    }

    pub fn raster_count(&self) -> usize {
        1
    }

    pub fn pixel_type(&self) -> PixelType {
        self.descriptor.pixel_type
    }

    pub fn descriptor(&self) -> &RasterDescriptor {
        &self.descriptor
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Returns band `index` (1-based). Only band 1 exists.
    pub fn band(&self, index: usize) -> Option<RasterBand<'_>> {
        (index == 1).then(|| RasterBand::new(self))
    }

    /// Returns the only band.
    pub fn first_band(&self) -> RasterBand<'_> {
        RasterBand::new(self)
    }

    pub(crate) fn sample_pixel(&self, col: usize, row: usize) -> SampleValue {
        let index = row as u64 * self.width() as u64 + col as u64;
        self.sampler.sample_at(SampleContext::new(self.descriptor.seed, index))
    }

    /// Writes the pixels of `window` into `out`, row-major in native encoding.
    pub(crate) fn fill_window(&self, window: Window, out: &mut [u8]) -> Result<()> {
        window.check_within(self.width(), self.height())?;
        let pixel_type = self.pixel_type();
        let size = pixel_type.size_bytes();
        let expected = window.byte_len(size)?;
        if out.len() != expected {
            return Err(Error::InvalidWindow(format!(
                "buffer holds {} bytes, {expected} needed for a {}x{} {pixel_type} window",
                out.len(),
                window.width,
                window.height
            )));
        }

        debug!(
            "Generating {}x{} window at ({}, {}).",
            window.width, window.height, window.col_off, window.row_off
        );
        for (r, row_buf) in out.chunks_exact_mut(window.width * size).enumerate() {
            let row = window.row_off + r;
            for (c, px) in row_buf.chunks_exact_mut(size).enumerate() {
                pixel_type.encode(self.sample_pixel(window.col_off + c, row), px);
            }
        }
        Ok(())
    }
}
