//! Band-level reads and statistics.
use super::{BlockId, PixelBlock, RandomRasterDataset, Window};
use crate::descriptor::PixelType;
use crate::distribution::SampleValue;
use crate::error::{Error, Result};

/// Theoretical band statistics derived from the distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandStatistics {
    pub minimum: f64,
    pub maximum: f64,
    /// `None` when the distribution has no finite mean.
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

/// View of the single band of a [`RandomRasterDataset`].
#[derive(Clone, Copy, Debug)]
pub struct RasterBand<'a> {
    dataset: &'a RandomRasterDataset,
}

impl<'a> RasterBand<'a> {
    pub(crate) fn new(dataset: &'a RandomRasterDataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &'a RandomRasterDataset {
        self.dataset
    }

    pub fn pixel_type(&self) -> PixelType {
        self.dataset.pixel_type()
    }

    /// Size as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.dataset.width(), self.dataset.height())
    }

    /// Natural block size as `(rows, cols)`.
    pub fn block_size(&self) -> (usize, usize) {
        let d = self.dataset.descriptor();
        (d.block_rows, d.block_cols)
    }

    /// Number of blocks as `(across, down)`.
    pub fn block_count(&self) -> (usize, usize) {
        let (rows, cols) = self.block_size();
        (
            self.dataset.width().div_ceil(cols),
            self.dataset.height().div_ceil(rows),
        )
    }

    /// Writes `window` into `out` (row-major, native encoding).
    pub fn read_window_into(&self, window: Window, out: &mut [u8]) -> Result<()> {
        self.dataset.fill_window(window, out)
    }

    pub fn read_window(&self, window: Window) -> Result<PixelBlock> {
        window.check_within(self.dataset.width(), self.dataset.height())?;
        let mut data = vec![0u8; window.byte_len(self.pixel_type().size_bytes())?];
        self.dataset.fill_window(window, &mut data)?;
        Ok(PixelBlock::new(window, self.pixel_type(), data))
    }

    pub fn read_all(&self) -> Result<PixelBlock> {
        self.read_window(Window::full(self.dataset.width(), self.dataset.height()))
    }

    /// Reads one natural block; blocks on the right and bottom edges are truncated.
    pub fn read_block(&self, block_x: usize, block_y: usize) -> Result<PixelBlock> {
        let window = Window::for_block(
            BlockId(block_x, block_y),
            self.block_size(),
            self.size(),
        )
        .ok_or_else(|| {
            let (across, down) = self.block_count();
            Error::InvalidWindow(format!(
                "block ({block_x}, {block_y}) is outside the {across}x{down} block grid"
            ))
        })?;
        self.read_window(window)
    }

    /// Value of a single pixel.
    pub fn pixel(&self, col: usize, row: usize) -> Result<SampleValue> {
        let block = self.read_window(Window::new(col, row, 1, 1))?;
        Ok(self.pixel_type().decode(block.as_bytes()))
    }

    /// Smallest value the band can hold: the support minimum clamped to the pixel type.
    pub fn minimum(&self) -> f64 {
        let (lo, _) = self.dataset.sampler().support();
        let (tmin, _) = self.pixel_type().real_range();
        lo.max(tmin)
    }

    /// Largest value the band can hold: the support maximum clamped to the pixel type.
    pub fn maximum(&self) -> f64 {
        let (_, hi) = self.dataset.sampler().support();
        let (_, tmax) = self.pixel_type().real_range();
        hi.min(tmax)
    }

    pub fn statistics(&self) -> BandStatistics {
        let sampler = self.dataset.sampler();
        BandStatistics {
            minimum: self.minimum(),
            maximum: self.maximum(),
            mean: sampler.mean(),
            std_dev: sampler.std_dev(),
        }
    }
}
