//! Rectangular pixel windows and the natural block grid.
use crate::error::{Error, Result};

/// Index of a block in the natural block grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(
    /// Block index along columns.
    pub usize,
    /// Block index along rows.
    pub usize,
);

/// A rectangle of pixels: offset of its top-left corner and its extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(col_off: usize, row_off: usize, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// The whole raster.
    pub fn full(cols: usize, rows: usize) -> Self {
        Self::new(0, 0, cols, rows)
    }

    /// Window covered by block `id`, truncated at the right and bottom raster edges.
    ///
    /// Returns `None` if the block lies outside the raster.
    pub fn for_block(
        id: BlockId,
        block_size: (usize, usize),
        raster_size: (usize, usize),
    ) -> Option<Self> {
        let (block_rows, block_cols) = block_size;
        let (cols, rows) = raster_size;
        let col_off = id.0.checked_mul(block_cols)?;
        let row_off = id.1.checked_mul(block_rows)?;
        if col_off >= cols || row_off >= rows {
            return None;
        }
        Some(Self::new(
            col_off,
            row_off,
            block_cols.min(cols - col_off),
            block_rows.min(rows - row_off),
        ))
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Size in bytes of this window's pixels at `bytes_per_pixel` each.
    pub fn byte_len(&self, bytes_per_pixel: usize) -> Result<usize> {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(bytes_per_pixel))
            .ok_or_else(|| {
                Error::InvalidWindow(format!(
                    "{}x{} window of {bytes_per_pixel}-byte pixels overflows the address space",
                    self.width, self.height
                ))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        (self.col_off..self.col_off + self.width).contains(&col)
            && (self.row_off..self.row_off + self.height).contains(&row)
    }

    /// Checks that the window is non-empty and lies inside a `cols` x `rows` raster.
    pub fn check_within(&self, cols: usize, rows: usize) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidWindow(format!(
                "{}x{} window is empty",
                self.width, self.height
            )));
        }
        let right = self.col_off.checked_add(self.width);
        let bottom = self.row_off.checked_add(self.height);
        match (right, bottom) {
            (Some(r), Some(b)) if r <= cols && b <= rows => Ok(()),
            _ => Err(Error::InvalidWindow(format!(
                "window {}x{} at ({}, {}) exceeds the {}x{} raster",
                self.width, self.height, self.col_off, self.row_off, cols, rows
            ))),
        }
    }
}
