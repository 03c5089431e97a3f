//! Buffers of generated pixels.
use crate::descriptor::PixelType;
use crate::distribution::SampleValue;

use super::Window;

/// Pixels of one window in row-major, native-endian encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBlock {
    window: Window,
    pixel_type: PixelType,
    data: Vec<u8>,
}

impl PixelBlock {
    pub(crate) fn new(window: Window, pixel_type: PixelType, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), window.len() * pixel_type.size_bytes());
        Self {
            window,
            pixel_type,
            data,
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Size as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.window.width, self.window.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Value at `(col, row)` relative to the window origin, `None` if out of bounds.
    pub fn get(&self, col: usize, row: usize) -> Option<SampleValue> {
        if col >= self.window.width || row >= self.window.height {
            return None;
        }
        let size = self.pixel_type.size_bytes();
        let i = (row * self.window.width + col) * size;
        Some(self.pixel_type.decode(&self.data[i..i + size]))
    }

    /// Decoded values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = SampleValue> + '_ {
        self.data
            .chunks_exact(self.pixel_type.size_bytes())
            .map(|px| self.pixel_type.decode(px))
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.values().map(SampleValue::as_f64).collect()
    }
}
