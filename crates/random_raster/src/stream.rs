//! Per-pixel random streams.
//!
//! Every pixel owns an independent stream keyed by `(seed, linear_index)`. The stream is a
//! SplitMix64 sequence whose starting point is derived from the key, so the value at a pixel
//! never depends on which pixels were generated before it, on window shape, or on threads.
use std::convert::Infallible;

use rand::TryRng;

/// Weyl increment of the SplitMix64 sequence (golden ratio in 64-bit fixed point).
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 output finalizer.
#[inline]
pub(crate) fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Derives the stream key for one pixel.
///
/// `index` is the row-major linear index `row * cols + col`.
#[inline]
pub fn key_for_pixel(seed: u64, index: u64) -> u64 {
    mix_u64(seed ^ index.wrapping_mul(GOLDEN_GAMMA))
}

/// Deterministic random stream of one pixel.
///
/// Implements [`TryRng`] with an infallible error, and therefore [`rand::Rng`], so samplers
/// can draw as many words as they need (rejection loops included) while staying a pure
/// function of `(seed, index)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelStream {
    key: u64,
    counter: u64,
}

impl PixelStream {
    pub fn new(seed: u64, index: u64) -> Self {
        Self {
            key: key_for_pixel(seed, index),
            counter: 0,
        }
    }

    /// Number of 64-bit words drawn so far.
    pub fn words_drawn(&self) -> u64 {
        self.counter
    }

    #[inline]
    fn advance(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        mix_u64(self.key.wrapping_add(self.counter.wrapping_mul(GOLDEN_GAMMA)))
    }
}

impl TryRng for PixelStream {
    type Error = Infallible;

    fn try_next_u32(&mut self) -> Result<u32, Infallible> {
        Ok((self.advance() >> 32) as u32)
    }

    fn try_next_u64(&mut self) -> Result<u64, Infallible> {
        Ok(self.advance())
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Infallible> {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}

/// First word of the stream at `(seed, index)`.
pub fn value_at(seed: u64, index: u64) -> u64 {
    PixelStream::new(seed, index).advance()
}
