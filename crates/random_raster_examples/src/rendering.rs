use std::path::Path;

use anyhow::{bail, Context};
use image::{GrayImage, Luma};
use random_raster::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Registers the driver and opens `info`, turning a refusal into an error with the
/// recorded reason.
pub fn open_with_driver(info: &OpenInfo) -> anyhow::Result<RandomRasterDataset> {
    register_random_raster_driver();
    match driver_manager().open(info) {
        Some(ds) => Ok(ds),
        None => {
            let reason = last_error_msg();
            if reason.is_empty() {
                bail!("'{}' is not a random raster descriptor", info.name());
            }
            bail!("could not open '{}': {reason}", info.name());
        }
    }
}

/// Value range used to map a band to gray levels.
///
/// Bounded bands use their support; unbounded sides fall back to three standard
/// deviations around the mean.
pub fn display_range(stats: &BandStatistics) -> (f64, f64) {
    let spread = match (stats.mean, stats.std_dev) {
        (Some(mean), Some(sd)) => Some((mean - 3.0 * sd, mean + 3.0 * sd)),
        _ => None,
    };
    let lo = if stats.minimum.abs() < 1e15 {
        stats.minimum
    } else {
        spread.map_or(-1.0, |s| s.0)
    };
    let hi = if stats.maximum.abs() < 1e15 {
        stats.maximum
    } else {
        spread.map_or(1.0, |s| s.1)
    };
    (lo, hi)
}

/// Writes `block` as an 8-bit grayscale PNG, mapping `range` linearly onto 0..=255.
pub fn render_block_to_png(
    block: &PixelBlock,
    range: (f64, f64),
    scale: u32,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (width, height) = block.size();
    let scale = scale.max(1);
    let (lo, hi) = range;
    let span = if hi > lo { hi - lo } else { 1.0 };

    let values = block.to_f64_vec();
    let mut img = GrayImage::new(width as u32 * scale, height as u32 * scale);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let v = values[(y / scale) as usize * width + (x / scale) as usize];
        let level = ((v - lo) / span).clamp(0.0, 1.0) * 255.0;
        *px = Luma([level.round() as u8]);
    }

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {}.", path.display());
    Ok(())
}
