use random_raster::prelude::*;
use random_raster_examples::{init_tracing, open_with_driver, render_block_to_png};

const DESCRIPTOR: &str = r#"{
    "type": "RANDOM_RASTER",
    "rows": 64,
    "cols": 64,
    "data_type": "Int16",
    "seed": 123,
    "distribution": "uniform_integer",
    "distribution_parameters": { "a": -100, "b": 100 }
}"#;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Same bytes whether the descriptor lives in memory or on disk.
    let info = OpenInfo::from_memory("/vsimem/uniform-integer-preview.json", DESCRIPTOR.as_bytes());
    let ds = open_with_driver(&info)?;
    let band = ds.first_band();
    let block = band.read_all()?;

    let values = block.to_f64_vec();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!(
        "{}x{} {} pixels, observed range [{min}, {max}], theoretical [{}, {}]",
        ds.width(),
        ds.height(),
        ds.pixel_type(),
        band.minimum(),
        band.maximum()
    );

    render_block_to_png(
        &block,
        (band.minimum(), band.maximum()),
        8,
        "uniform-integer-preview.png",
    )?;
    Ok(())
}
