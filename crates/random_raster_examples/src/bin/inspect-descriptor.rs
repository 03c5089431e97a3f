use std::env;
use std::path::PathBuf;

use anyhow::Context;
use random_raster::prelude::*;
use random_raster_examples::{display_range, init_tracing, open_with_driver, render_block_to_png};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path: PathBuf = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: inspect-descriptor <descriptor.json>")?;

    let ds = open_with_driver(&OpenInfo::from_path(&path))?;
    let band = ds.first_band();
    let stats = band.statistics();
    let descriptor = ds.descriptor();

    println!("file:         {}", path.display());
    println!(
        "size:         {} x {} ({} pixels)",
        ds.width(),
        ds.height(),
        descriptor.pixel_count()
    );
    println!("pixel type:   {}", ds.pixel_type());
    println!("distribution: {}", descriptor.distribution);
    for (name, value) in descriptor.parameters.iter() {
        println!("  {name} = {value:?}");
    }
    let (block_rows, block_cols) = band.block_size();
    println!("block size:   {block_rows} x {block_cols}");
    println!("minimum:      {}", stats.minimum);
    println!("maximum:      {}", stats.maximum);
    match (stats.mean, stats.std_dev) {
        (Some(mean), Some(sd)) => println!("mean / sd:    {mean} / {sd}"),
        (Some(mean), None) => println!("mean:         {mean} (infinite variance)"),
        _ => println!("mean:         undefined"),
    }

    // Preview the top-left block only; large rasters stay cheap.
    let preview = band.read_block(0, 0)?;
    let out = path.with_extension("png");
    render_block_to_png(&preview, display_range(&stats), 4, &out)?;
    Ok(())
}
