use random_raster::prelude::*;
use random_raster_examples::{init_tracing, open_with_driver};

const BINS: usize = 24;
const BAR_WIDTH: usize = 60;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let descriptor = normal_descriptor(256, 10.0, 2.0);
    let ds = open_with_driver(&OpenInfo::from_inline(descriptor))?;
    let band = ds.first_band();
    let values = band.read_all()?.to_f64_vec();
    let stats = band.statistics();

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt();
    println!(
        "sample mean {mean:.4} (theory {:.4}), sample sd {sd:.4} (theory {:.4})",
        stats.mean.unwrap_or(f64::NAN),
        stats.std_dev.unwrap_or(f64::NAN)
    );

    let lo = mean - 4.0 * sd;
    let width = 8.0 * sd / BINS as f64;
    let mut counts = [0usize; BINS];
    for v in &values {
        let bin = ((v - lo) / width).floor();
        if bin >= 0.0 && (bin as usize) < BINS {
            counts[bin as usize] += 1;
        }
    }
    let peak = counts.iter().copied().max().unwrap_or(1).max(1);
    for (i, count) in counts.iter().enumerate() {
        let start = lo + i as f64 * width;
        let bar = "#".repeat(count * BAR_WIDTH / peak);
        println!("{start:>8.3} | {bar} {count}");
    }
    Ok(())
}

fn normal_descriptor(size: usize, mean: f64, stddev: f64) -> String {
    format!(
        r#"{{
            "type": "RANDOM_RASTER",
            "rows": {size}, "cols": {size},
            "data_type": "Float32",
            "seed": 42,
            "distribution": "normal",
            "distribution_parameters": {{ "mean": {mean}, "stddev": {stddev} }}
        }}"#
    )
}
