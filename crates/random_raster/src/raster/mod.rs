//! Raster view over a descriptor: one band, pixels generated on demand.
//!
//! [`RandomRasterDataset`] owns the parsed descriptor and its sampler. Reads go through
//! [`RasterBand`] by arbitrary [`Window`] or by natural block, and return row-major,
//! native-endian bytes in the band's pixel type.
pub mod band;
pub mod block;
pub mod dataset;
pub mod window;

pub use band::{BandStatistics, RasterBand};
pub use block::PixelBlock;
pub use dataset::RandomRasterDataset;
pub use window::{BlockId, Window};

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::descriptor::parse_descriptor;

    const DESCRIPTOR: &str = r#"{
        "type": "RANDOM_RASTER",
        "rows": 96, "cols": 80,
        "data_type": "Float64",
        "seed": 7,
        "distribution": "gamma",
        "distribution_parameters": { "alpha": 2.5, "beta": 1.5 },
        "block_rows": 32, "block_cols": 32
    }"#;

    fn open() -> RandomRasterDataset {
        RandomRasterDataset::new(parse_descriptor(DESCRIPTOR.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn reopening_reproduces_bytes() {
        let a = open().first_band().read_all().unwrap();
        let b = open().first_band().read_all().unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn read_order_does_not_matter() {
        let ds = open();
        let band = ds.first_band();
        let (across, down) = band.block_count();
        let forward: Vec<_> = (0..down)
            .flat_map(|y| (0..across).map(move |x| (x, y)))
            .map(|(x, y)| band.read_block(x, y).unwrap())
            .collect();
        let mut backward: Vec<_> = (0..down)
            .flat_map(|y| (0..across).map(move |x| (x, y)))
            .rev()
            .map(|(x, y)| band.read_block(x, y).unwrap())
            .collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn concurrent_reads_match_sequential_reads() {
        let ds = open();
        let band = ds.first_band();
        let (across, down) = band.block_count();
        let blocks: Vec<(usize, usize)> = (0..down)
            .flat_map(|y| (0..across).map(move |x| (x, y)))
            .collect();
        let sequential: Vec<PixelBlock> = blocks
            .iter()
            .map(|&(x, y)| band.read_block(x, y).unwrap())
            .collect();

        let concurrent: Vec<PixelBlock> = thread::scope(|s| {
            let handles: Vec<_> = blocks
                .iter()
                .map(|&(x, y)| s.spawn(move || band.read_block(x, y).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(sequential, concurrent);
    }

    #[test]
    fn sample_mean_is_close_to_theory() {
        let ds = open();
        let band = ds.first_band();
        let values = band.read_all().unwrap().to_f64_vec();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let stats = band.statistics();
        let expected = stats.mean.unwrap();
        let tol = 5.0 * stats.std_dev.unwrap() / (values.len() as f64).sqrt();
        assert!((mean - expected).abs() < tol, "mean={mean} expected={expected}");
        assert!(values.iter().all(|&v| v >= 0.0));
    }
}
