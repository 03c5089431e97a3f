use std::time::Duration;

use criterion::{Criterion, Throughput};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

/// Seed shared by every bench so runs are comparable.
pub const SEED: u64 = 0x5EED_1234;

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn pixels_throughput(pixels: usize) -> Throughput {
    Throughput::Elements(pixels.max(1) as u64)
}

/// Builds a descriptor document for `distribution` over a `size` x `size` raster.
pub fn descriptor_json(
    size: usize,
    data_type: &str,
    distribution: &str,
    parameters: serde_json::Value,
) -> String {
    serde_json::json!({
        "type": "RANDOM_RASTER",
        "rows": size,
        "cols": size,
        "data_type": data_type,
        "seed": SEED,
        "distribution": distribution,
        "distribution_parameters": parameters,
    })
    .to_string()
}
