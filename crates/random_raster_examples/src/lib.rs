#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{display_range, init_tracing, open_with_driver, render_block_to_png};
