//! Real-world scenario benchmarks.
//!
//! These render whole textures through the signal graph, the way the output
//! callback does.

mod sounds;

pub use sounds::{bench_mix, bench_sounds};
