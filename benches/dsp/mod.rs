//! Benchmarks for low-level DSP primitives.

mod dynamics;
mod envelope;
mod filter;
mod lfo;
mod noise;
mod reverb;

pub use dynamics::bench_dynamics;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use lfo::bench_lfo;
pub use noise::bench_noise;
pub use reverb::bench_reverb;
