//! Benchmarks for the compressor and limiter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ambience::dsp::dynamics::{DynamicsProcessor, DynamicsSettings};

use crate::BLOCK_SIZES;

pub fn bench_dynamics(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/dynamics");

    for &size in BLOCK_SIZES {
        // Loud enough to keep both processors working
        let input: Vec<f32> = (0..size)
            .map(|i| if i % 2 == 0 { 0.9 } else { -0.9 })
            .collect();

        for (name, settings) in [
            (
                "compressor",
                DynamicsSettings::compressor(-18.0, 3.0, 0.03, 0.25),
            ),
            ("limiter", DynamicsSettings::limiter(-1.0)),
        ] {
            let mut processor = DynamicsProcessor::new(settings);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    processor.render(black_box(&mut buffer), 48_000.0);
                })
            });
        }
    }

    group.finish();
}
