//! Benchmarks for the noise generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ambience::dsp::noise::{NoiseColor, NoiseGenerator};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, color) in [
            ("white", NoiseColor::White),
            ("pink", NoiseColor::Pink),
            ("brown", NoiseColor::Brown),
        ] {
            let mut noise = NoiseGenerator::seeded(color, 42);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    noise.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
