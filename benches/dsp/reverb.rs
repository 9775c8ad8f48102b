//! Benchmarks for the Schroeder reverb at the decays the textures use.

use std::hint::black_box;

use ambience::dsp::{
    noise::{NoiseColor, NoiseGenerator},
    reverb::SchroederReverb,
};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        // Pink wash, the typical reverb feed
        let mut input = vec![0.0f32; size];
        NoiseGenerator::seeded(NoiseColor::Pink, 3).render(&mut input);

        // (decay seconds, damping): rain room, ocean space
        for (decay, damping) in [(2.5, 0.5), (6.0, 0.3)] {
            let mut reverb = SchroederReverb::new(SAMPLE_RATE, decay);
            reverb.set_damping(damping);
            let name = format!("decay_{decay}s");

            group.bench_with_input(BenchmarkId::new(name, size), &input, |b, input| {
                b.iter(|| {
                    input
                        .iter()
                        .map(|&sample| reverb.process(black_box(sample)))
                        .sum::<f32>()
                })
            });
        }
    }

    group.finish();
}
