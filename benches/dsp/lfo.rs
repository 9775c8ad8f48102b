//! Benchmarks for the sine LFO.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ambience::dsp::lfo::SineLfo;

use crate::BLOCK_SIZES;

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut lfo = SineLfo::new(0.25, 0.55);

        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = lfo.next_sample(black_box(0.08), 48_000.0);
                }
            })
        });
    }

    group.finish();
}
