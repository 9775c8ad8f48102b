//! Benchmarks for the percussive envelope used by rain drops.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ambience::dsp::envelope::Envelope;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Retriggered every block, like a dense shower
        let mut env = Envelope::percussive(0.01, 0.08);
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(SAMPLE_RATE);
                }
                black_box(&buffer);
            })
        });

        // Idle between drops
        let mut env = Envelope::percussive(0.01, 0.08);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(SAMPLE_RATE);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
