//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ambience::dsp::filter::{FilterType, SVFilter};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, filter_type, cutoff) in [
            ("lowpass", FilterType::LowPass, 400.0),
            ("highpass", FilterType::HighPass, 6_000.0),
            ("bandpass", FilterType::BandPass, 2_500.0),
        ] {
            let mut filter = SVFilter::new();
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(
                        black_box(&mut buffer),
                        filter_type,
                        cutoff,
                        0.707,
                        SAMPLE_RATE,
                    );
                })
            });
        }

        // Two cascaded stages, as used for 24 dB/oct rolloff
        let mut stages = [SVFilter::new(), SVFilter::new()];
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_24db", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for stage in stages.iter_mut() {
                    stage.render(
                        black_box(&mut buffer),
                        FilterType::LowPass,
                        80.0,
                        0.707,
                        SAMPLE_RATE,
                    );
                }
            })
        });
    }

    group.finish();
}
