//! Benchmarks for complete sound graphs.
//!
//! Each texture is built on an offline engine and rendered one block at a
//! time. The mix case plays all three at once, the heaviest load a listener
//! can ask for.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ambience::{
    registry::Recipe, AudioEngine, EngineConfig, MemoryStore, OfflineOutput, SharedGraph,
    SoundRegistry,
};

use crate::BLOCK_SIZES;

/// Offline engine with one sound built at `volume` and its fade-in skipped.
fn engine_with(recipe: Recipe, volume: f32) -> AudioEngine<OfflineOutput> {
    let mut engine = AudioEngine::new(OfflineOutput::new(), EngineConfig::default());
    assert!(engine.initialize());
    let bus = engine.bus().expect("engine is ready");
    {
        let mut graph = engine.graph().lock().expect("graph lock");
        recipe(&mut graph, bus, volume).expect("sound builds");
    }
    warm_up(engine.graph());
    engine
}

/// Render past every fade so the benchmark measures the steady state.
fn warm_up(graph: &SharedGraph) {
    let mut graph = graph.lock().expect("graph lock");
    let mut block = vec![0.0f32; 48_000 * 4];
    graph.render_block(&mut block);
}

fn render(graph: &SharedGraph, buffer: &mut [f32]) {
    if let Ok(mut graph) = graph.lock() {
        graph.render_block(buffer);
    }
}

pub fn bench_sounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/sounds");

    for descriptor in ambience::registry::builtin() {
        let engine = engine_with(descriptor.build, descriptor.scaled(descriptor.default_volume));

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(descriptor.key, size), &size, |b, _| {
                b.iter(|| render(black_box(engine.graph()), black_box(&mut buffer)))
            });
        }
    }

    group.finish();
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    let mut registry = SoundRegistry::new(
        AudioEngine::new(OfflineOutput::new(), EngineConfig::default()),
        MemoryStore::new(),
    );
    registry.toggle_all().expect("all sounds start");
    warm_up(registry.engine().graph());

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("all_three", size), &size, |b, _| {
            b.iter(|| render(black_box(registry.engine().graph()), black_box(&mut buffer)))
        });
    }

    group.finish();
}
