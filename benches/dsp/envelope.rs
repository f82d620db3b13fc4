//! Benchmarks for the instrument envelopes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use egg_synth::dsp::envelope::{EnvConfig, Envelope, TONE};

use crate::{BLOCK_SIZES, RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    // Slowest attack, longest release.
    let config = EnvConfig::tiny(RATE, TONE | (7 << 3) | 7);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];

        let mut env = Envelope::new(&config, 100, i32::MAX);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        let mut env = Envelope::new(&config, 100, i32::MAX);
        for _ in 0..RATE {
            env.update();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        // Per-sample update, the way voices pull it.
        let mut env = Envelope::new(&config, 100, i32::MAX);
        env.release();
        group.bench_with_input(BenchmarkId::new("update", size), &size, |b, &size| {
            b.iter(|| {
                let mut acc = 0.0;
                for _ in 0..size {
                    acc += env.update();
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
