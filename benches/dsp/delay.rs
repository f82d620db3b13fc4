//! Benchmarks for tape delay and detune.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use egg_synth::dsp::{Detune, TapeDelay};

use crate::{BLOCK_SIZES, RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let delay_ms: &[usize] = &[10, 100, 1000];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut buffer = input.clone();

        for &ms in delay_ms {
            let mut delay = TapeDelay::with_mix(ms * RATE as usize / 1000, 0.4, 0.5);
            group.bench_with_input(BenchmarkId::new(format!("tape_{ms}ms"), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    delay.render(black_box(&mut buffer));
                })
            });
        }

        let mut detune = Detune::new(RATE as usize / 100);
        group.bench_with_input(BenchmarkId::new("detune", size), &size, |b, _| {
            b.iter(|| {
                let mut phase = 0.0f32;
                for s in buffer.iter_mut() {
                    *s = detune.process(black_box(*s), phase);
                    phase = (phase + 0.001) % 1.0;
                }
            })
        });
    }

    group.finish();
}
