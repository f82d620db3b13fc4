//! Benchmarks for the IIR filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use egg_synth::dsp::Iir;

use crate::{BLOCK_SIZES, RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let norm = |hz: f32| hz / RATE as f32;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 / size as f32) * 2.0 - 1.0).collect();
        let mut buffer = input.clone();

        let filters = [
            ("lopass", Iir::lopass(norm(1000.0))),
            ("hipass", Iir::hipass(norm(1000.0))),
            ("bandpass", Iir::bandpass(norm(1000.0), norm(200.0))),
            ("notch", Iir::notch(norm(1000.0), norm(200.0))),
        ];
        for (name, mut filter) in filters {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
