//! SFG printing: the work a cache miss adds to the callback that triggers it.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use egg_synth::sfg::{compile, Printer};

use crate::{BLOCK_SIZES, RATE};

const LASER: &str = "\
shape sawup
harmonics 1 0.5 0.25
fm 1.5 2
fmenv 0 50 1 50 0
rate 2000 300 200
ratelfo 8 100
level 0 5 1 300 0
delay 40 0.6 0.4 0.5 0.3
lopass 4000
endvoice
shape noise
level 0.5 100 0
bandpass 1200 300
";

pub fn bench_printer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/printer");
    let flat = compile("shape square\nlevel 0 5 1 2000 0").expect("valid sfg");
    let laser = compile(LASER).expect("valid sfg");

    for &size in BLOCK_SIZES {
        for (name, src) in [("flat", &flat), ("laser", &laser)] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter_batched_ref(
                    || Printer::new(RATE, src).expect("decodes"),
                    |printer| black_box(printer.update(size)),
                    criterion::BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}
