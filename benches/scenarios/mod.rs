//! Scenario benchmarks: the work an audio callback actually does.

mod printer;
mod synth;

pub use printer::bench_printer;
pub use synth::bench_synth;
