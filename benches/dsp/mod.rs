//! Benchmarks for low-level DSP primitives.

mod delay;
mod envelope;
mod filter;

pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
