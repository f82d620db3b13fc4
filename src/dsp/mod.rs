//! Signal primitives shared by the SFG printer and the instrument voices.
//!
//! Everything here allocates at construction at most, then runs sample by
//! sample without touching the heap.

/// Tape delay and detune ring buffers.
pub mod delay;
/// Velocity-sensitive piecewise-linear envelopes.
pub mod envelope;
/// Five-coefficient IIR filters.
pub mod filter;
/// Fixed-size single-cycle wavetables.
pub mod wave;

pub use delay::{Detune, TapeDelay};
pub use envelope::{EnvConfig, EnvPoints, Envelope, EnvelopeStage};
pub use filter::Iir;
pub use wave::{note_frequency, Shape, Wave};
