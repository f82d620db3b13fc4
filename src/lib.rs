//! egg_synth - procedural synthesizer for songs and sound effects.
//!
//! Two compact bytecodes drive everything here:
//!
//! - **Songs**: a 42-byte header plus a stream of delay, note and wheel events,
//!   played by [`synth::Synth`] through a bank of 128 General-MIDI-ish instruments.
//! - **SFG programs**: small oscillator + processing pipelines compiled from a text
//!   DSL ([`sfg::compile`]) and printed to PCM ([`sfg::Printer`]), then cached and
//!   played as one-shots.
//!
//! The engine owns no threads and reads no files. Resources come from a
//! [`io::ResourceProvider`], output is pulled with [`synth::Synth::update_f32`] or
//! [`synth::Synth::update_i16`], and cross-thread access goes through
//! [`synth::SharedSynth`].

pub mod config;
pub mod dsp;
pub mod error;
pub mod io;
pub mod sfg;
pub mod synth;

pub use config::SynthConfig;
pub use error::{CompileError, CompileErrorKind, ConfigError, DecodeError};
pub use synth::{SharedSynth, Synth};

/// Largest interleaved sample count processed in one pass. Rounded down to a
/// multiple of the channel count at runtime.
pub const BUFFER_LIMIT: usize = 1024;

/// Wavetable length for every channel and the shared sine.
pub const WAVE_SIZE_BITS: u32 = 10;
pub const WAVE_SIZE: usize = 1 << WAVE_SIZE_BITS;
/// Shift turning a 32-bit phase accumulator into a wavetable index.
pub const WAVE_SHIFT: u32 = 32 - WAVE_SIZE_BITS;

/// Channels addressable through [`synth::Synth::event`].
pub const CHANNEL_COUNT: usize = 16;
/// Channels a song can reach. Higher ones belong to the caller.
pub const SONG_CHANNEL_COUNT: usize = 8;

pub const VOICE_LIMIT: usize = 32;
pub const PROC_LIMIT: usize = 16;
pub const PLAYBACK_LIMIT: usize = 16;

/// Float to i16 scale used by [`synth::Synth::update_i16`]. Slightly under full
/// scale so a touch of overshoot doesn't wrap.
pub const QUANTIZE_LEVEL: f32 = 32000.0;
