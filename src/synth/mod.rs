//! The real-time synthesizer: channels, voices, FX procs, sound playback and
//! song sequencing, all driven from [`Synth::update_f32`].
//!
//! Everything a host does goes through [`Synth`]. Channels 0..=7 belong to
//! whatever song is playing; 8..=15 are free for the host.

pub mod builtin;
pub mod cache;
pub mod channel;
pub mod context;
pub mod event;
pub mod fx;
pub mod playback;
pub mod pool;
pub mod shared;
pub mod song;
pub mod tables;
pub mod voice;

pub use builtin::{Builtin, FxParams, BUILTINS};
pub use cache::PcmCache;
pub use channel::{Channel, ChannelMode, Instrument};
pub use context::Synth;
pub use event::{Event, MessageReceiver, SynthMessage};
pub use fx::FxProc;
pub use playback::Playback;
pub use pool::{Pool, PoolEntry};
pub use shared::{SharedSynth, SynthGuard};
pub use song::{ChannelRecord, Song, SongStep, SongWriter};
pub use tables::NoteTables;
pub use voice::{Origin, Voice};
