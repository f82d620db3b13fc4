//! Shared state types for UI communication
//!
//! Everything crossing from the audio thread is `Copy` so pushing it never
//! allocates.

/// Static state known before playback starts.
#[derive(Clone, Debug)]
pub struct UiStateInit {
    /// Input file name
    pub name: String,
    pub sample_rate: u32,
    /// Song length in beats, zero for sounds
    pub duration: f64,
}

/// Snapshot from the audio thread, sent once per callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct UiStateUpdate {
    /// (qualifier, id, repeat) of the current song
    pub song: (u16, u16, bool),
    /// Beats, -1 with no song
    pub playhead: f64,
    pub voices: usize,
    pub procs: usize,
    pub playbacks: usize,
}

impl UiStateUpdate {
    pub fn from_synth(synth: &egg_synth::Synth) -> Self {
        Self {
            song: synth.song(),
            playhead: synth.playhead(0.0),
            voices: synth.voice_count(),
            procs: synth.proc_count(),
            playbacks: synth.playback_count(),
        }
    }
}
