//! Per-rate lookup tables shared by every channel.

use crate::dsp::{note_frequency, Wave};

/// Note frequencies at one output rate, as normalized floats and as 32-bit
/// phase steps.
#[derive(Debug, Clone)]
pub struct NoteTables {
    sine: Wave,
    ffreq: [f32; 128],
    ifreq: [u32; 128],
}

impl NoteTables {
    pub fn new(rate: u32) -> Self {
        let mut ffreq = [0.0; 128];
        let mut ifreq = [0; 128];
        for note in 0..128u8 {
            let norm = note_frequency(note) / rate as f32;
            ffreq[note as usize] = norm;
            ifreq[note as usize] = (norm as f64 * 4_294_967_296.0) as u32;
        }
        Self {
            sine: Wave::sine(),
            ffreq,
            ifreq,
        }
    }

    pub fn sine(&self) -> &Wave {
        &self.sine
    }

    /// Cycles per frame. Notes above 127 read note 127.
    pub fn ffreq(&self, note: u8) -> f32 {
        self.ffreq[(note & 0x7f) as usize]
    }

    pub fn ifreq(&self, note: u8) -> u32 {
        self.ifreq[(note & 0x7f) as usize]
    }
}
