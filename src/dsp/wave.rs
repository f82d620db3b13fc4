//! Single-cycle wavetables.
//!
//! Every table is [`WAVE_SIZE`] samples covering one period. Oscillators index
//! them with the top [`crate::WAVE_SIZE_BITS`] bits of a 32-bit phase.

use std::f32::consts::TAU;
use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::WAVE_SIZE;

/// Harmonics beyond this would alias within one table.
pub const HARMONICS_LIMIT: usize = (WAVE_SIZE >> 1) - 1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sine,
    Square,
    SawUp,
    SawDown,
    Triangle,
}

impl Shape {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Shape::Sine),
            1 => Some(Shape::Square),
            2 => Some(Shape::SawUp),
            3 => Some(Shape::SawDown),
            4 => Some(Shape::Triangle),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Wave {
    samples: Box<[f32; WAVE_SIZE]>,
}

impl std::fmt::Debug for Wave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wave").field("len", &WAVE_SIZE).finish()
    }
}

fn ramp(dst: &mut [f32], from: f32, to: f32) {
    let step = (to - from) / dst.len() as f32;
    let mut t = from;
    for sample in dst.iter_mut() {
        *sample = t;
        t += step;
    }
}

impl Wave {
    pub fn silent() -> Self {
        Self {
            samples: Box::new([0.0; WAVE_SIZE]),
        }
    }

    pub fn sine() -> Self {
        Self::from_shape(Shape::Sine)
    }

    pub fn from_shape(shape: Shape) -> Self {
        let mut wave = Self::silent();
        let v = &mut wave.samples[..];
        let half = WAVE_SIZE >> 1;
        match shape {
            Shape::Sine => {
                let dp = TAU / WAVE_SIZE as f32;
                let mut p = 0.0f32;
                for sample in v.iter_mut() {
                    *sample = p.sin();
                    p += dp;
                }
            }
            Shape::Square => {
                v[..half].fill(1.0);
                v[half..].fill(-1.0);
            }
            Shape::SawUp => ramp(v, -1.0, 1.0),
            Shape::SawDown => ramp(v, 1.0, -1.0),
            Shape::Triangle => {
                let (up, down) = v.split_at_mut(half);
                ramp(up, -1.0, 1.0);
                ramp(down, 1.0, -1.0);
            }
        }
        wave
    }

    /// Sum of this wave played at 1x, 2x, 3x... the base rate, each scaled by
    /// `coef/255`. Zero coefficients are skipped.
    pub fn with_harmonics(&self, coefs: &[u8]) -> Self {
        let mut dst = Self::silent();
        let coefs = &coefs[..coefs.len().min(HARMONICS_LIMIT)];
        for (i, &coef) in coefs.iter().enumerate() {
            if coef == 0 {
                continue;
            }
            let step = i + 1;
            let level = coef as f32 / 255.0;
            let mut srcp = 0;
            for sample in dst.samples.iter_mut() {
                *sample += self.samples[srcp] * level;
                srcp = (srcp + step) % WAVE_SIZE;
            }
        }
        dst
    }

    /// Read at a 32-bit phase.
    #[inline]
    pub fn at_phase(&self, phase: u32) -> f32 {
        self.samples[(phase >> crate::WAVE_SHIFT) as usize]
    }
}

impl Deref for Wave {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples[..]
    }
}

/// Equal-tempered frequency in Hz for a MIDI note, A4 (69) at 440.
pub fn note_frequency(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}
