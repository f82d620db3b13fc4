//! The General-MIDI-ish instrument bank.
//!
//! Every program id below 128 names one entry here. Entries are plain data;
//! [`crate::synth::Channel`] expands them into envelope configs and wavetables
//! when a channel is instantiated.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::{BOW, IMPULSE, PLUCK, TONE};

/// Attack bits of a tiny envelope descriptor, 0..=7.
const fn attack(n: u8) -> u8 {
    n << 3
}

/// Release bits of a tiny envelope descriptor, 0..=7.
const fn release(n: u8) -> u8 {
    n
}

/// Parameters of an FX-mode instrument.
///
/// Rates marked u4.4 are in beats at the current tempo.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FxParams {
    /// Modulation depth envelope, four level nibbles.
    pub range_env: u16,
    /// Depth LFO period, u4.4 beats. Zero disables.
    pub range_lfo: u8,
    /// Depth LFO swing, u4.4 added to the modulation depth.
    pub range_lfo_depth: u8,
    /// Modulator rate relative to the carrier, u4.4.
    pub rate: u8,
    /// Modulation depth scale, u4.4.
    pub scale: u8,
    /// Tiny level envelope.
    pub level: u8,
    /// Detune LFO period, u4.4 beats.
    pub detune_rate: u8,
    pub detune_depth: u8,
    pub overdrive: u8,
    /// Delay period, u4.4 beats.
    pub delay_rate: u8,
    pub delay_depth: u8,
}

/// One instrument definition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Naive square wave with a fixed decay. Cheapest thing that makes a tone.
    Blip,
    /// Use another entry's definition.
    Alias(u8),
    /// Harmonics of a sine, coefficients 0..=255.
    Wave { wave: [u8; 8], level: u8 },
    /// [`Builtin::Wave`] crossfaded against a plain sine by a parameter envelope.
    Rock { wave: [u8; 8], mix: u16, level: u8 },
    /// Two-operator FM with the modulator locked to the note, rate u4.4.
    FmRelative { rate: u8, scale: u8, range: u16, level: u8 },
    /// Two-operator FM with a fixed modulator frequency, rate u8.8 Hz.
    FmAbsolute { rate: u16, scale: u8, range: u16, level: u8 },
    /// White noise through two band-pass filters at the note. Widths in Hz.
    Sub { width1: u16, width2: u16, gain: u8, level: u8 },
    Fx(FxParams),
}

impl Default for Builtin {
    fn default() -> Self {
        BUILTINS[0]
    }
}

impl Builtin {
    /// Entry for a program id, following one level of [`Builtin::Alias`].
    /// `override_zero` replaces entry zero when present.
    pub fn resolve(pid: u8, override_zero: Option<&Builtin>) -> Option<Builtin> {
        let lookup = |pid: u8| -> Option<Builtin> {
            match (pid, override_zero) {
                (0, Some(custom)) => Some(*custom),
                _ => BUILTINS.get(pid as usize).copied(),
            }
        };
        match lookup(pid)? {
            Builtin::Alias(target) => {
                tracing::warn!(pid, target, "instrument is an alias");
                match lookup(target)? {
                    Builtin::Alias(_) => None,
                    builtin => Some(builtin),
                }
            }
            builtin => Some(builtin),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Builtin::Alias(_))
    }
}

pub static BUILTINS: [Builtin; 128] = [
    // 0x00 Acoustic Grand Piano
    Builtin::Blip,
    // 0x01 Bright Acoustic Piano
    Builtin::Alias(0x00),
    // 0x02 Electric Grand Piano
    Builtin::FmRelative {
        rate: 0x20,
        scale: 0x40,
        range: 0x8fc8,
        level: TONE | attack(0) | release(4),
    },
    // 0x03 Honky-Tonk Piano
    Builtin::FmRelative {
        rate: 0x18,
        scale: 0x40,
        range: 0xff82,
        level: TONE | attack(1) | release(3),
    },
    // 0x04 EP 1 (Rhodes)
    Builtin::Rock {
        wave: [0x80, 0xc0, 0x40, 0x20, 0x08, 0x00, 0x00, 0x00],
        mix: 0x0f80,
        level: TONE | attack(1) | release(3),
    },
    // 0x05 EP 2 (Chorus)
    Builtin::FmAbsolute {
        rate: 0x0800,
        scale: 0x01,
        range: 0x0f30,
        level: PLUCK | attack(2) | release(4),
    },
    // 0x06 Harpsichord
    Builtin::FmRelative {
        rate: 0x50,
        scale: 0x50,
        range: 0xfff0,
        level: IMPULSE | attack(0) | release(5),
    },
    // 0x07 Clavinet
    Builtin::FmRelative {
        rate: 0x40,
        scale: 0x50,
        range: 0x8f00,
        level: PLUCK | attack(0) | release(5),
    },
    // 0x08 Celesta
    Builtin::FmRelative {
        rate: 0x7a,
        scale: 0x87,
        range: 0xf87a,
        level: IMPULSE | attack(0) | release(6),
    },
    // 0x09 Glockenspiel
    Builtin::FmRelative {
        rate: 0x30,
        scale: 0x40,
        range: 0xfff4,
        level: IMPULSE | attack(0) | release(3),
    },
    // 0x0a Music Box
    Builtin::FmRelative {
        rate: 0x62,
        scale: 0x80,
        range: 0xff84,
        level: IMPULSE | attack(0) | release(5),
    },
    // 0x0b Vibraphone
    Builtin::FmRelative {
        rate: 0x40,
        scale: 0x40,
        range: 0x0ff4,
        level: IMPULSE | attack(1) | release(5),
    },
    // 0x0c Marimba
    Builtin::FmRelative {
        rate: 0x80,
        scale: 0x38,
        range: 0x8ff4,
        level: IMPULSE | attack(0) | release(5),
    },
    // 0x0d Xylophone
    Builtin::FmRelative {
        rate: 0x80,
        scale: 0x30,
        range: 0xfff4,
        level: IMPULSE | attack(0) | release(5),
    },
    // 0x0e Tubular Bells
    Builtin::FmRelative {
        rate: 0x38,
        scale: 0x67,
        range: 0xf8ff,
        level: IMPULSE | attack(1) | release(6),
    },
    // 0x0f Dulcimer
    Builtin::FmRelative {
        rate: 0x60,
        scale: 0x70,
        range: 0x8f84,
        level: IMPULSE | attack(0) | release(6),
    },
    // 0x10 Drawbar Organ
    Builtin::Rock {
        wave: [0xff, 0x02, 0x55, 0x01, 0x33, 0x00, 0x11, 0x00],
        mix: 0x2f8c,
        level: BOW | attack(2) | release(5),
    },
    // 0x11 Percussive Organ
    Builtin::Rock {
        wave: [0x00, 0xc0, 0x04, 0x40, 0x01, 0x00, 0x00, 0x00],
        mix: 0xc2f4,
        level: PLUCK | attack(0) | release(5),
    },
    // 0x12 Rock Organ
    Builtin::Rock {
        wave: [0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00],
        mix: 0x0f84,
        level: TONE | attack(2) | release(4),
    },
    // 0x13 Church Organ
    Builtin::Rock {
        wave: [0xc0, 0xa0, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00],
        mix: 0xfff0,
        level: TONE | attack(3) | release(6),
    },
    // 0x14 Reed Organ
    Builtin::Rock {
        wave: [0x00, 0x7c, 0xa5, 0x80, 0x33, 0x60, 0x11, 0x00],
        mix: 0x0ff0,
        level: TONE | attack(2) | release(3),
    },
    // 0x15 Accordion (French)
    Builtin::Alias(0x10),
    // 0x16 Harmonica
    Builtin::Alias(0x10),
    // 0x17 Tango Accordion
    Builtin::Alias(0x10),
    // 0x18 Nylon Acoustic Guitar
    Builtin::FmRelative {
        rate: 0x20,
        scale: 0x10,
        range: 0x4fc0,
        level: IMPULSE | attack(0) | release(5),
    },
    // 0x19 Steel Acoustic Guitar
    Builtin::Fx(FxParams {
        range_env: 0x0f80,
        range_lfo: 0x00,
        range_lfo_depth: 0x00,
        rate: 0x60,
        scale: 0x78,
        level: PLUCK | attack(0) | release(4),
        detune_rate: 0x40,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x10,
    }),
    // 0x1a Jazz Electric Guitar
    Builtin::Fx(FxParams {
        range_env: 0x0fff,
        range_lfo: 0x10,
        range_lfo_depth: 0x08,
        rate: 0x20,
        scale: 0x40,
        level: PLUCK | attack(0) | release(4),
        detune_rate: 0x40,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x00,
        delay_depth: 0x00,
    }),
    // 0x1b Clean Electric Guitar
    Builtin::Fx(FxParams {
        range_env: 0x7f84,
        range_lfo: 0x20,
        range_lfo_depth: 0x10,
        rate: 0x20,
        scale: 0x40,
        level: PLUCK | attack(1) | release(4),
        detune_rate: 0x10,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x08,
        delay_depth: 0x40,
    }),
    // 0x1c Muted Electric Guitar
    Builtin::Fx(FxParams {
        range_env: 0x0ff0,
        range_lfo: 0x20,
        range_lfo_depth: 0x20,
        rate: 0x20,
        scale: 0x40,
        level: PLUCK | attack(0) | release(4),
        detune_rate: 0x10,
        detune_depth: 0x10,
        overdrive: 0x10,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x1d Overdriven Guitar
    Builtin::Fx(FxParams {
        range_env: 0xff80,
        range_lfo: 0x40,
        range_lfo_depth: 0,
        rate: 0x20,
        scale: 0x30,
        level: PLUCK | attack(1) | release(4),
        detune_rate: 0x40,
        detune_depth: 0x02,
        overdrive: 0x60,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x1e Distortion Guitar
    Builtin::Fx(FxParams {
        range_env: 0xff44,
        range_lfo: 0x20,
        range_lfo_depth: 0x08,
        rate: 0x08,
        scale: 0x30,
        level: PLUCK | attack(3) | release(5),
        detune_rate: 0x10,
        detune_depth: 0x10,
        overdrive: 0xe0,
        delay_rate: 0x10,
        delay_depth: 0x10,
    }),
    // 0x1f Guitar Harmonics
    Builtin::Fx(FxParams {
        range_env: 0x0ff0,
        range_lfo: 0x00,
        range_lfo_depth: 0x00,
        rate: 0x77,
        scale: 0x80,
        level: PLUCK | attack(3) | release(5),
        detune_rate: 0x10,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x10,
    }),
    // 0x20 Acoustic Bass
    Builtin::FmRelative {
        rate: 0x08,
        scale: 0x18,
        range: 0x6fd8,
        level: TONE | attack(1) | release(3),
    },
    // 0x21 Fingered Electric Bass
    Builtin::Fx(FxParams {
        range_env: 0x8fc4,
        range_lfo: 0x20,
        range_lfo_depth: 0x04,
        rate: 0x08,
        scale: 0x20,
        level: PLUCK | attack(0) | release(3),
        detune_rate: 0x00,
        detune_depth: 0x00,
        overdrive: 0x00,
        delay_rate: 0x00,
        delay_depth: 0x00,
    }),
    // 0x22 Picked Electric Bass
    Builtin::Wave {
        wave: [0xc0, 0xc0, 0x30, 0x00, 0x10, 0x80, 0x40, 0x20],
        level: PLUCK | attack(1) | release(3),
    },
    // 0x23 Fretless Bass
    Builtin::FmRelative {
        rate: 0x08,
        scale: 0x20,
        range: 0x4f80,
        level: TONE | attack(3) | release(4),
    },
    // 0x24 Slap Bass 1
    Builtin::FmRelative {
        rate: 0x08,
        scale: 0x28,
        range: 0x6f61,
        level: PLUCK | attack(1) | release(3),
    },
    // 0x25 Slap Bass 2
    Builtin::Rock {
        wave: [0x40, 0xff, 0xc0, 0x80, 0x40, 0x10, 0x08, 0x02],
        mix: 0x0f40,
        level: PLUCK | attack(2) | release(4),
    },
    // 0x26 Synth Bass 1
    Builtin::FmRelative {
        rate: 0x08,
        scale: 0x30,
        range: 0x4fc2,
        level: PLUCK | attack(2) | release(2),
    },
    // 0x27 Synth Bass 2
    Builtin::FmRelative {
        rate: 0x08,
        scale: 0x50,
        range: 0x8ff0,
        level: PLUCK | attack(1) | release(4),
    },
    // 0x28 Violin
    Builtin::Rock {
        wave: [0x20, 0xc0, 0x70, 0x58, 0x40, 0x20, 0x08, 0x00],
        mix: 0x8fc0,
        level: BOW | attack(3) | release(5),
    },
    // 0x29 Viola
    Builtin::Rock {
        wave: [0xff, 0x80, 0x55, 0x40, 0x33, 0x20, 0x08, 0x00],
        mix: 0x8fc0,
        level: BOW | attack(3) | release(5),
    },
    // 0x2a Cello
    Builtin::Rock {
        wave: [0x40, 0xff, 0x80, 0x55, 0x40, 0x33, 0x20, 0x08],
        mix: 0x8fc0,
        level: BOW | attack(3) | release(4),
    },
    // 0x2b Contrabass
    Builtin::FmRelative {
        rate: 0x08,
        scale: 0x40,
        range: 0xf888,
        level: BOW | attack(3) | release(5),
    },
    // 0x2c Tremolo Strings
    Builtin::Fx(FxParams {
        range_env: 0x0fc4,
        range_lfo: 0x08,
        range_lfo_depth: 0x02,
        rate: 0x10,
        scale: 0x20,
        level: BOW | attack(0) | release(6),
        detune_rate: 0x00,
        detune_depth: 0x00,
        overdrive: 0x00,
        delay_rate: 0x00,
        delay_depth: 0x00,
    }),
    // 0x2d Pizzicato Strings
    Builtin::Fx(FxParams {
        range_env: 0x0fc4,
        range_lfo: 0x08,
        range_lfo_depth: 0x08,
        rate: 0x10,
        scale: 0x30,
        level: IMPULSE | attack(0) | release(5),
        detune_rate: 0x04,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x10,
    }),
    // 0x2e Orchestral Harp
    Builtin::Fx(FxParams {
        range_env: 0x8fc4,
        range_lfo: 0x00,
        range_lfo_depth: 0x00,
        rate: 0x30,
        scale: 0x30,
        level: IMPULSE | attack(0) | release(6),
        detune_rate: 0x04,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x2f Timpani
    Builtin::Sub {
        width1: 50,
        width2: 10,
        gain: 150,
        level: IMPULSE | attack(1) | release(3),
    },
    // 0x30 String Ensemble 1
    Builtin::Fx(FxParams {
        range_env: 0x8fc4,
        range_lfo: 0x40,
        range_lfo_depth: 0x08,
        rate: 0x18,
        scale: 0x20,
        level: BOW | attack(2) | release(5),
        detune_rate: 0x10,
        detune_depth: 0x08,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x31 String Ensemble 2
    Builtin::Alias(0x30),
    // 0x32 Synth Strings 1
    Builtin::Fx(FxParams {
        range_env: 0xcfe4,
        range_lfo: 0x40,
        range_lfo_depth: 0x08,
        rate: 0x08,
        scale: 0x50,
        level: BOW | attack(2) | release(5),
        detune_rate: 0x10,
        detune_depth: 0x08,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x33 Synth Strings 2
    Builtin::Alias(0x30),
    // 0x34 Choir Aahs
    Builtin::Alias(0x30),
    // 0x35 Voice Oohs
    Builtin::Alias(0x30),
    // 0x36 Synth Voice
    Builtin::Alias(0x30),
    // 0x37 Orchestra Hit
    Builtin::Alias(0x30),
    // 0x38 Trumpet
    Builtin::Rock {
        wave: [0x20, 0xc0, 0x60, 0x50, 0x40, 0x10, 0x08, 0x02],
        mix: 0xf0f4,
        level: BOW | attack(3) | release(3),
    },
    // 0x39 Trombone
    Builtin::Alias(0x38),
    // 0x3a Tuba
    Builtin::Alias(0x38),
    // 0x3b Muted Trumpet
    Builtin::Alias(0x38),
    // 0x3c French Horn
    Builtin::Alias(0x38),
    // 0x3d Brass Section
    Builtin::Alias(0x38),
    // 0x3e Synth Brass 1
    Builtin::Alias(0x38),
    // 0x3f Synth Brass 2
    Builtin::Alias(0x38),
    // 0x40 Soprano Sax
    Builtin::FmRelative {
        rate: 0x40,
        scale: 0x30,
        range: 0x4fc2,
        level: TONE | attack(2) | release(4),
    },
    // 0x41 Alto Sax
    Builtin::Alias(0x40),
    // 0x42 Tenor Sax
    Builtin::Alias(0x40),
    // 0x43 Baritone Sax
    Builtin::Alias(0x40),
    // 0x44 Oboe
    Builtin::Alias(0x40),
    // 0x45 English Horn
    Builtin::Alias(0x40),
    // 0x46 Bassoon
    Builtin::Alias(0x40),
    // 0x47 Clarinet
    Builtin::Rock {
        wave: [0x20, 0x8c, 0xe0, 0x00, 0x73, 0x00, 0x31, 0x00],
        mix: 0x00ff,
        level: PLUCK | attack(1) | release(4),
    },
    // 0x48 Piccolo
    Builtin::Blip,
    // 0x49 Flute
    Builtin::Alias(0x48),
    // 0x4a Recorder
    Builtin::Wave {
        wave: [0x80, 0x10, 0xf5, 0x00, 0x33, 0x00, 0x11, 0x04],
        level: TONE | attack(4) | release(3),
    },
    // 0x4b Pan Flute
    Builtin::Alias(0x48),
    // 0x4c Blown Bottle
    Builtin::Sub {
        width1: 25,
        width2: 15,
        gain: 45,
        level: TONE | attack(1) | release(4),
    },
    // 0x4d Shakuhachi
    Builtin::FmRelative {
        rate: 0x43,
        scale: 0x18,
        range: 0x0f30,
        level: PLUCK | attack(2) | release(4),
    },
    // 0x4e Whistle
    Builtin::Alias(0x48),
    // 0x4f Ocarina
    Builtin::FmRelative {
        rate: 0x20,
        scale: 0x28,
        range: 0x8f00,
        level: BOW | attack(2) | release(5),
    },
    // 0x50 Square Lead
    Builtin::Wave {
        wave: [0xff, 0x00, 0x55, 0x00, 0x33, 0x00, 0x10, 0x00],
        level: TONE | attack(1) | release(3),
    },
    // 0x51 Saw Lead
    Builtin::Wave {
        wave: [0xff, 0x80, 0x55, 0x40, 0x33, 0x20, 0x10, 0x08],
        level: TONE | attack(2) | release(3),
    },
    // 0x52 Calliope
    Builtin::Rock {
        wave: [0x00, 0xff, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00],
        mix: 0x0f80,
        level: TONE | attack(1) | release(5),
    },
    // 0x53 Chiffer
    Builtin::Blip,
    // 0x54 Charang
    Builtin::Rock {
        wave: [0x00, 0xff, 0x40, 0x20, 0x10, 0x08, 0x00, 0x00],
        mix: 0x00ff,
        level: TONE | attack(1) | release(4),
    },
    // 0x55 Voice Solo
    Builtin::FmRelative {
        rate: 0x28,
        scale: 0x20,
        range: 0xf8c4,
        level: BOW | attack(3) | release(4),
    },
    // 0x56 Fifths
    Builtin::FmRelative {
        rate: 0x18,
        scale: 0x40,
        range: 0x8fc4,
        level: TONE | attack(3) | release(4),
    },
    // 0x57 Bass and Lead
    Builtin::Rock {
        wave: [0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0x00],
        mix: 0xcf00,
        level: TONE | attack(2) | release(4),
    },
    // 0x58 Fantasia Pad
    Builtin::Fx(FxParams {
        range_env: 0xffff,
        range_lfo: 0x80,
        range_lfo_depth: 0x20,
        rate: 0x10,
        scale: 0x10,
        level: BOW | attack(0) | release(7),
        detune_rate: 0x10,
        detune_depth: 0x18,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x59 Warm Pad
    Builtin::Wave {
        wave: [0xff, 0x10, 0x08, 0x02, 0x00, 0x00, 0x00, 0x00],
        level: BOW | attack(0) | release(3),
    },
    // 0x5a Polysynth Pad
    Builtin::Fx(FxParams {
        range_env: 0xcf40,
        range_lfo: 0x40,
        range_lfo_depth: 0x10,
        rate: 0x10,
        scale: 0x40,
        level: BOW | attack(2) | release(5),
        detune_rate: 0x40,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x5b Choir Space Voice
    Builtin::Sub {
        width1: 40,
        width2: 25,
        gain: 40,
        level: BOW | attack(3) | release(4),
    },
    // 0x5c Bowed Glass
    Builtin::Sub {
        width1: 20,
        width2: 40,
        gain: 30,
        level: BOW | attack(2) | release(5),
    },
    // 0x5d Metallic Pad
    Builtin::Fx(FxParams {
        range_env: 0xfff0,
        range_lfo: 0x40,
        range_lfo_depth: 0x04,
        rate: 0x76,
        scale: 0x30,
        level: BOW | attack(2) | release(6),
        detune_rate: 0x80,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x08,
    }),
    // 0x5e Halo Pad
    Builtin::Rock {
        wave: [0x00, 0xff, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01],
        mix: 0x04f0,
        level: BOW | attack(3) | release(6),
    },
    // 0x5f Sweep Pad
    Builtin::Fx(FxParams {
        range_env: 0xffff,
        range_lfo: 0x40,
        range_lfo_depth: 0x20,
        rate: 0x40,
        scale: 0x30,
        level: BOW | attack(2) | release(6),
        detune_rate: 0x40,
        detune_depth: 0x10,
        overdrive: 0x00,
        delay_rate: 0x10,
        delay_depth: 0x08,
    }),
    // 0x60 Rain
    Builtin::Fx(FxParams {
        range_env: 0x8ff0,
        range_lfo: 0x80,
        range_lfo_depth: 0x80,
        rate: 0x38,
        scale: 0x60,
        level: IMPULSE | attack(2) | release(3),
        detune_rate: 0x00,
        detune_depth: 0x00,
        overdrive: 0x00,
        delay_rate: 0x08,
        delay_depth: 0xa0,
    }),
    // 0x61 Soundtrack
    Builtin::Alias(0x60),
    // 0x62 Crystal
    Builtin::Alias(0x60),
    // 0x63 Atmosphere
    Builtin::Alias(0x60),
    // 0x64 Brightness
    Builtin::Alias(0x60),
    // 0x65 Goblins
    Builtin::Fx(FxParams {
        range_env: 0x8ff0,
        range_lfo: 0x40,
        range_lfo_depth: 0x40,
        rate: 0x08,
        scale: 0x40,
        level: PLUCK | attack(2) | release(3),
        detune_rate: 0x00,
        detune_depth: 0x00,
        overdrive: 0x40,
        delay_rate: 0x10,
        delay_depth: 0x80,
    }),
    // 0x66 Echoes, Drops
    Builtin::Fx(FxParams {
        range_env: 0xf0ff,
        range_lfo: 0x40,
        range_lfo_depth: 0x80,
        rate: 0x20,
        scale: 0x10,
        level: PLUCK | attack(2) | release(3),
        detune_rate: 0x10,
        detune_depth: 0x20,
        overdrive: 0x00,
        delay_rate: 0x08,
        delay_depth: 0xa0,
    }),
    // 0x67 Sci-Fi Star Theme
    Builtin::Fx(FxParams {
        range_env: 0x0fff,
        range_lfo: 0x80,
        range_lfo_depth: 0x18,
        rate: 0x20,
        scale: 0x60,
        level: BOW | attack(1) | release(5),
        detune_rate: 0x10,
        detune_depth: 0x08,
        overdrive: 0x08,
        delay_rate: 0x10,
        delay_depth: 0x20,
    }),
    // 0x68 Sitar
    Builtin::Blip,
    // 0x69 Banjo
    Builtin::Alias(0x68),
    // 0x6a Shamisen
    Builtin::Alias(0x68),
    // 0x6b Koto
    Builtin::Alias(0x68),
    // 0x6c Kalimba
    Builtin::Alias(0x68),
    // 0x6d Bag Pipe
    Builtin::Alias(0x68),
    // 0x6e Fiddle
    Builtin::Alias(0x68),
    // 0x6f Shanai
    Builtin::Alias(0x68),
    // 0x70 Tinkle Bell
    Builtin::FmRelative {
        rate: 0x90,
        scale: 0xa0,
        range: 0xff8f,
        level: IMPULSE | attack(0) | release(6),
    },
    // 0x71 Agogo
    Builtin::FmRelative {
        rate: 0x57,
        scale: 0x40,
        range: 0xffff,
        level: IMPULSE | attack(0) | release(5),
    },
    // 0x72 Steel Drums
    Builtin::FmRelative {
        rate: 0x58,
        scale: 0x40,
        range: 0xf0ff,
        level: IMPULSE | attack(1) | release(5),
    },
    // 0x73 Wood Block
    Builtin::FmRelative {
        rate: 0x18,
        scale: 0x20,
        range: 0x0fff,
        level: IMPULSE | attack(0) | release(2),
    },
    // 0x74 Taiko
    Builtin::FmRelative {
        rate: 0x04,
        scale: 0x30,
        range: 0xf0ff,
        level: IMPULSE | attack(1) | release(5),
    },
    // 0x75 Melodic Tom
    Builtin::FmRelative {
        rate: 0x18,
        scale: 0x38,
        range: 0xf8f0,
        level: IMPULSE | attack(1) | release(3),
    },
    // 0x76 Synth Drum
    Builtin::Fx(FxParams {
        range_env: 0xff80,
        range_lfo: 0x0a,
        range_lfo_depth: 0x20,
        rate: 0x08,
        scale: 0x20,
        level: IMPULSE | attack(0) | release(3),
        detune_rate: 0x08,
        detune_depth: 0x04,
        overdrive: 0,
        delay_rate: 0,
        delay_depth: 0,
    }),
    // 0x77 Reverse Cymbal
    Builtin::Alias(0x70),
    // 0x78 Guitar Fret Noise
    Builtin::FmRelative {
        rate: 0x58,
        scale: 0xa0,
        range: 0xf88f,
        level: IMPULSE | attack(3) | release(4),
    },
    // 0x79 Breath Noise
    Builtin::Sub {
        width1: 40,
        width2: 40,
        gain: 30,
        level: PLUCK | attack(3) | release(3),
    },
    // 0x7a Seashore
    Builtin::Sub {
        width1: 200,
        width2: 100,
        gain: 5,
        level: BOW | attack(3) | release(7),
    },
    // 0x7b Bird Tweet
    Builtin::FmAbsolute {
        rate: 0x0800,
        scale: 0x12,
        range: 0xf400,
        level: PLUCK | attack(1) | release(5),
    },
    // 0x7c Telephone Ring
    Builtin::FmAbsolute {
        rate: 0x1000,
        scale: 0x08,
        range: 0xcfc0,
        level: IMPULSE | attack(3) | release(3),
    },
    // 0x7d Helicopter
    Builtin::FmAbsolute {
        rate: 0x0800,
        scale: 0x10,
        range: 0x0ff0,
        level: TONE | attack(1) | release(5),
    },
    // 0x7e Applause
    Builtin::Blip,
    // 0x7f Gunshot
    Builtin::Sub {
        width1: 400,
        width2: 400,
        gain: 1,
        level: IMPULSE | attack(1) | release(4),
    },
];
