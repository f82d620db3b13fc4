//! Live binding of a program id to an instrument.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::builtin::{Builtin, FxParams};
use super::tables::NoteTables;
use crate::dsp::{EnvConfig, Wave};

pub const DEFAULT_WHEEL: u16 = 0x2000;
const DEFAULT_WHEEL_RANGE: f32 = 200.0;
const DEFAULT_MASTER: f32 = 0.25;
const DEFAULT_TRIM: f32 = 0.5;

/// Synthesis mode of a channel, without its parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Drum,
    Blip,
    Wave,
    Rock,
    FmRelative,
    FmAbsolute,
    Sub,
    Fx,
}

/// Mode plus everything derived from the instrument definition at
/// instantiation. Never changes for the life of the channel.
#[derive(Debug, Clone)]
pub enum Instrument {
    /// Notes play sound `(0, base + note)`.
    Drum { base: u16 },
    Blip,
    Wave {
        wave: Arc<Wave>,
        level: EnvConfig,
    },
    Rock {
        wave: Arc<Wave>,
        level: EnvConfig,
        mix: EnvConfig,
    },
    FmRelative {
        level: EnvConfig,
        range: EnvConfig,
        /// Modulator steps per carrier step.
        rate: f32,
    },
    FmAbsolute {
        level: EnvConfig,
        range: EnvConfig,
        /// Fixed modulator phase step.
        step: u32,
    },
    Sub {
        level: EnvConfig,
        /// Band widths, normalized to the output rate.
        widths: [f32; 2],
        gain: f32,
    },
    Fx(FxParams),
}

impl Instrument {
    fn from_builtin(builtin: Builtin, rate: u32, tables: &NoteTables) -> Option<Self> {
        let instrument = match builtin {
            Builtin::Alias(_) => return None,
            Builtin::Blip => Instrument::Blip,
            Builtin::Wave { wave, level } => Instrument::Wave {
                wave: Arc::new(tables.sine().with_harmonics(&wave)),
                level: EnvConfig::tiny(rate, level),
            },
            Builtin::Rock { wave, mix, level } => {
                let level = EnvConfig::tiny(rate, level);
                Instrument::Rock {
                    wave: Arc::new(tables.sine().with_harmonics(&wave)),
                    mix: EnvConfig::parameter(&level, mix),
                    level,
                }
            }
            Builtin::FmRelative { rate: fm, scale, range, level } => {
                let level = EnvConfig::tiny(rate, level);
                Instrument::FmRelative {
                    range: EnvConfig::parameter(&level, range).with_gain(scale as f32 / 16.0),
                    level,
                    rate: fm as f32 / 16.0,
                }
            }
            Builtin::FmAbsolute { rate: fm, scale, range, level } => {
                let level = EnvConfig::tiny(rate, level);
                let hz = fm as f64 / 256.0;
                Instrument::FmAbsolute {
                    range: EnvConfig::parameter(&level, range).with_gain(scale as f32 / 16.0),
                    level,
                    step: (hz / rate as f64 * 4_294_967_296.0) as u32,
                }
            }
            Builtin::Sub { width1, width2, gain, level } => Instrument::Sub {
                level: EnvConfig::tiny(rate, level),
                widths: [width1 as f32 / rate as f32, width2 as f32 / rate as f32],
                gain: gain as f32,
            },
            Builtin::Fx(params) => Instrument::Fx(params),
        };
        Some(instrument)
    }

    pub fn mode(&self) -> ChannelMode {
        match self {
            Instrument::Drum { .. } => ChannelMode::Drum,
            Instrument::Blip => ChannelMode::Blip,
            Instrument::Wave { .. } => ChannelMode::Wave,
            Instrument::Rock { .. } => ChannelMode::Rock,
            Instrument::FmRelative { .. } => ChannelMode::FmRelative,
            Instrument::FmAbsolute { .. } => ChannelMode::FmAbsolute,
            Instrument::Sub { .. } => ChannelMode::Sub,
            Instrument::Fx(_) => ChannelMode::Fx,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Channel {
    chid: u8,
    pid: u32,
    instrument: Instrument,
    wheel: u16,
    /// Cents at full wheel deflection.
    wheel_range: f32,
    bend: f32,
    master: f32,
    trim: f32,
    pan: f32,
}

impl Channel {
    /// Instantiate program `pid`. Ids 0..=127 come from the instrument bank,
    /// 128..=255 are drum kits, anything higher has no channel.
    pub fn new(chid: u8, pid: u32, rate: u32, tables: &NoteTables, override_zero: Option<&Builtin>) -> Option<Self> {
        let instrument = match pid {
            0..=0x7f => Instrument::from_builtin(Builtin::resolve(pid as u8, override_zero)?, rate, tables)?,
            0x80..=0xff => Instrument::Drum {
                base: ((pid - 0x80) * 0x80) as u16,
            },
            _ => return None,
        };
        Some(Self {
            chid,
            pid,
            instrument,
            wheel: DEFAULT_WHEEL,
            wheel_range: DEFAULT_WHEEL_RANGE,
            bend: 1.0,
            master: DEFAULT_MASTER,
            trim: DEFAULT_TRIM,
            pan: 0.0,
        })
    }

    pub fn chid(&self) -> u8 {
        self.chid
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn mode(&self) -> ChannelMode {
        self.instrument.mode()
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn bend(&self) -> f32 {
        self.bend
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn trim(&self) -> f32 {
        self.trim
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn wheel(&self) -> u16 {
        self.wheel
    }

    /// Volume (0x07) and pan (0x0a). Everything else is ignored here.
    pub fn control(&mut self, key: u8, value: u8) {
        match key {
            super::event::CONTROL_VOLUME => self.trim = value as f32 / 127.0,
            super::event::CONTROL_PAN => self.pan = value as f32 / 64.0 - 1.0,
            _ => {}
        }
    }

    /// Store a new wheel position. Returns the bend multiplier for this
    /// channel's voices, or `None` if nothing changed or the mode has no
    /// per-voice pitch.
    pub fn set_wheel(&mut self, value: u16) -> Option<f32> {
        if value == self.wheel {
            return None;
        }
        self.wheel = value;
        match self.instrument {
            Instrument::Drum { .. } | Instrument::Fx(_) => None,
            _ => {
                let cents = (self.wheel as f32 - DEFAULT_WHEEL as f32) * self.wheel_range;
                self.bend = 2.0f32.powf(cents / (8192.0 * 1200.0));
                Some(self.bend)
            }
        }
    }

    /// Gain of a drum hit at `velocity`.
    pub fn drum_trim(&self, velocity: u8) -> f32 {
        0.05 + self.trim * self.master * velocity as f32 / 50.0
    }
}
