use std::sync::Arc;

use fastrand::Rng;

use super::channel::{Channel, Instrument};
use super::pool::PoolEntry;
use super::tables::NoteTables;
use crate::dsp::{Envelope, Iir, Wave};
use crate::SONG_CHANNEL_COUNT;

/// Who started a voice or proc. Only song-origin ones hold back the next song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Song,
    User,
}

impl Origin {
    pub fn for_channel(chid: u8) -> Self {
        if (chid as usize) < SONG_CHANNEL_COUNT {
            Origin::Song
        } else {
            Origin::User
        }
    }
}

/// Released voices keep their slot under this note id until they finish.
pub const RELEASED_NOTE: u8 = 0xff;

#[derive(Debug, Clone)]
enum Signal {
    Blip { ttl: i32, level: f32 },
    Wave { wave: Arc<Wave>, level: Envelope },
    Rock { wave: Arc<Wave>, level: Envelope, mix: Envelope },
    Fm { level: Envelope, range: Envelope, mod_phase: u32, mod_step: u32 },
    Sub { level: Envelope, filters: [Iir; 2] },
}

/// One sounding note on a simple-mode channel.
#[derive(Debug, Clone)]
pub struct Voice {
    chid: u8,
    note: u8,
    origin: Origin,
    birthday: u64,
    defunct: bool,
    phase: u32,
    /// Phase step before the wheel.
    step0: u32,
    step: u32,
    signal: Signal,
}

impl Voice {
    /// Start `note` on `channel`. `dur` is the sustain in frames. Returns `None`
    /// for invalid notes and for modes that don't use voices (drums, FX).
    pub fn begin(
        channel: &Channel,
        note: u8,
        velocity: u8,
        dur: i32,
        rate: u32,
        tables: &NoteTables,
        birthday: u64,
    ) -> Option<Self> {
        if note >= 0x80 {
            return None;
        }
        let step0 = tables.ifreq(note);
        let gain = channel.master() * channel.trim();
        let signal = match channel.instrument() {
            Instrument::Drum { .. } | Instrument::Fx(_) => return None,
            Instrument::Blip => Signal::Blip {
                ttl: dur.max((rate >> 4) as i32),
                level: channel.trim() * (velocity as f32 + 10.0) / 1000.0,
            },
            Instrument::Wave { wave, level } => Signal::Wave {
                wave: Arc::clone(wave),
                level: Envelope::new(level, velocity, dur).with_gain(gain),
            },
            Instrument::Rock { wave, level, mix } => Signal::Rock {
                wave: Arc::clone(wave),
                level: Envelope::new(level, velocity, dur).with_gain(gain),
                mix: Envelope::new(mix, velocity, dur),
            },
            Instrument::FmRelative { level, range, rate } => Signal::Fm {
                level: Envelope::new(level, velocity, dur).with_gain(gain),
                range: Envelope::new(range, velocity, dur),
                mod_phase: 0,
                mod_step: (step0 as f32 * rate) as u32,
            },
            Instrument::FmAbsolute { level, range, step } => Signal::Fm {
                level: Envelope::new(level, velocity, dur).with_gain(gain),
                range: Envelope::new(range, velocity, dur),
                mod_phase: 0,
                mod_step: *step,
            },
            Instrument::Sub { level, widths, gain: sub_gain } => {
                let freq = tables.ffreq(note);
                Signal::Sub {
                    level: Envelope::new(level, velocity, dur).with_gain(gain * sub_gain),
                    filters: [Iir::bandpass(freq, widths[0]), Iir::bandpass(freq, widths[1])],
                }
            }
        };
        Some(Self {
            chid: channel.chid(),
            note,
            origin: Origin::for_channel(channel.chid()),
            birthday,
            defunct: false,
            phase: 0,
            step0,
            step: (step0 as f32 * channel.bend()) as u32,
            signal,
        })
    }

    pub fn chid(&self) -> u8 {
        self.chid
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_song(&self) -> bool {
        !self.defunct && self.origin == Origin::Song
    }

    /// Still sounding `note` on `chid`.
    pub fn is_note(&self, chid: u8, note: u8) -> bool {
        !self.defunct && self.chid == chid && self.note == note
    }

    pub fn release(&mut self) {
        self.note = RELEASED_NOTE;
        match &mut self.signal {
            Signal::Blip { ttl, .. } => *ttl = 0,
            Signal::Wave { level, .. }
            | Signal::Rock { level, .. }
            | Signal::Fm { level, .. }
            | Signal::Sub { level, .. } => level.release(),
        }
    }

    pub fn set_bend(&mut self, bend: f32) {
        self.step = (self.step0 as f32 * bend) as u32;
    }

    /// Mix into `out`. `sine` is the shared sine table, `rng` feeds noise modes.
    pub fn update(&mut self, out: &mut [f32], sine: &Wave, rng: &mut Rng) {
        if self.defunct {
            return;
        }
        let step = self.step;
        match &mut self.signal {
            Signal::Blip { ttl, level } => {
                for o in out.iter_mut() {
                    if *ttl <= 0 {
                        *ttl = 0;
                        self.defunct = true;
                        return;
                    }
                    *ttl -= 1;
                    if self.phase & 0x8000_0000 != 0 {
                        *o += *level;
                    } else {
                        *o -= *level;
                    }
                    self.phase = self.phase.wrapping_add(step);
                }
                return;
            }
            Signal::Wave { wave, level } => {
                for o in out.iter_mut() {
                    *o += wave.at_phase(self.phase) * level.update();
                    self.phase = self.phase.wrapping_add(step);
                }
            }
            Signal::Rock { wave, level, mix } => {
                for o in out.iter_mut() {
                    let a = wave.at_phase(self.phase);
                    let b = sine.at_phase(self.phase);
                    let mix = mix.update();
                    *o += (a * mix + b * (1.0 - mix)) * level.update();
                    self.phase = self.phase.wrapping_add(step);
                }
            }
            Signal::Fm {
                level,
                range,
                mod_phase,
                mod_step,
            } => {
                for o in out.iter_mut() {
                    *o += sine.at_phase(self.phase) * level.update();
                    let modulation = sine.at_phase(*mod_phase) * range.update();
                    *mod_phase = mod_phase.wrapping_add(*mod_step);
                    let swing = (step as f32 * modulation) as i32;
                    self.phase = self.phase.wrapping_add(step).wrapping_add_signed(swing);
                }
            }
            Signal::Sub { level, filters } => {
                for o in out.iter_mut() {
                    let noise = rng.u16(..) as f32 / 32768.0 - 1.0;
                    let stage0 = filters[0].process(noise);
                    let sample = filters[1].process(stage0);
                    *o += (sample * level.update()).clamp(-0.5, 0.5);
                }
            }
        }
        if self.level_finished() {
            self.defunct = true;
        }
    }

    fn level_finished(&self) -> bool {
        match &self.signal {
            Signal::Blip { ttl, .. } => *ttl <= 0,
            Signal::Wave { level, .. }
            | Signal::Rock { level, .. }
            | Signal::Fm { level, .. }
            | Signal::Sub { level, .. } => level.is_finished(),
        }
    }
}

impl PoolEntry for Voice {
    fn is_defunct(&self) -> bool {
        self.defunct
    }

    fn is_older_than(&self, other: &Self) -> bool {
        self.birthday < other.birthday
    }
}
