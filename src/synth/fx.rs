//! FX-mode instruments.
//!
//! Unlike the simple modes, an FX channel renders through one long-lived
//! [`FxProc`] that owns its own small polyphony and a chain of shared effects:
//!
//! ```text
//! voices (sine FM pairs) -> overdrive -> detune -> delay -> trim -> fade
//!            ^
//!        range LFO
//! ```
//!
//! The proc is created with its channel and lives until the song ends, at
//! which point it fades out over about one second.

use std::f32::consts::{PI, TAU};

use super::builtin::FxParams;
use super::channel::Channel;
use super::pool::PoolEntry;
use super::tables::NoteTables;
use super::voice::{Origin, RELEASED_NOTE};
use crate::dsp::{Detune, EnvConfig, Envelope, TapeDelay, Wave};
use crate::BUFFER_LIMIT;

pub const FX_VOICE_LIMIT: usize = 8;

/// Frames over which a released proc fades to silence.
const FADE_FRAMES: i32 = 10_000;

#[derive(Debug, Clone)]
struct FxVoice {
    car_phase: f32,
    mod_phase: f32,
    car_step0: f32,
    car_step: f32,
    mod_step: f32,
    level: Envelope,
    range: Envelope,
    birthday: u64,
    note: u8,
}

impl FxVoice {
    fn update(&mut self, out: &mut [f32], lfo: &[f32]) {
        if self.level.is_finished() {
            return;
        }
        for (o, lfo) in out.iter_mut().zip(lfo) {
            *o += self.car_phase.sin() * self.level.update();

            let modulation = self.mod_phase.sin() * (self.range.update() + lfo);
            self.mod_phase += self.mod_step;
            if self.mod_phase > PI {
                self.mod_phase -= TAU;
            }
            self.car_phase += self.car_step + self.car_step * modulation;
            if self.car_phase > PI {
                self.car_phase -= TAU;
            }
        }
    }

    fn release(&mut self) {
        self.level.release();
        self.range.release();
    }
}

#[derive(Debug, Clone)]
pub struct FxProc {
    chid: u8,
    origin: Origin,
    birthday: u64,
    defunct: bool,
    voices: Vec<FxVoice>,
    level: EnvConfig,
    range: EnvConfig,
    wheel_range: f32,
    bend: f32,
    mod_rate: f32,
    lfo_phase: u32,
    lfo_step: u32,
    lfo_range: f32,
    drive: f32,
    clip: f32,
    trim: f32,
    delay: Option<TapeDelay>,
    detune: Option<Detune>,
    detune_phase: u32,
    detune_step: u32,
    /// Frames left after release. Zero while playing.
    ttl: i32,
    rate: u32,
    buf: Vec<f32>,
    lfo_buf: Vec<f32>,
}

impl FxProc {
    /// Build the proc for `channel`. Rates in `params` are in beats, resolved
    /// against `frames_per_beat` now and never again.
    pub fn new(channel: &Channel, params: &FxParams, rate: u32, frames_per_beat: u32, birthday: u64) -> Self {
        let fpb = frames_per_beat as u64;
        let beats = |v: u8| ((v as u64 * fpb) >> 4) as u32;

        let (lfo_step, lfo_range) = match beats(params.range_lfo) {
            period if period > 0 && params.range_lfo_depth != 0 => {
                (u32::MAX / period, params.range_lfo_depth as f32 / 16.0)
            }
            _ => (0, 0.0),
        };

        let (drive, clip) = if params.overdrive > 0 {
            (
                1.0 + params.overdrive as f32 / 4.0,
                (1.0 - params.overdrive as f32 / 500.0) * channel.master(),
            )
        } else {
            (0.0, 0.0)
        };

        let level = EnvConfig::tiny(rate, params.level).with_gain(channel.master());
        let range = EnvConfig::parameter(&level, params.range_env).with_gain(params.scale as f32 / 16.0);

        let delay = (params.delay_rate != 0 && params.delay_depth != 0).then(|| {
            let depth = params.delay_depth as f32 / 255.0;
            TapeDelay::with_mix(beats(params.delay_rate) as usize, 0.125 + depth * 0.5, 0.25 + depth * 0.5)
        });

        let mut detune_step = 0;
        let detune = (params.detune_rate != 0 && params.detune_depth != 0).then(|| {
            let period = beats(params.detune_rate).max(1);
            detune_step = u32::MAX / period;
            Detune::new(1 + (params.detune_depth as usize * period as usize) / 5000)
        });

        Self {
            chid: channel.chid(),
            origin: Origin::for_channel(channel.chid()),
            birthday,
            defunct: false,
            voices: Vec::with_capacity(FX_VOICE_LIMIT),
            level,
            range,
            wheel_range: 200.0,
            bend: 1.0,
            mod_rate: params.rate as f32 / 16.0,
            lfo_phase: 0,
            lfo_step,
            lfo_range,
            drive,
            clip,
            trim: channel.trim(),
            delay,
            detune,
            // Lowest point of the sine.
            detune_phase: 0xc000_0000,
            detune_step,
            ttl: 0,
            rate,
            buf: vec![0.0; BUFFER_LIMIT],
            lfo_buf: vec![0.0; BUFFER_LIMIT],
        }
    }

    pub fn chid(&self) -> u8 {
        self.chid
    }

    pub fn is_song(&self) -> bool {
        !self.defunct && self.origin == Origin::Song
    }

    /// Internal voices still allocated.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn trim(&self) -> f32 {
        self.trim
    }

    pub fn note_once(&mut self, note: u8, velocity: u8, dur: i32, tables: &NoteTables, birthday: u64) {
        let car_step0 = tables.ffreq(note) * TAU;
        let car_step = car_step0 * self.bend;
        let voice = FxVoice {
            car_phase: 0.0,
            mod_phase: 0.0,
            car_step0,
            car_step,
            mod_step: car_step * self.mod_rate,
            level: Envelope::new(&self.level, velocity, dur),
            range: Envelope::new(&self.range, velocity, dur),
            birthday,
            note,
        };
        if self.voices.len() < FX_VOICE_LIMIT {
            self.voices.push(voice);
            return;
        }
        let mut slot = 0;
        for (i, v) in self.voices.iter().enumerate() {
            if v.level.is_finished() {
                slot = i;
                break;
            }
            if v.birthday < self.voices[slot].birthday {
                slot = i;
            }
        }
        self.voices[slot] = voice;
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, tables: &NoteTables, birthday: u64) {
        self.note_once(note, velocity, i32::MAX, tables, birthday);
    }

    /// Release every voice on `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in self.voices.iter_mut().filter(|v| v.note == note) {
            voice.release();
            voice.note = RELEASED_NOTE;
        }
    }

    pub fn control(&mut self, key: u8, value: u8) {
        if key == super::event::CONTROL_VOLUME {
            self.trim = value as f32 / 127.0;
        }
    }

    pub fn wheel(&mut self, value: u16) {
        let deflection = (value as f32 - 0x2000 as f32) / 8192.0;
        self.bend = 2.0f32.powf(self.wheel_range * deflection / 1200.0);
        for voice in self.voices.iter_mut() {
            voice.car_step = voice.car_step0 * self.bend;
            voice.mod_step = voice.car_step * self.mod_rate;
        }
    }

    /// Release all voices but keep the proc alive for new notes.
    pub fn release_notes(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.release();
            voice.note = RELEASED_NOTE;
        }
    }

    /// Release all voices and start the fade out. The proc goes defunct
    /// about a second later.
    pub fn release(&mut self) {
        self.release_notes();
        self.ttl = self.rate as i32;
    }

    /// Mix into `out`, at most [`BUFFER_LIMIT`] frames.
    pub fn update(&mut self, out: &mut [f32], sine: &Wave) {
        if self.defunct {
            return;
        }
        let len = out.len().min(BUFFER_LIMIT);
        let buf = &mut self.buf[..len];
        buf.fill(0.0);

        let lfo = &mut self.lfo_buf[..len];
        if self.lfo_range > 0.0 {
            for l in lfo.iter_mut() {
                *l = sine.at_phase(self.lfo_phase) * self.lfo_range;
                self.lfo_phase = self.lfo_phase.wrapping_add(self.lfo_step);
            }
        }

        for voice in self.voices.iter_mut() {
            voice.update(buf, lfo);
        }
        while self.voices.last().is_some_and(|v| v.level.is_finished()) {
            self.voices.pop();
        }

        if self.drive > 0.0 {
            for s in buf.iter_mut() {
                *s = (*s * self.drive).clamp(-self.clip, self.clip);
            }
        }

        if let Some(detune) = &mut self.detune {
            for s in buf.iter_mut() {
                let phase = sine.at_phase(self.detune_phase);
                self.detune_phase = self.detune_phase.wrapping_add(self.detune_step);
                *s = detune.process(*s, phase) * 0.25 + *s * 0.75;
            }
        }

        if let Some(delay) = &mut self.delay {
            delay.render(buf);
        }

        if self.trim < 1.0 {
            for s in buf.iter_mut() {
                *s *= self.trim;
            }
        }

        if self.ttl > 0 {
            for s in buf.iter_mut() {
                if self.ttl <= 0 {
                    *s = 0.0;
                    self.defunct = true;
                } else if self.ttl < FADE_FRAMES {
                    *s *= self.ttl as f32 / FADE_FRAMES as f32;
                }
                self.ttl -= 1;
            }
        }

        for (o, s) in out.iter_mut().zip(buf.iter()) {
            *o += *s;
        }
    }
}

impl PoolEntry for FxProc {
    fn is_defunct(&self) -> bool {
        self.defunct
    }

    fn is_older_than(&self, other: &Self) -> bool {
        self.birthday < other.birthday
    }
}
