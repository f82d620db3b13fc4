use std::f32::consts::PI;

use fastrand::Rng;

use super::decode::{decode, Op, Oscillator, SfgVoice};
use super::pcm::Pcm;
use crate::config::{MAX_RATE, MIN_RATE};
use crate::error::DecodeError;
use crate::{WAVE_SHIFT, WAVE_SIZE};

/// Largest chunk a printer renders at once.
pub const PRINT_CHUNK: usize = 256;

const NOISE_SEED: u64 = 0x5f6_e99;

/// Incremental renderer for one SFG program.
///
/// The PCM is allocated at its final length up front and filled from the start
/// as [`Printer::update`] is called. Whatever is past the cursor reads as silence.
#[derive(Debug)]
pub struct Printer {
    pcm: Pcm,
    cursor: usize,
    master: f32,
    voices: Vec<SfgVoice>,
    rng: Rng,
}

impl Printer {
    pub fn new(rate: u32, src: &[u8]) -> Result<Self, DecodeError> {
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(DecodeError::Rate(rate));
        }
        let program = decode(rate, src)?;
        Ok(Self {
            pcm: Pcm::zeroed(program.frames),
            cursor: 0,
            master: program.master,
            voices: program.voices,
            rng: Rng::with_seed(NOISE_SEED),
        })
    }

    /// Decode and print to completion.
    pub fn print_all(rate: u32, src: &[u8]) -> Result<Pcm, DecodeError> {
        let mut printer = Self::new(rate, src)?;
        printer.update(printer.pcm.len());
        Ok(printer.pcm)
    }

    pub fn pcm(&self) -> &Pcm {
        &self.pcm
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.pcm.len()
    }

    /// Print up to `frames` more samples. Returns true once the whole buffer is
    /// printed; `update(0)` only polls.
    pub fn update(&mut self, frames: usize) -> bool {
        if self.voices.is_empty() {
            self.cursor = self.pcm.len();
            return true;
        }
        let mut remaining = frames;
        let mut scratch = [0.0f32; PRINT_CHUNK];
        let mut samples = self.pcm.write();
        while remaining > 0 {
            let len = (samples.len() - self.cursor).min(remaining).min(PRINT_CHUNK);
            if len == 0 {
                break;
            }
            let dst = &mut samples[self.cursor..self.cursor + len];
            let tmp = &mut scratch[..len];
            for voice in self.voices.iter_mut() {
                voice.oscillate(tmp, &mut self.rng);
                voice.apply_ops(tmp);
                for (d, s) in dst.iter_mut().zip(tmp.iter()) {
                    *d += *s;
                }
            }
            for d in dst.iter_mut() {
                *d *= self.master;
            }
            self.cursor += len;
            remaining -= len;
        }
        self.cursor >= samples.len()
    }
}

fn wrap_radians(p: &mut f32) {
    if *p >= PI {
        *p -= PI * 2.0;
    }
}

impl SfgVoice {
    fn oscillate(&mut self, dst: &mut [f32], rng: &mut Rng) {
        match &mut self.oscillator {
            Oscillator::Silence => dst.fill(0.0),
            Oscillator::Noise => {
                for sample in dst.iter_mut() {
                    *sample = (rng.u16(..) as i32 - 32768) as f32 / 32768.0;
                }
            }
            Oscillator::Flat { phase, step } => {
                for sample in dst.iter_mut() {
                    *sample = self.wave[(*phase >> WAVE_SHIFT) as usize];
                    *phase = phase.wrapping_add(*step);
                }
            }
            Oscillator::Modulated => {
                for sample in dst.iter_mut() {
                    let rate = self.rate.update();
                    *sample = self.modulated_sample(rate);
                }
            }
            Oscillator::Full(lfo) => {
                let lfo = *lfo;
                let mut lfo_phase = lfo.phase;
                for sample in dst.iter_mut() {
                    let rate = self.rate.update() * 2.0f32.powf(lfo_phase.sin() * lfo.range);
                    lfo_phase += lfo.step;
                    wrap_radians(&mut lfo_phase);
                    *sample = self.modulated_sample(rate);
                }
                if let Oscillator::Full(live) = &mut self.oscillator {
                    live.phase = lfo_phase;
                }
            }
        }
    }

    /// One sample of the FM carrier at normalized `rate`, then advance.
    #[inline]
    fn modulated_sample(&mut self, rate: f32) -> f32 {
        let modulation = self.mod_phase.sin() * self.range.update();
        self.mod_phase += rate * self.fm_rate;
        wrap_radians(&mut self.mod_phase);

        let index = (self.car_phase * WAVE_SIZE as f32) as i32;
        let out = if (0..WAVE_SIZE as i32).contains(&index) {
            self.wave[index as usize]
        } else {
            self.wave[0]
        };
        self.car_phase += rate + rate * modulation;
        if self.car_phase >= 1.0 {
            self.car_phase -= 1.0;
        }
        out
    }

    fn apply_ops(&mut self, buf: &mut [f32]) {
        for op in self.ops.iter_mut() {
            match op {
                Op::Level(env) => {
                    for s in buf.iter_mut() {
                        *s *= env.update();
                    }
                }
                Op::Gain(gain) => {
                    for s in buf.iter_mut() {
                        *s *= *gain;
                    }
                }
                Op::Clip(limit) => {
                    for s in buf.iter_mut() {
                        *s = s.clamp(-*limit, *limit);
                    }
                }
                Op::Delay(delay) => delay.render(buf),
                Op::Filter(filter) => filter.render(buf),
            }
        }
    }
}
