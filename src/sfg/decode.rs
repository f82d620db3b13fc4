//! Binary SFG program to live voice state.

use std::f32::consts::TAU;

use super::compile::{HEADER_LEN, SIGNATURE};
use super::env::SfgEnv;
use crate::dsp::{Iir, Shape, TapeDelay, Wave};
use crate::error::DecodeError;

/// Big-endian cursor over a byte slice.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    pub fn at(src: &'a [u8], pos: usize) -> Self {
        Self { src, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.src.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated(self.pos));
        }
        let bytes = &self.src[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// u8.8 fixed point.
    pub fn fixed8(&mut self) -> Result<f32, DecodeError> {
        let b = self.take(2)?;
        Ok(b[0] as f32 + b[1] as f32 / 256.0)
    }
}

pub(crate) const SHAPE_NOISE: u8 = 5;
pub(crate) const SHAPE_SILENCE: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RateLfo {
    pub phase: f32,
    pub step: f32,
    /// Octaves at full swing.
    pub range: f32,
}

/// Cheapest oscillator that honors the voice's features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Oscillator {
    Silence,
    Noise,
    /// Constant rate, no modulation: integer phase.
    Flat { phase: u32, step: u32 },
    /// FM and/or rate envelope, no rate LFO.
    Modulated,
    /// Everything, including the rate LFO.
    Full(RateLfo),
}

#[derive(Debug, Clone)]
pub(crate) enum Op {
    Level(SfgEnv),
    Gain(f32),
    Clip(f32),
    Delay(TapeDelay),
    Filter(Iir),
}

#[derive(Debug, Clone)]
pub(crate) struct SfgVoice {
    pub wave: Wave,
    pub oscillator: Oscillator,
    pub rate: SfgEnv,
    pub range: SfgEnv,
    /// Modulator step per unit of carrier rate, radians.
    pub fm_rate: f32,
    pub mod_phase: f32,
    /// Carrier phase, 0..1.
    pub car_phase: f32,
    pub ops: Vec<Op>,
}

#[derive(Debug)]
pub(crate) struct Program {
    pub frames: usize,
    pub master: f32,
    pub voices: Vec<SfgVoice>,
}

pub(crate) fn decode(rate: u32, src: &[u8]) -> Result<Program, DecodeError> {
    if src.len() < HEADER_LEN {
        return Err(DecodeError::Truncated(src.len()));
    }
    if src[..2] != SIGNATURE {
        return Err(DecodeError::Signature);
    }
    let mut reader = Reader::at(src, 2);
    let ms = reader.u16()?;
    let frames = ((ms as f64 / 1000.0 * rate as f64) as usize).max(1);
    let master = reader.fixed8()?;

    let mut voices = Vec::new();
    while !reader.is_empty() {
        let voice = decode_voice(&mut reader, rate)?;
        if voice.oscillator != Oscillator::Silence {
            voices.push(voice);
        }
    }

    Ok(Program {
        frames,
        master,
        voices,
    })
}

fn decode_voice(reader: &mut Reader<'_>, rate: u32) -> Result<SfgVoice, DecodeError> {
    let features = reader.u8()?;

    let shape = if features & 0x01 != 0 { reader.u8()? } else { 0 };

    let harmonics = if features & 0x02 != 0 {
        let count = reader.u8()? as usize;
        Some(reader.take(count)?)
    } else {
        None
    };

    let mut fm_rate = 0.0;
    let mut fm_scale = 1.0;
    if features & 0x04 != 0 {
        fm_rate = reader.fixed8()? * TAU;
        fm_scale = reader.fixed8()?;
    }

    let range = if features & 0x08 != 0 {
        SfgEnv::decode(reader, rate, fm_scale / 65535.0)?
    } else {
        SfgEnv::constant(fm_scale)
    };

    let carrier = if features & 0x10 != 0 {
        SfgEnv::decode(reader, rate, 1.0 / rate as f32)?
    } else {
        SfgEnv::constant(440.0 / rate as f32)
    };

    let lfo = if features & 0x20 != 0 {
        let hz = reader.fixed8()?;
        let cents = reader.u16()?;
        Some(RateLfo {
            phase: 0.0,
            step: hz * TAU / rate as f32,
            range: cents as f32 / 1200.0,
        })
    } else {
        None
    };

    if features & 0xc0 != 0 {
        return Err(DecodeError::UnknownFeatures(features & 0xc0));
    }

    let (wave, oscillator) = match shape {
        SHAPE_NOISE => (Wave::silent(), Oscillator::Noise),
        SHAPE_SILENCE => (Wave::silent(), Oscillator::Silence),
        _ => {
            let base = Wave::from_shape(Shape::from_u8(shape).ok_or(DecodeError::UnknownShape(shape))?);
            let wave = match harmonics {
                Some(coefs) if !coefs.is_empty() => base.with_harmonics(coefs),
                _ => base,
            };
            let oscillator = match lfo {
                Some(lfo) => Oscillator::Full(lfo),
                None if !carrier.has_points() && features & 0x04 == 0 => Oscillator::Flat {
                    phase: 0,
                    step: (carrier.value() * 4_294_967_296.0) as u32,
                },
                None => Oscillator::Modulated,
            };
            (wave, oscillator)
        }
    };

    let mut ops = Vec::new();
    while !reader.is_empty() {
        let opcode = reader.u8()?;
        let op = match opcode {
            0x00 => break,
            0x01 => Op::Level(SfgEnv::decode(reader, rate, 1.0 / 65535.0)?),
            0x02 => Op::Gain(reader.fixed8()?),
            0x03 => Op::Clip(reader.u8()? as f32 / 255.0),
            0x04 => {
                let ms = reader.u16()? as usize;
                let frames = ((ms * rate as usize) / 1000).max(1);
                let f = reader.take(4)?;
                let unit = |b: u8| b as f32 / 255.0;
                Op::Delay(TapeDelay::with_coefficients(
                    frames,
                    unit(f[0]),
                    unit(f[1]),
                    unit(f[2]),
                    unit(f[3]),
                ))
            }
            0x05 | 0x06 => {
                let mid = reader.u16()? as f32 / rate as f32;
                let width = reader.u16()? as f32 / rate as f32;
                Op::Filter(if opcode == 0x05 {
                    Iir::bandpass(mid, width)
                } else {
                    Iir::notch(mid, width)
                })
            }
            0x07 => Op::Filter(Iir::lopass(reader.u16()? as f32 / rate as f32)),
            0x08 => Op::Filter(Iir::hipass(reader.u16()? as f32 / rate as f32)),
            other => return Err(DecodeError::UnknownOpcode(other)),
        };
        ops.push(op);
    }

    Ok(SfgVoice {
        wave,
        oscillator,
        rate: carrier,
        range,
        fm_rate,
        mod_phase: 0.0,
        car_phase: 0.0,
        ops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfg::compile;

    fn program(src: &str, rate: u32) -> Program {
        decode(rate, &compile(src).unwrap()).unwrap()
    }

    #[test]
    fn header_sets_frames_and_master() {
        let p = program("master 0.5\nlevel 0 250 1", 8000);
        assert_eq!(p.frames, 2000);
        assert_eq!(p.master, 0.5);
        assert_eq!(p.voices.len(), 1);
    }

    #[test]
    fn zero_duration_is_one_frame() {
        let p = decode(44_100, &[0xeb, 0xeb, 0, 0, 1, 0]).unwrap();
        assert_eq!(p.frames, 1);
        assert!(p.voices.is_empty());
    }

    #[test]
    fn picks_cheapest_oscillator() {
        assert!(matches!(program("shape square", 8000).voices[0].oscillator, Oscillator::Flat { .. }));
        assert!(matches!(program("fm 1 1", 8000).voices[0].oscillator, Oscillator::Modulated));
        assert!(matches!(program("rate 100 10 200", 8000).voices[0].oscillator, Oscillator::Modulated));
        assert!(matches!(program("ratelfo 2 50", 8000).voices[0].oscillator, Oscillator::Full(_)));
        assert!(matches!(program("shape noise\nfm 1 1", 8000).voices[0].oscillator, Oscillator::Noise));
    }

    #[test]
    fn flat_step_is_440_hz() {
        let p = program("gain 1", 44_100);
        match p.voices[0].oscillator {
            Oscillator::Flat { step, .. } => {
                let hz = step as f64 / 4_294_967_296.0 * 44_100.0;
                assert!((hz - 440.0).abs() < 0.1, "{hz}");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn silent_voices_are_dropped() {
        let p = program("shape silence\nlevel 0 100 1\nendvoice\nshape sine", 8000);
        assert_eq!(p.voices.len(), 1);
        assert_eq!(p.frames, 800);
    }

    #[test]
    fn ops_decode_in_order() {
        let p = program("level 0 10 1\ngain 2\nclip 0.5\ndelay 10 1 0 0 0\nlopass 500\nhipass 100\nbandpass 300 30\nnotch 300 30", 8000);
        let kinds: Vec<&str> = p.voices[0]
            .ops
            .iter()
            .map(|op| match op {
                Op::Level(_) => "level",
                Op::Gain(_) => "gain",
                Op::Clip(_) => "clip",
                Op::Delay(_) => "delay",
                Op::Filter(_) => "filter",
            })
            .collect();
        assert_eq!(kinds, ["level", "gain", "clip", "delay", "filter", "filter", "filter", "filter"]);
    }

    #[test]
    fn errors() {
        assert_eq!(decode(8000, &[0xeb]).unwrap_err(), DecodeError::Truncated(1));
        assert_eq!(decode(8000, &[0xeb, 0xec, 0, 0, 1, 0]).unwrap_err(), DecodeError::Signature);
        assert_eq!(
            decode(8000, &[0xeb, 0xeb, 0, 0, 1, 0, 0x40]).unwrap_err(),
            DecodeError::UnknownFeatures(0x40)
        );
        assert_eq!(
            decode(8000, &[0xeb, 0xeb, 0, 0, 1, 0, 0x01, 9]).unwrap_err(),
            DecodeError::UnknownShape(9)
        );
        assert_eq!(
            decode(8000, &[0xeb, 0xeb, 0, 0, 1, 0, 0x00, 0x09]).unwrap_err(),
            DecodeError::UnknownOpcode(9)
        );
        assert_eq!(
            decode(8000, &[0xeb, 0xeb, 0, 0, 1, 0, 0x00, 0x02, 0x01]).unwrap_err(),
            DecodeError::Truncated(8)
        );
    }
}
