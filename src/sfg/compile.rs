//! SFG text to binary.
//!
//! Output layout:
//!
//! ```text
//! eb eb            signature
//! u16  duration    ms, longest `level` envelope
//! u8.8 master
//! voice*           features byte, oscillator fields, ops..., 00
//! ```

use super::split::{clean_line, parse_int};
use crate::error::{CompileError, CompileErrorKind};

pub const SIGNATURE: [u8; 2] = [0xeb, 0xeb];
pub const HEADER_LEN: usize = 6;

const SHAPE_NAMES: [&str; 7] = ["sine", "square", "sawup", "sawdown", "triangle", "noise", "silence"];

/// Fixed-point field: whole bits, fraction bits.
type Field = (u32, u32);

const U8_8: Field = (8, 8);
const U0_8: Field = (0, 8);
const U16_0: Field = (16, 0);

fn feature_bit(keyword: &str) -> u8 {
    match keyword {
        "shape" => 0x01,
        "harmonics" => 0x02,
        "fm" => 0x04,
        "fmenv" => 0x08,
        "rate" => 0x10,
        "ratelfo" => 0x20,
        _ => 0,
    }
}

fn parse_number(token: &str) -> Result<f64, CompileErrorKind> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CompileErrorKind::ExpectedNumber(token.to_string()))
}

fn push_be(dst: &mut Vec<u8>, v: u32, bytes: usize) {
    for i in (0..bytes).rev() {
        dst.push((v >> (i * 8)) as u8);
    }
}

fn quantize(v: f64, (whole, fract): Field) -> u32 {
    let max = (1u64 << (whole + fract)) - 1;
    let i = (v * (1u64 << fract) as f64) as i64;
    i.clamp(0, max as i64) as u32
}

struct Compiler {
    dst: Vec<u8>,
    duration: u32,
    /// Offset of the open voice's features byte.
    features_at: Option<usize>,
    /// The open voice has emitted a processing op.
    positional: bool,
}

impl Compiler {
    fn new() -> Self {
        let mut dst = Vec::with_capacity(64);
        dst.extend_from_slice(&SIGNATURE);
        dst.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]);
        Self {
            dst,
            duration: 0,
            features_at: None,
            positional: false,
        }
    }

    fn line(&mut self, line: &str) -> Result<(), CompileErrorKind> {
        let (keyword, arg) = match line.find(|c: char| c <= ' ') {
            Some(p) => (&line[..p], line[p..].trim_start_matches(|c: char| c <= ' ')),
            None => (line, ""),
        };

        match keyword {
            "master" => return self.master(arg),
            "endvoice" => {
                if self.features_at.take().is_some() {
                    self.dst.push(0x00);
                }
                self.positional = false;
                return Ok(());
            }
            _ => {}
        }

        let features_at = match self.features_at {
            Some(p) => p,
            None => {
                self.dst.push(0x00);
                let p = self.dst.len() - 1;
                self.features_at = Some(p);
                p
            }
        };

        let fbit = feature_bit(keyword);
        if fbit != 0 {
            let existing = self.dst[features_at];
            if self.positional {
                return Err(CompileErrorKind::MustComeEarlier(keyword.to_string()));
            }
            if fbit & existing != 0 {
                return Err(CompileErrorKind::RepeatedFeature(keyword.to_string()));
            }
            if fbit < existing {
                return Err(CompileErrorKind::MustComeEarlier(keyword.to_string()));
            }
            self.dst[features_at] |= fbit;
        } else {
            self.positional = true;
        }

        match keyword {
            "shape" => self.shape(arg),
            "harmonics" => self.float_list(arg),
            "fm" => self.fixed(arg, None, &[U8_8, U8_8]),
            "fmenv" => self.env(arg, None, 16),
            "rate" => self.env(arg, None, 0),
            "ratelfo" => self.fixed(arg, None, &[U8_8, U16_0]),
            "level" => self.env(arg, Some(0x01), 16),
            "gain" => self.fixed(arg, Some(0x02), &[U8_8]),
            "clip" => self.fixed(arg, Some(0x03), &[U0_8]),
            "delay" => self.fixed(arg, Some(0x04), &[U16_0, U0_8, U0_8, U0_8, U0_8]),
            "bandpass" => self.fixed(arg, Some(0x05), &[U16_0, U16_0]),
            "notch" => self.fixed(arg, Some(0x06), &[U16_0, U16_0]),
            "lopass" => self.fixed(arg, Some(0x07), &[U16_0]),
            "hipass" => self.fixed(arg, Some(0x08), &[U16_0]),
            _ => Err(CompileErrorKind::UnknownCommand(keyword.to_string())),
        }
    }

    fn master(&mut self, arg: &str) -> Result<(), CompileErrorKind> {
        if self.dst.len() > HEADER_LEN {
            return Err(CompileErrorKind::MasterNotFirst);
        }
        let v = parse_number(arg)?.clamp(0.0, 256.0);
        let i = ((v * 256.0) as u32).min(0xffff);
        self.dst[4] = (i >> 8) as u8;
        self.dst[5] = i as u8;
        Ok(())
    }

    fn shape(&mut self, arg: &str) -> Result<(), CompileErrorKind> {
        let index = SHAPE_NAMES
            .iter()
            .position(|name| *name == arg)
            .ok_or_else(|| CompileErrorKind::NotInEnum(arg.to_string()))?;
        self.dst.push(index as u8);
        Ok(())
    }

    /// u8 count, then each token as u0.8.
    fn float_list(&mut self, arg: &str) -> Result<(), CompileErrorKind> {
        let count_at = self.dst.len();
        self.dst.push(0);
        let mut count = 0;
        for token in arg.split_ascii_whitespace() {
            let v = parse_number(token)?;
            self.dst.push(quantize(v, U0_8) as u8);
            count += 1;
        }
        if count > 0xff {
            return Err(CompileErrorKind::TooManyTokens(count));
        }
        self.dst[count_at] = count as u8;
        Ok(())
    }

    fn fixed(&mut self, arg: &str, opcode: Option<u8>, fields: &[Field]) -> Result<(), CompileErrorKind> {
        self.dst.extend(opcode);
        let mut tokens = arg.split_ascii_whitespace();
        for &field in fields {
            let token = tokens.next().unwrap_or("");
            let v = parse_number(token)?;
            let bytes = ((field.0 + field.1) >> 3) as usize;
            push_be(&mut self.dst, quantize(v, field), bytes);
        }
        Ok(())
    }

    /// `v0 [ms v]...` becomes u16 v0, u8 count, (u16 ms, u16 v)...
    fn env(&mut self, arg: &str, opcode: Option<u8>, fract: u32) -> Result<(), CompileErrorKind> {
        self.dst.extend(opcode);
        let scale = (1u64 << fract) as f64;
        let value = |token: &str| -> Result<u16, CompileErrorKind> {
            let i = (parse_number(token)? * scale) as i64;
            Ok(i.clamp(0, 0xffff) as u16)
        };

        let mut tokens = arg.split_ascii_whitespace();
        let v0 = value(tokens.next().unwrap_or(""))?;
        push_be(&mut self.dst, v0 as u32, 2);

        let count_at = self.dst.len();
        self.dst.push(0);
        let mut count = 0usize;
        let mut duration = 0u32;
        while let Some(ms_token) = tokens.next() {
            let ms = parse_int(ms_token)
                .ok_or_else(|| CompileErrorKind::ExpectedMilliseconds(ms_token.to_string()))?
                .clamp(0, 0xffff) as u32;
            push_be(&mut self.dst, ms, 2);
            duration += ms;
            let v = value(tokens.next().unwrap_or(""))?;
            push_be(&mut self.dst, v as u32, 2);
            count += 1;
        }
        if count > 0xff {
            return Err(CompileErrorKind::TooManyTokens(count));
        }
        self.dst[count_at] = count as u8;

        if opcode == Some(0x01) {
            self.duration = self.duration.max(duration);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, CompileErrorKind> {
        if self.duration > 0xffff {
            return Err(CompileErrorKind::DurationTooLong(self.duration));
        }
        self.dst[2] = (self.duration >> 8) as u8;
        self.dst[3] = self.duration as u8;
        Ok(self.dst)
    }
}

/// Compile one sound. Line numbers in errors are 1-based.
pub fn compile(src: &str) -> Result<Vec<u8>, CompileError> {
    compile_block(src, 0)
}

/// Compile one sound whose first line is `lineno0 + 1` of some larger file.
pub fn compile_block(src: &str, lineno0: usize) -> Result<Vec<u8>, CompileError> {
    let mut compiler = Compiler::new();
    let mut lineno = lineno0;
    for raw in src.lines() {
        lineno += 1;
        let line = clean_line(raw);
        if line.is_empty() {
            continue;
        }
        compiler
            .line(line)
            .map_err(|kind| CompileError::new(lineno, kind))?;
    }
    compiler
        .finish()
        .map_err(|kind| CompileError::new(lineno, kind))
}
