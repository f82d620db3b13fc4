//! Breakpoint envelopes for SFG voices.
//!
//! Unlike the instrument envelopes these have any number of points and no
//! velocity, and after the last point they simply hold.

use super::decode::Reader;
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    frames: i32,
    value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SfgEnv {
    value: f32,
    step: f32,
    ttl: i32,
    index: usize,
    initial: f32,
    points: Vec<Point>,
}

impl SfgEnv {
    pub fn constant(value: f32) -> Self {
        Self {
            value,
            step: 0.0,
            ttl: i32::MAX,
            index: 0,
            initial: value,
            points: Vec::new(),
        }
    }

    /// `u16 v0, u8 count, (u16 ms, u16 v)*`, values multiplied by `scale`.
    pub(crate) fn decode(reader: &mut Reader<'_>, rate: u32, scale: f32) -> Result<Self, DecodeError> {
        let initial = reader.u16()? as f32 * scale;
        let count = reader.u8()? as usize;
        let frames_per_ms = rate as f32 / 1000.0;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let ms = reader.u16()?;
            let value = reader.u16()? as f32 * scale;
            let frames = ((ms as f32 * frames_per_ms) as i32).max(1);
            points.push(Point { frames, value });
        }

        let mut env = Self::constant(initial);
        if let Some(first) = points.first() {
            env.ttl = first.frames;
            env.step = (first.value - initial) / first.frames as f32;
        }
        env.points = points;
        Ok(env)
    }

    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    fn advance(&mut self) {
        self.index += 1;
        match self.points.get(self.index) {
            Some(next) => {
                self.value = self.points[self.index - 1].value;
                self.ttl = next.frames;
                self.step = (next.value - self.value) / next.frames as f32;
            }
            None => {
                self.index = self.points.len();
                self.value = self.points.last().map_or(self.initial, |p| p.value);
                self.ttl = i32::MAX;
                self.step = 0.0;
            }
        }
    }

    #[inline]
    pub fn update(&mut self) -> f32 {
        if self.ttl > 0 {
            self.ttl -= 1;
            self.value += self.step;
        } else {
            self.advance();
        }
        self.value
    }
}
