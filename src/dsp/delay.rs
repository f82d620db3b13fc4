//! Ring-buffer effects: a feedback tape delay and a phase-driven detune.
//!
//! Both allocate their buffer once at construction and never again.

/// Tape delay with separate output mix and storage feedback.
///
/// Per sample, with `prv` the sample leaving the tape:
///
/// ```text
/// tape[p] = input*store + prv*feedback
/// output  = input*dry   + prv*wet
/// ```
#[derive(Debug, Clone)]
pub struct TapeDelay {
    dry: f32,
    wet: f32,
    store: f32,
    feedback: f32,
    buffer: Box<[f32]>,
    pos: usize,
}

fn split_unit(v: f32) -> (f32, f32) {
    if v >= 1.0 {
        (1.0, 0.0)
    } else if v <= 0.0 {
        (0.0, 1.0)
    } else {
        (v, 1.0 - v)
    }
}

impl TapeDelay {
    /// Complementary coefficients from two 0..1 controls: `dry = 1 - mix`,
    /// `store = 1 - feedback`.
    pub fn with_mix(frames: usize, mix: f32, feedback: f32) -> Self {
        let (wet, dry) = split_unit(mix);
        let (feedback, store) = split_unit(feedback);
        Self::with_coefficients(frames, dry, wet, store, feedback)
    }

    pub fn with_coefficients(frames: usize, dry: f32, wet: f32, store: f32, feedback: f32) -> Self {
        Self {
            dry,
            wet,
            store,
            feedback,
            buffer: vec![0.0; frames.max(1)].into_boxed_slice(),
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let prv = self.buffer[self.pos];
        self.buffer[self.pos] = input * self.store + prv * self.feedback;
        self.pos += 1;
        if self.pos >= self.buffer.len() {
            self.pos = 0;
        }
        input * self.dry + prv * self.wet
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

/// Variable read-head delay. `phase` in -1..=1 sweeps the read head across the
/// whole buffer, which bends pitch while it moves.
#[derive(Debug, Clone)]
pub struct Detune {
    half: f32,
    buffer: Box<[f32]>,
    pos: usize,
}

impl Detune {
    pub fn new(frames: usize) -> Self {
        let frames = frames.max(1);
        Self {
            half: frames as f32 * 0.5,
            buffer: vec![0.0; frames].into_boxed_slice(),
            pos: 0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32, phase: f32) -> f32 {
        let len = self.buffer.len();
        let back = (((phase + 1.0) * self.half).round() as i64).clamp(0, len as i64 - 1) as usize;
        let read = if back > self.pos {
            self.pos + len - back
        } else {
            self.pos - back
        };
        self.buffer[self.pos] = input;
        self.pos += 1;
        if self.pos >= len {
            self.pos = 0;
        }
        self.buffer[read]
    }
}
