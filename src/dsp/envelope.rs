/*
Velocity-Sensitive Linear Envelopes
===================================

Every instrument voice multiplies its signal by one of these. A second copy,
the "parameter envelope", drives things that aren't loudness (FM depth, the
wave/sine mix) with the same timing as the level.

Vocabulary
----------

  config      Two complete breakpoint sets: `lo` for velocity 0 and `hi` for
              velocity 127. Built once per channel.

  runner      The per-note state ([`Envelope`]). Picks its breakpoints from the
              config at note start, then walks them one sample at a time.

  ttl         Frames remaining in the current stage.

  tiny        An 8-bit instrument descriptor that expands into a full config.


The Shape
---------

    level
      atk ┐   ╱╲
          │  ╱  ╲
      dec │ ╱    ╲______________
          │╱                    ╲
      ini └──────────────────────╲── rls
           attack decay  sustain  release   (finished: holds rls)

Four levels (initial, attack, decay, release) and four durations. Sustain is
a flat hold at the decay level whose length is usually the note's duration.


Tiny Descriptor
---------------

    0xc0  profile   IMPULSE  no sustain, quiet tail
                    PLUCK    loud attack, heavy loss afterward
                    TONE     attack a bit louder than sustain
                    BOW      barely any attack contrast
    0x38  attack    5 .. 80 ms at full velocity
    0x07  release   40 .. 1200 ms at full velocity

Soft notes get double the attack and decay time, half the release, a third
of the attack level and half the decay level.


Velocity
--------

    velocity 0     lo exactly
    velocity 127   hi exactly
    otherwise      times: (hi*v + lo*(127-v)) >> 7
                   levels: linear in v/127
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tiny descriptor profiles (bits 0xc0).
pub const IMPULSE: u8 = 0x00;
pub const PLUCK: u8 = 0x40;
pub const TONE: u8 = 0x80;
pub const BOW: u8 = 0xc0;

const ATTACK_MS: [i32; 8] = [5, 8, 12, 18, 30, 45, 60, 80];
const RELEASE_MS: [i32; 8] = [40, 60, 100, 200, 300, 400, 800, 1200];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    Finished,
}

/// One set of breakpoints. Times in frames.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvPoints {
    pub attack_time: i32,
    pub decay_time: i32,
    pub sustain_time: i32,
    pub release_time: i32,
    pub initial: f32,
    pub attack: f32,
    pub decay: f32,
    pub release: f32,
}

impl EnvPoints {
    fn scale(&mut self, gain: f32) {
        self.initial *= gain;
        self.attack *= gain;
        self.decay *= gain;
        self.release *= gain;
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvConfig {
    pub lo: EnvPoints,
    pub hi: EnvPoints,
}

fn ms_to_frames(ms: i32, rate: u32) -> i32 {
    ((ms as i64 * rate as i64) / 1000).max(1) as i32
}

impl EnvConfig {
    /// Expand a tiny descriptor at the given output rate.
    pub fn tiny(rate: u32, src: u8) -> Self {
        let attack_ms = ATTACK_MS[((src >> 3) & 7) as usize];
        let release_ms = RELEASE_MS[(src & 7) as usize];
        let (sustain, decay_level, attack_level) = match src & 0xc0 {
            IMPULSE => (0, 0.250, 1.0),
            PLUCK => (1, 0.200, 1.0),
            TONE => (1, 0.400, 0.750),
            _ => (1, 0.400, 0.400),
        };
        let decay_ms = (attack_ms * 3) / 2;

        let sustain_frames = |ms: i32| if ms == 0 { 0 } else { ms_to_frames(ms, rate) };

        let hi = EnvPoints {
            attack_time: ms_to_frames(attack_ms, rate),
            decay_time: ms_to_frames(decay_ms, rate),
            sustain_time: sustain_frames(sustain),
            release_time: ms_to_frames(release_ms, rate),
            initial: 0.0,
            attack: attack_level,
            decay: decay_level,
            release: 0.0,
        };
        let lo = EnvPoints {
            attack_time: ms_to_frames(attack_ms << 1, rate),
            decay_time: ms_to_frames(decay_ms << 1, rate),
            sustain_time: sustain_frames(sustain),
            release_time: ms_to_frames(release_ms >> 1, rate),
            initial: 0.0,
            attack: attack_level * 0.333,
            decay: decay_level * 0.5,
            release: 0.0,
        };
        Self { lo, hi }
    }

    /// Borrow `reference`'s timing and take levels from four nibbles, high to low:
    /// initial, attack, decay, release. Low velocity pulls each level halfway
    /// toward the average of all four.
    pub fn parameter(reference: &EnvConfig, src: u16) -> Self {
        let nibble = |shift: u16| ((src >> shift) & 15) as f32 / 15.0;
        let mut config = *reference;
        config.hi.initial = nibble(12);
        config.hi.attack = nibble(8);
        config.hi.decay = nibble(4);
        config.hi.release = nibble(0);
        let hi = config.hi;
        let avg = (hi.initial + hi.attack + hi.decay + hi.release) / 4.0;
        config.lo.initial = (hi.initial + avg) / 2.0;
        config.lo.attack = (hi.attack + avg) / 2.0;
        config.lo.decay = (hi.decay + avg) / 2.0;
        config.lo.release = (hi.release + avg) / 2.0;
        config
    }

    pub fn gain(&mut self, gain: f32) {
        self.lo.scale(gain);
        self.hi.scale(gain);
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain(gain);
        self
    }

    fn for_velocity(&self, velocity: u8) -> EnvPoints {
        if velocity == 0 {
            return self.lo;
        }
        if velocity >= 0x7f {
            return self.hi;
        }
        let (lo, hi) = (&self.lo, &self.hi);
        let v = velocity as i32;
        let bi = 0x7f - v;
        let time = |hi: i32, lo: i32| (hi * v + lo * bi) >> 7;
        let af = velocity as f32 / 127.0;
        let bf = 1.0 - af;
        let level = |hi: f32, lo: f32| hi * af + lo * bf;
        EnvPoints {
            attack_time: time(hi.attack_time, lo.attack_time),
            decay_time: time(hi.decay_time, lo.decay_time),
            sustain_time: time(hi.sustain_time, lo.sustain_time),
            release_time: time(hi.release_time, lo.release_time),
            initial: level(hi.initial, lo.initial),
            attack: level(hi.attack, lo.attack),
            decay: level(hi.decay, lo.decay),
            release: level(hi.release, lo.release),
        }
    }
}

/// Envelope runner for one note.
#[derive(Debug, Clone)]
pub struct Envelope {
    level: f32,
    step: f32,
    ttl: i32,
    stage: EnvelopeStage,
    points: EnvPoints,
}

fn slope(from: f32, to: f32, frames: i32) -> f32 {
    if frames > 0 {
        (to - from) / frames as f32
    } else {
        0.0
    }
}

impl Envelope {
    /// Start a note. A positive `dur` (frames) replaces the configured sustain,
    /// unless the config has no sustain at all (IMPULSE).
    pub fn new(config: &EnvConfig, velocity: u8, dur: i32) -> Self {
        let mut points = config.for_velocity(velocity);
        points.sustain_time = if points.sustain_time != 0 && dur > 0 {
            dur
        } else {
            1
        };
        let mut env = Self {
            level: 0.0,
            step: 0.0,
            ttl: 0,
            stage: EnvelopeStage::Attack,
            points,
        };
        env.reset();
        env
    }

    fn reset(&mut self) {
        self.stage = EnvelopeStage::Attack;
        self.ttl = self.points.attack_time;
        self.level = self.points.initial;
        self.step = slope(self.level, self.points.attack, self.ttl);
    }

    /// Scale all levels and restart. Only meaningful before the first update.
    pub fn gain(&mut self, gain: f32) {
        self.points.scale(gain);
        self.reset();
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain(gain);
        self
    }

    /// Let the note go. Safe at any stage.
    pub fn release(&mut self) {
        match self.stage {
            EnvelopeStage::Attack | EnvelopeStage::Decay => self.points.sustain_time = 1,
            EnvelopeStage::Sustain => self.ttl = 0,
            EnvelopeStage::Release | EnvelopeStage::Finished => {}
        }
    }

    fn advance(&mut self) {
        let p = self.points;
        match self.stage {
            EnvelopeStage::Attack => {
                self.stage = EnvelopeStage::Decay;
                self.level = p.attack;
                self.ttl = p.decay_time;
                self.step = slope(p.attack, p.decay, p.decay_time);
            }
            EnvelopeStage::Decay => {
                self.stage = EnvelopeStage::Sustain;
                self.level = p.decay;
                self.ttl = p.sustain_time;
                self.step = 0.0;
            }
            EnvelopeStage::Sustain => {
                self.stage = EnvelopeStage::Release;
                self.level = p.decay;
                self.ttl = p.release_time;
                self.step = slope(p.decay, p.release, p.release_time);
            }
            EnvelopeStage::Release | EnvelopeStage::Finished => {
                self.stage = EnvelopeStage::Finished;
                self.level = p.release;
                self.ttl = i32::MAX;
                self.step = 0.0;
            }
        }
    }

    #[inline]
    pub fn update(&mut self) -> f32 {
        if self.ttl <= 0 {
            self.advance();
        }
        self.ttl -= 1;
        self.level += self.step;
        self.level
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.update();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.stage == EnvelopeStage::Finished
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn points(&self) -> &EnvPoints {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    fn run_to_finish(env: &mut Envelope, limit: usize) -> usize {
        for i in 0..limit {
            if env.is_finished() {
                return i;
            }
            env.update();
        }
        limit
    }

    #[test]
    fn tiny_profiles_match_descriptor() {
        let impulse = EnvConfig::tiny(1000, IMPULSE);
        assert_eq!(impulse.hi.sustain_time, 0);
        assert_eq!(impulse.hi.attack_time, 5);
        assert_eq!(impulse.hi.decay_time, 7);
        assert_eq!(impulse.hi.release_time, 40);
        assert_eq!(impulse.lo.attack_time, 10);
        assert_eq!(impulse.lo.release_time, 20);

        let bow = EnvConfig::tiny(1000, BOW | (7 << 3) | 7);
        assert_eq!(bow.hi.attack_time, 80);
        assert_eq!(bow.hi.release_time, 1200);
        assert!((bow.hi.attack - 0.4).abs() < 1e-6);
        assert!((bow.lo.attack - 0.4 * 0.333).abs() < 1e-6);
        assert_eq!(bow.hi.sustain_time, 1);
    }

    #[test]
    fn tiny_times_never_zero() {
        let config = EnvConfig::tiny(200, PLUCK);
        assert!(config.hi.attack_time >= 1);
        assert!(config.hi.decay_time >= 1);
        assert!(config.lo.release_time >= 1);
    }

    #[test]
    fn parameter_lo_pulls_toward_average() {
        let level = EnvConfig::tiny(RATE, TONE);
        let param = EnvConfig::parameter(&level, 0xf000);
        assert_eq!(param.hi.attack_time, level.hi.attack_time);
        assert!((param.hi.initial - 1.0).abs() < 1e-6);
        assert!((param.lo.initial - 0.625).abs() < 1e-6);
        assert!((param.lo.release - 0.125).abs() < 1e-6);
    }

    #[test]
    fn velocity_extremes_use_exact_sets() {
        let config = EnvConfig::tiny(RATE, TONE | 0x08 | 2);
        let soft = Envelope::new(&config, 0, 0);
        let loud = Envelope::new(&config, 127, 0);
        assert_eq!(soft.points().attack_time, config.lo.attack_time);
        assert_eq!(loud.points().attack_time, config.hi.attack_time);
        assert_eq!(loud.points().attack, config.hi.attack);
    }

    #[test]
    fn duration_overrides_sustain_only_when_configured() {
        let tone = EnvConfig::tiny(RATE, TONE);
        assert_eq!(Envelope::new(&tone, 100, 5000).points().sustain_time, 5000);
        assert_eq!(Envelope::new(&tone, 100, 0).points().sustain_time, 1);

        let impulse = EnvConfig::tiny(RATE, IMPULSE);
        assert_eq!(Envelope::new(&impulse, 100, 5000).points().sustain_time, 1);
    }

    #[test]
    fn reaches_finished_within_stage_total() {
        for &src in &[IMPULSE, PLUCK | 0x3f, TONE | 0x12, BOW | 0x25] {
            let config = EnvConfig::tiny(RATE, src);
            for velocity in [0u8, 1, 64, 126, 127] {
                let mut env = Envelope::new(&config, velocity, 300);
                let p = *env.points();
                let total = (p.attack_time + p.decay_time + p.sustain_time + p.release_time) as usize + 4;
                let used = run_to_finish(&mut env, total + 1);
                assert!(used <= total, "src {src:#x} vel {velocity}: {used} > {total}");
                let held = env.update();
                for _ in 0..100 {
                    assert_eq!(env.update(), held, "finished envelope must hold");
                }
            }
        }
    }

    #[test]
    fn attack_peaks_then_decays_to_sustain() {
        let config = EnvConfig::tiny(1000, TONE);
        let mut env = Envelope::new(&config, 127, 100);
        let mut peak = 0.0f32;
        for _ in 0..(5 + 7 + 2) {
            peak = peak.max(env.update());
        }
        assert!((peak - 0.75).abs() < 0.01, "peak {peak}");
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn release_while_sustaining_moves_on_update() {
        let config = EnvConfig::tiny(1000, TONE);
        let mut env = Envelope::new(&config, 127, 10_000);
        for _ in 0..50 {
            env.update();
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        env.release();
        env.update();
        assert_eq!(env.stage(), EnvelopeStage::Release);
    }

    #[test]
    fn release_during_attack_skips_long_sustain() {
        let config = EnvConfig::tiny(1000, BOW);
        let mut env = Envelope::new(&config, 127, i32::MAX);
        env.update();
        env.release();
        let used = run_to_finish(&mut env, 10_000);
        assert!(used < 10_000, "released envelope should finish promptly");
    }

    #[test]
    fn gain_scales_levels() {
        let config = EnvConfig::tiny(1000, PLUCK);
        let env = Envelope::new(&config, 127, 0).with_gain(0.5);
        assert!((env.points().attack - 0.5).abs() < 1e-6);
        assert!((env.points().decay - 0.1).abs() < 1e-6);
    }
}
