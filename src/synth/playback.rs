use super::pool::PoolEntry;
use crate::sfg::Pcm;

/// One-shot render of a printed buffer.
#[derive(Debug, Clone)]
pub struct Playback {
    pcm: Pcm,
    position: usize,
    gain: f32,
}

impl Playback {
    /// Output is mono, so `_pan` is accepted for API symmetry and ignored.
    pub fn new(pcm: Pcm, trim: f32, _pan: f32) -> Self {
        Self {
            pcm,
            position: 0,
            gain: trim,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn pcm(&self) -> &Pcm {
        &self.pcm
    }

    /// Mix the next `out.len()` samples into `out`.
    pub fn update(&mut self, out: &mut [f32]) {
        if self.is_defunct() {
            return;
        }
        let samples = self.pcm.read();
        let src = &samples[self.position..];
        let len = src.len().min(out.len());
        for (o, s) in out[..len].iter_mut().zip(src) {
            *o += *s * self.gain;
        }
        self.position += len;
    }
}

impl PoolEntry for Playback {
    fn is_defunct(&self) -> bool {
        self.position >= self.pcm.len()
    }

    /// Further along means started earlier.
    fn is_older_than(&self, other: &Self) -> bool {
        self.position > other.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixes_then_retires() {
        let pcm = Pcm::from_samples(vec![1.0, 0.5, -1.0]);
        let mut playback = Playback::new(pcm, 0.5, 0.0);
        let mut out = [0.25; 2];
        playback.update(&mut out);
        assert_eq!(out, [0.75, 0.5]);
        assert!(!playback.is_defunct());

        let mut out = [0.0; 4];
        playback.update(&mut out);
        assert_eq!(out, [-0.5, 0.0, 0.0, 0.0]);
        assert!(playback.is_defunct());
    }

    #[test]
    fn further_along_is_older() {
        let pcm = Pcm::zeroed(10);
        let mut a = Playback::new(pcm.clone(), 1.0, 0.0);
        let b = Playback::new(pcm, 1.0, 0.0);
        a.update(&mut [0.0; 3]);
        assert!(a.is_older_than(&b));
        assert!(!b.is_older_than(&a));
    }
}
