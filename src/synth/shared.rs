use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::context::Synth;

/// A [`Synth`] behind a mutex, for hosts that drive it from an audio callback
/// and poke it from elsewhere.
///
/// The audio thread holds the lock for one update at a time. Control threads
/// should keep their critical sections short, or better, queue
/// [`super::SynthMessage`]s and let the audio thread drain them.
#[derive(Debug, Clone)]
pub struct SharedSynth {
    inner: Arc<Mutex<Synth>>,
}

/// Exclusive access to a [`SharedSynth`].
pub struct SynthGuard<'a>(MutexGuard<'a, Synth>);

impl SharedSynth {
    pub fn new(synth: Synth) -> Self {
        Self {
            inner: Arc::new(Mutex::new(synth)),
        }
    }

    /// Lock the synth. A panic while it was held doesn't poison it: the synth
    /// has no invariant a half-finished update can break.
    pub fn lock(&self) -> SynthGuard<'_> {
        SynthGuard(self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Lock, update into `out`, unlock.
    pub fn render_f32(&self, out: &mut [f32]) {
        self.lock().update_f32(out);
    }

    pub fn render_i16(&self, out: &mut [i16]) {
        self.lock().update_i16(out);
    }
}

impl Deref for SynthGuard<'_> {
    type Target = Synth;

    fn deref(&self) -> &Synth {
        &self.0
    }
}

impl DerefMut for SynthGuard<'_> {
    fn deref_mut(&mut self) -> &mut Synth {
        &mut self.0
    }
}
