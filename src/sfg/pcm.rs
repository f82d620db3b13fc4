use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, fixed-length mono sample buffer.
///
/// Cloning is cheap and aliases the same samples. The printer writes through
/// [`Pcm::write`] while playbacks read the already-printed prefix through
/// [`Pcm::read`].
#[derive(Debug, Clone)]
pub struct Pcm {
    samples: Arc<RwLock<Box<[f32]>>>,
    len: usize,
}

impl Pcm {
    pub fn zeroed(len: usize) -> Self {
        Self {
            samples: Arc::new(RwLock::new(vec![0.0; len].into_boxed_slice())),
            len,
        }
    }

    pub fn from_samples(samples: Vec<f32>) -> Self {
        let len = samples.len();
        Self {
            samples: Arc::new(RwLock::new(samples.into_boxed_slice())),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Box<[f32]>> {
        self.samples.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Box<[f32]>> {
        self.samples.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.read().to_vec()
    }

    /// Same underlying buffer.
    pub fn ptr_eq(&self, other: &Pcm) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }

    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.samples)
    }
}
