//! Fixed-capacity pools for voices, procs and playbacks.
//!
//! A pool never grows past its capacity. Inserting into a full pool evicts the
//! first defunct entry, or failing that the oldest live one.

use std::slice;

pub trait PoolEntry {
    /// Finished and safe to overwrite.
    fn is_defunct(&self) -> bool;

    /// Strictly older than `other`. Equal ages return false, so ties keep the
    /// earlier slot.
    fn is_older_than(&self, other: &Self) -> bool;
}

#[derive(Debug)]
pub struct Pool<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T: PoolEntry> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add `entry`, evicting if full. Returns its slot.
    pub fn insert(&mut self, entry: T) -> usize {
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
            return self.entries.len() - 1;
        }
        let Some(index) = self.victim() else {
            // Zero capacity.
            return 0;
        };
        tracing::trace!(index, defunct = self.entries[index].is_defunct(), "pool eviction");
        self.entries[index] = entry;
        index
    }

    fn victim(&self) -> Option<usize> {
        let mut oldest = 0;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.is_defunct() {
                return Some(i);
            }
            if entry.is_older_than(&self.entries[oldest]) {
                oldest = i;
            }
        }
        (!self.entries.is_empty()).then_some(oldest)
    }

    /// Drop defunct entries from the end. Defunct entries mid-pool stay until
    /// an insert reuses them.
    pub fn reap(&mut self) {
        while self.entries.last().is_some_and(PoolEntry::is_defunct) {
            self.entries.pop();
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.entries.retain(keep);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    /// Slots in use, defunct ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn live(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_defunct()).count()
    }
}
