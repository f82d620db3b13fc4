//! Printed sound effects, keyed by (qualifier, id).

use crate::sfg::Pcm;

#[derive(Debug, Clone)]
struct Entry {
    qual: u16,
    id: u16,
    pcm: Pcm,
}

/// Sorted list of PCM handles. Holds at most one buffer per key.
#[derive(Debug, Default)]
pub struct PcmCache {
    entries: Vec<Entry>,
}

impl PcmCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(index)` of an existing entry, or `Err(index)` where it would go.
    pub fn search(&self, qual: u16, id: u16) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|e| (e.qual, e.id).cmp(&(qual, id)))
    }

    pub fn get(&self, index: usize) -> Option<&Pcm> {
        self.entries.get(index).map(|e| &e.pcm)
    }

    pub fn find(&self, qual: u16, id: u16) -> Option<&Pcm> {
        self.search(qual, id).ok().and_then(|i| self.get(i))
    }

    /// Insert at `index`, which must come from a failed [`PcmCache::search`]
    /// for the same key. Returns false and does nothing if it would break the
    /// ordering or duplicate a key.
    pub fn insert(&mut self, index: usize, qual: u16, id: u16, pcm: Pcm) -> bool {
        if index > self.entries.len() {
            return false;
        }
        let key = (qual, id);
        if index > 0 {
            let prev = &self.entries[index - 1];
            if (prev.qual, prev.id) >= key {
                return false;
            }
        }
        if let Some(next) = self.entries.get(index) {
            if (next.qual, next.id) <= key {
                return false;
            }
        }
        self.entries.insert(index, Entry { qual, id, pcm });
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
