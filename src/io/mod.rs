//! External interfaces: where compiled songs and sounds come from, and raw
//! MIDI from a live bus.

pub mod midi;

use std::collections::BTreeMap;

use crate::error::CompileError;
use crate::sfg::{compile_block, split, SoundId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Song,
    Sound,
}

/// Read-only lookup of serialized resources. A miss plays silence.
pub trait ResourceProvider {
    fn lookup(&self, kind: ResourceKind, qual: u16, id: u16) -> Option<&[u8]>;
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for Box<P> {
    fn lookup(&self, kind: ResourceKind, qual: u16, id: u16) -> Option<&[u8]> {
        (**self).lookup(kind, qual, id)
    }
}

/// In-memory resource map.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    entries: BTreeMap<(ResourceKind, u16, u16), Vec<u8>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one resource. Returns the previous bytes, if any.
    pub fn insert(&mut self, kind: ResourceKind, qual: u16, id: u16, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert((kind, qual, id), bytes)
    }

    pub fn remove(&mut self, kind: ResourceKind, qual: u16, id: u16) -> Option<Vec<u8>> {
        self.entries.remove(&(kind, qual, id))
    }

    /// Compile every block of an SFG text file into sounds under `qual`.
    ///
    /// Numbered blocks keep their number. An unfenced file takes `default_id`.
    /// Named blocks have no numeric id and are skipped. Returns how many
    /// sounds were stored.
    pub fn insert_sfg_source(&mut self, qual: u16, src: &str, default_id: Option<u16>) -> Result<usize, CompileError> {
        let mut count = 0;
        split(src, |block| {
            let id = match (&block.id, default_id) {
                (SoundId::Number(n), _) => *n,
                (SoundId::Anonymous, Some(n)) => n,
                (id, _) => {
                    tracing::debug!(%id, "skipping sound without a numeric id");
                    return Ok(());
                }
            };
            let bytes = compile_block(block.text, block.lineno0)?;
            self.insert(ResourceKind::Sound, qual, id, bytes);
            count += 1;
            Ok::<(), CompileError>(())
        })?;
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = (ResourceKind, u16, u16)> + '_ {
        self.entries.keys().copied()
    }
}

impl ResourceProvider for ResourceStore {
    fn lookup(&self, kind: ResourceKind, qual: u16, id: u16) -> Option<&[u8]> {
        self.entries.get(&(kind, qual, id)).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut store = ResourceStore::new();
        assert!(store.insert(ResourceKind::Song, 0, 1, vec![1, 2]).is_none());
        assert_eq!(store.insert(ResourceKind::Song, 0, 1, vec![3]), Some(vec![1, 2]));
        assert_eq!(store.lookup(ResourceKind::Song, 0, 1), Some(&[3u8][..]));
        assert_eq!(store.lookup(ResourceKind::Sound, 0, 1), None);
        assert_eq!(store.lookup(ResourceKind::Song, 1, 1), None);
    }

    #[test]
    fn sfg_source_fills_numbered_sounds() {
        let src = "sound 3\nlevel 0 10 1\nend\nsound named\nlevel 0 10 1\nend\nsound 0x81\nshape noise\nlevel 1 20 0\nend\n";
        let mut store = ResourceStore::new();
        assert_eq!(store.insert_sfg_source(2, src, None).unwrap(), 2);
        assert!(store.lookup(ResourceKind::Sound, 2, 3).is_some());
        assert!(store.lookup(ResourceKind::Sound, 2, 0x81).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unfenced_source_needs_a_default_id() {
        let mut store = ResourceStore::new();
        assert_eq!(store.insert_sfg_source(0, "level 0 10 1\n", None).unwrap(), 0);
        assert_eq!(store.insert_sfg_source(0, "level 0 10 1\n", Some(9)).unwrap(), 1);
        assert!(store.lookup(ResourceKind::Sound, 0, 9).is_some());
    }

    #[test]
    fn compile_errors_carry_file_lines() {
        let src = "sound 1\nlevel 0 10 1\nend\nsound 2\nshape sine\nbogus 1\nend\n";
        let err = ResourceStore::new().insert_sfg_source(0, src, None).unwrap_err();
        assert_eq!(err.line, 6);
    }
}
