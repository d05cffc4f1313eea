use lode_chunk::Chunk;

/// Index of a chunk record in a [`ChunkArena`].
///
/// The generation makes a handle to a removed record unusable even after
/// its slot is recycled.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChunkHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Entry {
    generation: u32,
    chunk: Option<Chunk>,
}

/// Slab of chunk records addressed by [`ChunkHandle`].
#[derive(Debug, Default)]
pub struct ChunkArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    len: usize,
}

impl ChunkArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chunk: Chunk) -> ChunkHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.generation = entry.generation.wrapping_add(1);
            entry.chunk = Some(chunk);
            return ChunkHandle {
                index,
                generation: entry.generation,
            };
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            chunk: Some(chunk),
        });
        ChunkHandle {
            index,
            generation: 0,
        }
    }

    #[inline]
    pub fn get(&self, h: ChunkHandle) -> Option<&Chunk> {
        self.entries
            .get(h.index as usize)
            .filter(|e| e.generation == h.generation)
            .and_then(|e| e.chunk.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, h: ChunkHandle) -> Option<&mut Chunk> {
        self.entries
            .get_mut(h.index as usize)
            .filter(|e| e.generation == h.generation)
            .and_then(|e| e.chunk.as_mut())
    }

    pub fn remove(&mut self, h: ChunkHandle) -> Option<Chunk> {
        let entry = self
            .entries
            .get_mut(h.index as usize)
            .filter(|e| e.generation == h.generation)?;
        let chunk = entry.chunk.take()?;
        self.free.push(h.index);
        self.len -= 1;
        Some(chunk)
    }

    #[inline]
    pub fn contains(&self, h: ChunkHandle) -> bool {
        self.get(h).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkHandle, &Chunk)> {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            e.chunk.as_ref().map(|c| {
                (
                    ChunkHandle {
                        index: i as u32,
                        generation: e.generation,
                    },
                    c,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lode_chunk::ChunkCoord;

    #[test]
    fn stale_handles_do_not_alias_recycled_slots() {
        let mut arena = ChunkArena::new();
        let a = arena.insert(Chunk::spawn(ChunkCoord::new(0, 0, 0), true));
        assert!(arena.remove(a).is_some());
        let b = arena.insert(Chunk::spawn(ChunkCoord::new(1, 0, 0), true));
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.get(b).map(|c| c.coord), Some(ChunkCoord::new(1, 0, 0)));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.iter().count(), 1);
    }
}
