use std::collections::VecDeque;

use lode_chunk::{ChunkCoord, ColumnCoord};

use crate::arena::ChunkHandle;
use crate::store::{ChunkStore, Destroyed};

/// A structural change to the store, applied once per tick after every
/// system has read the tick's state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mutation {
    Destroy(ChunkHandle),
    SetDistance(i32),
    SetCenter(ColumnCoord),
}

/// Outcome of one [`MutationQueue::apply`] pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Applied {
    /// Coordinates of the chunks removed from the arena.
    pub destroyed: Vec<ChunkCoord>,
    pub deferred: usize,
    pub recentered: bool,
    pub resized: bool,
}

impl Applied {
    /// The index moved or changed size, so load order must be recomputed.
    #[inline]
    pub fn reshaped(&self) -> bool {
        self.recentered || self.resized
    }
}

#[derive(Debug, Default)]
pub struct MutationQueue {
    pending: VecDeque<Mutation>,
    deferred: Vec<ChunkHandle>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, m: Mutation) {
        self.pending.push_back(m);
    }

    #[inline]
    pub fn destroy(&mut self, h: ChunkHandle) {
        self.push(Mutation::Destroy(h));
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.deferred.is_empty()
    }

    /// Chunks waiting for a job to hand back their buffer before removal.
    #[inline]
    pub fn deferred(&self) -> &[ChunkHandle] {
        &self.deferred
    }

    /// Applies queued mutations in order.
    ///
    /// Destroys deferred by an earlier pass are retried first. Chunks still
    /// held by a job are deferred again.
    pub fn apply(&mut self, store: &mut ChunkStore) -> Applied {
        let mut applied = Applied::default();
        for h in std::mem::take(&mut self.deferred) {
            self.destroy_now(store, h, &mut applied);
        }
        while let Some(m) = self.pending.pop_front() {
            match m {
                Mutation::Destroy(h) => self.destroy_now(store, h, &mut applied),
                Mutation::SetDistance(d) => {
                    for h in store.update_distance(d) {
                        self.pending.push_back(Mutation::Destroy(h));
                    }
                    applied.resized = true;
                }
                Mutation::SetCenter(c) => {
                    store.update_center(c, self);
                    applied.recentered = true;
                }
            }
        }
        applied
    }

    fn destroy_now(&mut self, store: &mut ChunkStore, h: ChunkHandle, applied: &mut Applied) {
        match store.destroy(h) {
            Destroyed::Removed(coord) => applied.destroyed.push(coord),
            Destroyed::InFlight => {
                self.deferred.push(h);
                applied.deferred += 1;
            }
            Destroyed::Stale => {}
        }
    }
}
