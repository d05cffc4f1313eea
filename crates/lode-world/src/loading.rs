use std::collections::VecDeque;

use lode_chunk::{ChunkCoord, ChunkStatus, ColumnCoord};

use crate::store::{BUFFER_MARGIN, ChunkStore};

/// A column in load order and whether it lies inside the rendered area.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ColumnVisit {
    pub column: ColumnCoord,
    pub rendered: bool,
}

/// Inward spiral over the columns of a store's buffer.
///
/// Starts at the `(min x, max z)` corner, walks +x, then -z, then -x, then +z,
/// shrinking the walked rectangle after each leg, and ends on the center.
#[derive(Clone, Debug)]
pub struct Spiral {
    x: i32,
    z: i32,
    dir: u8,
    remaining: usize,
    outer: (i32, i32, i32, i32),
    bounds: (i32, i32, i32, i32),
}

impl Spiral {
    pub fn new(center: ColumnCoord, distance: i32) -> Self {
        let r = distance + BUFFER_MARGIN;
        let side = (2 * r + 1) as usize;
        let outer = (center.cx - r, center.cx + r, center.cz - r, center.cz + r);
        Spiral {
            x: outer.0,
            z: outer.3,
            dir: 0,
            remaining: side * side,
            outer,
            bounds: outer,
        }
    }
}

impl Iterator for Spiral {
    type Item = ColumnVisit;

    fn next(&mut self) -> Option<ColumnVisit> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let (sx, ex, sz, ez) = self.outer;
        let visit = ColumnVisit {
            column: ColumnCoord::new(self.x, self.z),
            rendered: self.x != sx && self.x != ex && self.z != sz && self.z != ez,
        };

        match self.dir {
            0 => self.x += 1,
            1 => self.z -= 1,
            2 => self.x -= 1,
            _ => self.z += 1,
        }
        let (start_x, end_x, start_z, end_z) = &mut self.bounds;
        match self.dir {
            0 if self.x == *end_x => self.dir = 1,
            1 if self.z == *start_z => {
                self.dir = 2;
                *start_z += 1;
            }
            2 if self.x == *start_x => {
                self.dir = 3;
                *end_z -= 1;
                *start_x += 1;
            }
            3 if self.z == *end_z => {
                self.dir = 0;
                *end_x -= 1;
            }
            _ => {}
        }
        Some(visit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Spiral {}

/// Chunks whose visibility flipped while refreshing load order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VisibilityChanges {
    pub shown: Vec<ChunkCoord>,
    pub hidden: Vec<ChunkCoord>,
}

impl VisibilityChanges {
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.hidden.is_empty()
    }
}

/// Columns waiting to have their chunks spawned, in spiral order.
#[derive(Clone, Debug)]
pub struct LoadingQueue {
    pending: VecDeque<ColumnVisit>,
    batch: usize,
}

impl LoadingQueue {
    pub fn new(batch: usize) -> Self {
        LoadingQueue {
            pending: VecDeque::new(),
            batch: batch.max(1),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Walks the spiral around the store's center: chunks already present are
    /// shown or hidden right away, and columns missing any chunk are queued.
    pub fn rebuild(&mut self, store: &mut ChunkStore) -> VisibilityChanges {
        self.pending.clear();
        let mut changes = VisibilityChanges::default();
        for visit in Spiral::new(store.center(), store.distance()) {
            let mut missing = false;
            for cy in 0..store.height() {
                let coord = visit.column.chunk(cy);
                let Some(chunk) = store.get_mut(coord) else {
                    missing = true;
                    continue;
                };
                let was = chunk.status.contains(ChunkStatus::VISIBLE);
                if was != visit.rendered {
                    chunk.status.set(ChunkStatus::VISIBLE, visit.rendered);
                    if visit.rendered {
                        changes.shown.push(coord);
                    } else {
                        changes.hidden.push(coord);
                    }
                }
            }
            if missing {
                self.pending.push_back(visit);
            }
        }
        log::debug!(
            target: "loading",
            "load order rebuilt: {} columns queued, {} shown, {} hidden",
            self.pending.len(),
            changes.shown.len(),
            changes.hidden.len()
        );
        changes
    }

    /// Spawns the missing chunks of up to `batch` queued columns.
    ///
    /// Returns the columns that spawned at least one chunk.
    pub fn drain(&mut self, store: &mut ChunkStore) -> Vec<ColumnCoord> {
        let mut spawned = Vec::new();
        let mut taken = 0;
        while taken < self.batch {
            let Some(visit) = self.pending.pop_front() else {
                break;
            };
            taken += 1;
            if !store.column_in_buffer(visit.column) {
                continue;
            }
            let mut any = false;
            for cy in 0..store.height() {
                let coord = visit.column.chunk(cy);
                if store.get_handle(coord).is_none() {
                    any |= store.spawn(coord, visit.rendered).is_some();
                }
            }
            if any {
                spawned.push(visit.column);
            }
        }
        spawned
    }
}
