use lode_blocks::Voxel;
use lode_chunk::{
    CHUNK_SIZE_I32, Chunk, ChunkCoord, ChunkStatus, ColumnCoord, boundary_offsets, coord3, index3,
};
use lode_lighting::{LightVolume, VoxelPos};

use crate::arena::{ChunkArena, ChunkHandle};
use crate::mutation::MutationQueue;

/// Unloaded ring kept around the loaded area for neighbor lookups.
pub const BUFFER_MARGIN: i32 = 1;

/// What happened to a chunk passed to [`ChunkStore::destroy`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Destroyed {
    Removed(ChunkCoord),
    /// A job holds the buffer; try again later.
    InFlight,
    /// The handle no longer refers to a chunk.
    Stale,
}

/// Chunks around a center column, indexed by a dense `size × height × size` array.
///
/// Array coordinates are `(cx - center.cx + distance + margin, cy, cz - center.cz + distance + margin)`.
#[derive(Debug)]
pub struct ChunkStore {
    center: ColumnCoord,
    distance: i32,
    height: i32,
    size: i32,
    slots: Vec<Option<ChunkHandle>>,
    scratch: Vec<Option<ChunkHandle>>,
    arena: ChunkArena,
}

#[inline]
pub fn size_for(distance: i32) -> i32 {
    distance * 2 + 1 + BUFFER_MARGIN * 2
}

impl ChunkStore {
    pub fn new(center: ColumnCoord, distance: i32, height: i32) -> Self {
        let distance = distance.max(0);
        let height = height.max(1);
        let size = size_for(distance);
        let len = (size * size * height) as usize;
        ChunkStore {
            center,
            distance,
            height,
            size,
            slots: vec![None; len],
            scratch: vec![None; len],
            arena: ChunkArena::new(),
        }
    }

    #[inline]
    pub fn center(&self) -> ColumnCoord {
        self.center
    }

    #[inline]
    pub fn distance(&self) -> i32 {
        self.distance
    }

    /// World height in chunks.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Columns per side, margin included.
    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    #[inline]
    pub fn arena(&self) -> &ChunkArena {
        &self.arena
    }

    #[inline]
    fn offset(&self) -> i32 {
        self.distance + BUFFER_MARGIN
    }

    #[inline]
    fn array_coord(&self, coord: ChunkCoord) -> (i32, i32, i32) {
        (
            coord.cx - self.center.cx + self.offset(),
            coord.cy,
            coord.cz - self.center.cz + self.offset(),
        )
    }

    #[inline]
    fn in_range(&self, x: i32, y: i32, z: i32) -> bool {
        (0..self.size).contains(&x) && (0..self.height).contains(&y) && (0..self.size).contains(&z)
    }

    #[inline]
    fn flat(&self, x: i32, y: i32, z: i32) -> usize {
        index3(
            x as usize,
            y as usize,
            z as usize,
            self.size as usize,
            self.height as usize,
        )
    }

    /// True when `coord` has no slot under the current center and distance.
    #[inline]
    pub fn is_out_of_buffer(&self, coord: ChunkCoord) -> bool {
        let (x, y, z) = self.array_coord(coord);
        !self.in_range(x, y, z)
    }

    /// Columns outside the buffer have no slot at any height.
    #[inline]
    pub fn column_in_buffer(&self, column: ColumnCoord) -> bool {
        !self.is_out_of_buffer(column.chunk(0))
    }

    /// Slot index of `coord`; the coordinate must be inside the buffer.
    #[inline]
    pub fn to_index(&self, coord: ChunkCoord) -> usize {
        debug_assert!(!self.is_out_of_buffer(coord), "{coord:?} outside buffer");
        let (x, y, z) = self.array_coord(coord);
        self.flat(x, y, z)
    }

    /// Inverse of [`ChunkStore::to_index`].
    pub fn index_to_coord(&self, index: usize) -> ChunkCoord {
        let (x, y, z) = coord3(index, self.size as usize, self.height as usize);
        ChunkCoord::new(
            x as i32 + self.center.cx - self.offset(),
            y as i32,
            z as i32 + self.center.cz - self.offset(),
        )
    }

    pub fn get_handle(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        if self.is_out_of_buffer(coord) {
            return None;
        }
        self.slots[self.to_index(coord)]
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.arena.get(self.get_handle(coord)?)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        let h = self.get_handle(coord)?;
        self.arena.get_mut(h)
    }

    #[inline]
    pub fn chunk(&self, h: ChunkHandle) -> Option<&Chunk> {
        self.arena.get(h)
    }

    #[inline]
    pub fn chunk_mut(&mut self, h: ChunkHandle) -> Option<&mut Chunk> {
        self.arena.get_mut(h)
    }

    /// Occupied slots with their chunks.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkHandle, &Chunk)> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|&h| self.arena.get(h).map(|c| (h, c)))
    }

    pub fn handles(&self) -> Vec<ChunkHandle> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Chunk records still alive, including ones dropped from the index but awaiting destruction.
    #[inline]
    pub fn live_chunks(&self) -> usize {
        self.arena.len()
    }

    /// Allocates a chunk at `coord`.
    ///
    /// Spawning into an occupied slot is a caller bug: it asserts in debug builds
    /// and is ignored in release builds. Coordinates outside the buffer are ignored.
    pub fn spawn(&mut self, coord: ChunkCoord, visible: bool) -> Option<ChunkHandle> {
        if self.is_out_of_buffer(coord) {
            log::error!(target: "loading", "spawn outside buffer at {coord:?}");
            return None;
        }
        let i = self.to_index(coord);
        if self.slots[i].is_some() {
            debug_assert!(false, "double spawn at {coord:?}");
            log::error!(target: "loading", "double spawn at {coord:?} ignored");
            return None;
        }
        let h = self.arena.insert(Chunk::spawn(coord, visible));
        self.slots[i] = Some(h);
        Some(h)
    }

    /// Removes a chunk record unless a job still holds its buffer.
    pub fn destroy(&mut self, h: ChunkHandle) -> Destroyed {
        let Some(chunk) = self.arena.get(h) else {
            return Destroyed::Stale;
        };
        if chunk.status.is_in_flight() {
            return Destroyed::InFlight;
        }
        let coord = chunk.coord;
        if self.get_handle(coord) == Some(h) {
            let i = self.to_index(coord);
            self.slots[i] = None;
        }
        self.arena.remove(h);
        Destroyed::Removed(coord)
    }

    /// Resizes the index for a new distance around the same center.
    ///
    /// Handles that no longer fit are unindexed and returned; their chunks stay
    /// alive until the caller destroys them.
    pub fn update_distance(&mut self, distance: i32) -> Vec<ChunkHandle> {
        let distance = distance.max(0);
        let new_size = size_for(distance);
        let shift = (self.size - new_size) / 2;
        let len = (new_size * new_size * self.height) as usize;
        let mut slots = vec![None; len];
        let mut dropped = Vec::new();
        for (i, h) in self.slots.iter().enumerate() {
            let Some(h) = *h else {
                continue;
            };
            let (x, y, z) = coord3(i, self.size as usize, self.height as usize);
            let nx = x as i32 - shift;
            let nz = z as i32 - shift;
            if (0..new_size).contains(&nx) && (0..new_size).contains(&nz) {
                slots[index3(
                    nx as usize,
                    y,
                    nz as usize,
                    new_size as usize,
                    self.height as usize,
                )] = Some(h);
            } else {
                dropped.push(h);
            }
        }
        log::debug!(
            target: "loading",
            "distance {} -> {}: size {} -> {}, {} dropped",
            self.distance,
            distance,
            self.size,
            new_size,
            dropped.len()
        );
        self.slots = slots;
        self.scratch = vec![None; len];
        self.distance = distance;
        self.size = new_size;
        dropped
    }

    /// Moves the index to a new center.
    ///
    /// Every occupied slot is shifted by the center delta; chunks that fall
    /// outside the buffer are queued for destruction.
    pub fn update_center(&mut self, center: ColumnCoord, queue: &mut MutationQueue) {
        let dx = center.cx - self.center.cx;
        let dz = center.cz - self.center.cz;
        self.scratch.fill(None);
        let mut evicted = 0usize;
        for i in 0..self.slots.len() {
            let Some(h) = self.slots[i] else {
                continue;
            };
            let (x, y, z) = coord3(i, self.size as usize, self.height as usize);
            let nx = x as i32 - dx;
            let nz = z as i32 - dz;
            if (0..self.size).contains(&nx) && (0..self.size).contains(&nz) {
                let j = self.flat(nx, y as i32, nz);
                self.scratch[j] = Some(h);
            } else {
                queue.destroy(h);
                evicted += 1;
            }
        }
        std::mem::swap(&mut self.slots, &mut self.scratch);
        log::debug!(
            target: "loading",
            "center ({}, {}) -> ({}, {}), {} evicted",
            self.center.cx,
            self.center.cz,
            center.cx,
            center.cz,
            evicted
        );
        self.center = center;
    }

    pub fn mark_chunk_dirty(&mut self, coord: ChunkCoord, immediate: bool) {
        if let Some(c) = self.get_mut(coord) {
            c.mark_dirty(immediate);
        }
    }

    /// Marks the chunks across any face that local voxel `(x, y, z)` of `coord` touches.
    pub fn mark_dirty_if_neighbor_boundary(
        &mut self,
        coord: ChunkCoord,
        local: (usize, usize, usize),
        immediate: bool,
    ) {
        for (dx, dy, dz) in boundary_offsets(local.0, local.1, local.2) {
            self.mark_chunk_dirty(coord.offset(dx, dy, dz), immediate);
        }
    }

    /// Voxel at a world position, or the default voxel when its chunk is
    /// absent, not generated, or held by a job.
    pub fn get_voxel(&self, pos: VoxelPos) -> Voxel {
        self.voxel(pos).unwrap_or_default()
    }

    /// True when the chunk exists, is generated, and is not held by a job.
    pub fn is_available(&self, coord: ChunkCoord) -> bool {
        self.get(coord).is_some_and(|c| c.voxels().is_some())
    }

    /// Whether every chunk in the 3×3×3 block around `coord` has final sunlight.
    /// Layers above and below the world count as lit.
    pub fn neighborhood_lit(&self, coord: ChunkCoord) -> bool {
        neighborhood(coord).all(|n| {
            if n.cy < 0 || n.cy >= self.height {
                return true;
            }
            self.get(n).is_some_and(|c| {
                c.status.contains(ChunkStatus::ILLUMINATED)
                    || (c.status.is_generated() && !c.status.contains(ChunkStatus::NOT_ILLUMINATED))
            })
        })
    }
}

/// `coord` and its 26 neighbors.
pub fn neighborhood(coord: ChunkCoord) -> impl Iterator<Item = ChunkCoord> {
    (-1..=1).flat_map(move |dz| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| coord.offset(dx, dy, dz)))
    })
}

impl LightVolume for ChunkStore {
    fn voxel(&self, pos: VoxelPos) -> Option<Voxel> {
        let (x, y, z) = pos;
        self.get(ChunkCoord::of_voxel(x, y, z))?
            .voxels()?
            .get_world(x, y, z)
    }

    fn voxel_mut(&mut self, pos: VoxelPos) -> Option<&mut Voxel> {
        let (x, y, z) = pos;
        self.get_mut(ChunkCoord::of_voxel(x, y, z))?
            .voxels_mut()?
            .world_mut(x, y, z)
    }

    fn mark_dirty(&mut self, pos: VoxelPos, immediate: bool) {
        let (x, y, z) = pos;
        let coord = ChunkCoord::of_voxel(x, y, z);
        self.mark_chunk_dirty(coord, immediate);
        let (lx, ly, lz) = coord.local_of(x, y, z);
        debug_assert!((0..CHUNK_SIZE_I32).contains(&lx));
        self.mark_dirty_if_neighbor_boundary(
            coord,
            (lx as usize, ly as usize, lz as usize),
            immediate,
        );
    }
}
