//! Chunk voxel storage, status flags, and grid index helpers.
#![forbid(unsafe_code)]

mod coord;
mod status;

pub use coord::{ChunkCoord, ColumnCoord};
pub use status::ChunkStatus;

use lode_blocks::Voxel;

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Flat offset of `(x, y, z)` in a grid `sx` wide and `sy` tall: `z*sx*sy + y*sx + x`.
#[inline]
pub fn index3(x: usize, y: usize, z: usize, sx: usize, sy: usize) -> usize {
    (z * sy + y) * sx + x
}

/// Inverse of [`index3`].
#[inline]
pub fn coord3(index: usize, sx: usize, sy: usize) -> (usize, usize, usize) {
    let x = index % sx;
    let y = (index / sx) % sy;
    let z = index / (sx * sy);
    (x, y, z)
}

#[inline]
pub fn index2(x: usize, z: usize, sx: usize) -> usize {
    z * sx + x
}

#[inline]
pub fn coord2(index: usize, sx: usize) -> (usize, usize) {
    (index % sx, index / sx)
}

/// Face-adjacent chunk offsets whose meshes see local cell `(x, y, z)`.
///
/// A cell on the low face of an axis yields `-1` on that axis, a cell on the
/// high face yields `+1`. Interior cells yield nothing.
pub fn boundary_offsets(x: usize, y: usize, z: usize) -> impl Iterator<Item = (i32, i32, i32)> {
    let last = CHUNK_SIZE - 1;
    [
        (x == 0, (-1, 0, 0)),
        (y == 0, (0, -1, 0)),
        (z == 0, (0, 0, -1)),
        (x == last, (1, 0, 0)),
        (y == last, (0, 1, 0)),
        (z == last, (0, 0, 1)),
    ]
    .into_iter()
    .filter_map(|(hit, d)| hit.then_some(d))
}

/// Voxels of one chunk in `z*16*16 + y*16 + x` order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelBuf {
    pub coord: ChunkCoord,
    pub voxels: Box<[Voxel]>,
}

impl VoxelBuf {
    pub fn new(coord: ChunkCoord) -> Self {
        Self::filled(coord, Voxel::AIR)
    }

    pub fn filled(coord: ChunkCoord, voxel: Voxel) -> Self {
        VoxelBuf {
            coord,
            voxels: vec![voxel; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        index3(x, y, z, CHUNK_SIZE, CHUNK_SIZE)
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, voxel: Voxel) {
        self.voxels[Self::idx(x, y, z)] = voxel;
    }

    #[inline]
    pub fn get_local_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Voxel {
        &mut self.voxels[Self::idx(x, y, z)]
    }

    /// Local cell for a world voxel, if this chunk holds it.
    #[inline]
    pub fn local_of_world(&self, wx: i32, wy: i32, wz: i32) -> Option<(usize, usize, usize)> {
        let (lx, ly, lz) = self.coord.local_of(wx, wy, wz);
        let r = 0..CHUNK_SIZE_I32;
        if r.contains(&lx) && r.contains(&ly) && r.contains(&lz) {
            Some((lx as usize, ly as usize, lz as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        self.local_of_world(wx, wy, wz).is_some()
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Voxel> {
        self.local_of_world(wx, wy, wz)
            .map(|(x, y, z)| self.get_local(x, y, z))
    }

    #[inline]
    pub fn world_mut(&mut self, wx: i32, wy: i32, wz: i32) -> Option<&mut Voxel> {
        let (x, y, z) = self.local_of_world(wx, wy, wz)?;
        Some(self.get_local_mut(x, y, z))
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.voxels.iter().any(|v| !v.is_air())
    }
}

/// A chunk record: coordinate, lifecycle flags, and the voxel buffer when not lent out.
#[derive(Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub status: ChunkStatus,
    voxels: Option<VoxelBuf>,
}

impl Chunk {
    pub fn spawn(coord: ChunkCoord, visible: bool) -> Self {
        let mut status = ChunkStatus::SPAWNED;
        status.set(ChunkStatus::VISIBLE, visible);
        Chunk {
            coord,
            status,
            voxels: Some(VoxelBuf::new(coord)),
        }
    }

    /// Voxels if generated and not owned by a background job.
    #[inline]
    pub fn voxels(&self) -> Option<&VoxelBuf> {
        if self.status.intersects(ChunkStatus::NOT_GENERATED | ChunkStatus::IN_FLIGHT) {
            return None;
        }
        self.voxels.as_ref()
    }

    #[inline]
    pub fn voxels_mut(&mut self) -> Option<&mut VoxelBuf> {
        if self.status.intersects(ChunkStatus::NOT_GENERATED | ChunkStatus::IN_FLIGHT) {
            return None;
        }
        self.voxels.as_mut()
    }

    /// Lends the buffer to a background job and marks the chunk in-flight.
    pub fn lend(&mut self) -> Option<VoxelBuf> {
        if self.status.is_in_flight() {
            return None;
        }
        let buf = self.voxels.take()?;
        self.status.insert(ChunkStatus::IN_FLIGHT);
        Some(buf)
    }

    /// Returns a lent buffer and clears the in-flight flag.
    pub fn restore(&mut self, buf: VoxelBuf) {
        debug_assert_eq!(buf.coord, self.coord);
        self.voxels = Some(buf);
        self.status.remove(ChunkStatus::IN_FLIGHT);
    }

    #[inline]
    pub fn mark_dirty(&mut self, immediate: bool) {
        self.status.insert(ChunkStatus::DIRTY);
        if immediate {
            self.status.insert(ChunkStatus::IMMEDIATE);
        }
    }
}
