use lode_blocks::Voxel;
use lode_chunk::{CHUNK_SIZE_I32, ChunkCoord, VoxelBuf, index3};

/// Owned copies of a chunk's voxels and its 26 neighbors.
///
/// Slots are `index3(dx + 1, dy + 1, dz + 1, 3, 3)`. An empty slot is a
/// layer above or below the world.
#[derive(Clone, Debug)]
pub struct Neighborhood {
    center: ChunkCoord,
    chunks: [Option<VoxelBuf>; 27],
}

impl Neighborhood {
    pub fn new(center: ChunkCoord) -> Self {
        Neighborhood {
            center,
            chunks: std::array::from_fn(|_| None),
        }
    }

    /// Copies the neighborhood of `center` out of `lookup`.
    ///
    /// Returns `None` if any neighbor inside the world (`0 <= cy < height`) is
    /// unavailable; the chunk cannot be meshed yet.
    pub fn snapshot<'a, F>(center: ChunkCoord, height: i32, mut lookup: F) -> Option<Self>
    where
        F: FnMut(ChunkCoord) -> Option<&'a VoxelBuf>,
    {
        let mut nb = Neighborhood::new(center);
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let coord = center.offset(dx, dy, dz);
                    match lookup(coord) {
                        Some(buf) => nb.chunks[slot(dx, dy, dz)] = Some(buf.clone()),
                        None if coord.cy < 0 || coord.cy >= height => {}
                        None => return None,
                    }
                }
            }
        }
        Some(nb)
    }

    #[inline]
    pub fn center(&self) -> ChunkCoord {
        self.center
    }

    /// Places `buf` by its coordinate; false if it is not part of this neighborhood.
    pub fn insert(&mut self, buf: VoxelBuf) -> bool {
        let (dx, dy, dz) = (
            buf.coord.cx - self.center.cx,
            buf.coord.cy - self.center.cy,
            buf.coord.cz - self.center.cz,
        );
        if dx.abs() > 1 || dy.abs() > 1 || dz.abs() > 1 {
            return false;
        }
        self.chunks[slot(dx, dy, dz)] = Some(buf);
        true
    }

    /// Voxel at a position local to the center chunk, reaching up to one chunk
    /// beyond it on every side. `None` outside the world.
    #[inline]
    pub fn voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        let (dx, lx) = split(x);
        let (dy, ly) = split(y);
        let (dz, lz) = split(z);
        if dx.abs() > 1 || dy.abs() > 1 || dz.abs() > 1 {
            return None;
        }
        self.chunks[slot(dx, dy, dz)]
            .as_ref()
            .map(|buf| buf.get_local(lx, ly, lz))
    }

    /// The center chunk, if present.
    #[inline]
    pub fn center_buf(&self) -> Option<&VoxelBuf> {
        self.chunks[slot(0, 0, 0)].as_ref()
    }
}

#[inline]
fn slot(dx: i32, dy: i32, dz: i32) -> usize {
    index3((dx + 1) as usize, (dy + 1) as usize, (dz + 1) as usize, 3, 3)
}

#[inline]
fn split(v: i32) -> (i32, usize) {
    (
        v.div_euclid(CHUNK_SIZE_I32),
        v.rem_euclid(CHUNK_SIZE_I32) as usize,
    )
}
