use serde::{Deserialize, Serialize};

use crate::CHUNK_SIZE_I32;

/// Chunk position in chunk units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Chunk that owns world voxel `(wx, wy, wz)`.
    #[inline]
    pub fn of_voxel(wx: i32, wy: i32, wz: i32) -> Self {
        Self {
            cx: wx.div_euclid(CHUNK_SIZE_I32),
            cy: wy.div_euclid(CHUNK_SIZE_I32),
            cz: wz.div_euclid(CHUNK_SIZE_I32),
        }
    }

    /// World voxel coordinate of local `(0, 0, 0)`.
    #[inline]
    pub fn origin(self) -> (i32, i32, i32) {
        (
            self.cx * CHUNK_SIZE_I32,
            self.cy * CHUNK_SIZE_I32,
            self.cz * CHUNK_SIZE_I32,
        )
    }

    /// Local coordinate of a world voxel relative to this chunk's origin, unchecked.
    #[inline]
    pub fn local_of(self, wx: i32, wy: i32, wz: i32) -> (i32, i32, i32) {
        let (ox, oy, oz) = self.origin();
        (wx - ox, wy - oy, wz - oz)
    }

    #[inline]
    pub fn with_y(self, cy: i32) -> Self {
        Self { cy, ..self }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn column(self) -> ColumnCoord {
        ColumnCoord::new(self.cx, self.cz)
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

/// Horizontal position of a vertical stack of chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ColumnCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Column containing the world-space voxel column `(wx, wz)`.
    #[inline]
    pub fn of_voxel(wx: i32, wz: i32) -> Self {
        Self::new(wx.div_euclid(CHUNK_SIZE_I32), wz.div_euclid(CHUNK_SIZE_I32))
    }

    #[inline]
    pub fn chunk(self, cy: i32) -> ChunkCoord {
        ChunkCoord::new(self.cx, cy, self.cz)
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.cx + dx, self.cz + dz)
    }
}

impl From<(i32, i32)> for ColumnCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}
