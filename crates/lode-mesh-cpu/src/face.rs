use lode_blocks::BlockSprites;
use lode_geom::Vec3;

/// Cube faces in sprite order: right, left, top, bottom, front, back.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    /// Falls back to `PosX` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        Face::ALL.get(i).copied().unwrap_or(Face::PosX)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        self.delta().into()
    }

    /// Corner positions of the face of voxel `(x, y, z)`, wound counter-clockwise
    /// when seen from outside.
    #[inline]
    pub fn corners(self, x: i32, y: i32, z: i32) -> [(i32, i32, i32); 4] {
        match self {
            Face::PosX => [
                (x + 1, y, z),
                (x + 1, y + 1, z),
                (x + 1, y + 1, z + 1),
                (x + 1, y, z + 1),
            ],
            Face::NegX => [(x, y, z + 1), (x, y + 1, z + 1), (x, y + 1, z), (x, y, z)],
            Face::PosY => [
                (x, y + 1, z),
                (x, y + 1, z + 1),
                (x + 1, y + 1, z + 1),
                (x + 1, y + 1, z),
            ],
            Face::NegY => [(x + 1, y, z), (x + 1, y, z + 1), (x, y, z + 1), (x, y, z)],
            Face::PosZ => [
                (x + 1, y, z + 1),
                (x + 1, y + 1, z + 1),
                (x, y + 1, z + 1),
                (x, y, z + 1),
            ],
            Face::NegZ => [(x, y, z), (x, y + 1, z), (x + 1, y + 1, z), (x + 1, y, z)],
        }
    }

    #[inline]
    pub fn sprite(self, sprites: &BlockSprites) -> u16 {
        match self {
            Face::PosX => sprites.right,
            Face::NegX => sprites.left,
            Face::PosY => sprites.top,
            Face::NegY => sprites.bottom,
            Face::PosZ => sprites.front,
            Face::NegZ => sprites.back,
        }
    }
}
