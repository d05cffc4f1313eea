use lode_chunk::ChunkCoord;

use crate::vertex::PackedVertex;

/// Geometry for one chunk: a shared vertex list with separate opaque and
/// transparent index lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub vertices: Vec<PackedVertex>,
    pub opaque: Vec<u32>,
    pub transparent: Vec<u32>,
}

impl ChunkMesh {
    pub fn new(coord: ChunkCoord) -> Self {
        ChunkMesh {
            coord,
            ..Default::default()
        }
    }

    /// Pre-reserve capacity for approximately `n_quads` quads.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.vertices.reserve(n_quads * 4);
        self.opaque.reserve(n_quads * 6);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Appends four corners and two triangles. When `flip` is set the quad is
    /// split along the 1-3 diagonal instead of 0-2.
    pub fn push_quad(&mut self, corners: [PackedVertex; 4], flip: bool, transparent: bool) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        let order: [u32; 6] = if flip {
            [1, 2, 3, 1, 3, 0]
        } else {
            [0, 1, 2, 0, 2, 3]
        };
        let list = if transparent {
            &mut self.transparent
        } else {
            &mut self.opaque
        };
        list.extend(order.iter().map(|i| base + i));
    }
}
