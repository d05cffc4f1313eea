use std::collections::HashSet;

use lode_blocks::{BlockRegistry, Light, LightChannel, Voxel};
use lode_chunk::{
    CHUNK_SIZE_I32, ChunkCoord, ColumnCoord, VoxelBuf, boundary_offsets, index3,
};

use crate::{LightVolume, LightingQueues, VoxelPos};

/// The chunks a column illumination job owns: the column itself plus the
/// eight around it, one layer taller at top and bottom.
///
/// Slots are indexed `index3(cx - col.cx + 1, cy + 1, cz - col.cz + 1, 3, height + 2)`.
#[derive(Debug)]
pub struct ColumnCluster {
    column: ColumnCoord,
    height: i32,
    slots: Vec<Option<VoxelBuf>>,
    changed: HashSet<ChunkCoord>,
}

impl ColumnCluster {
    pub fn new(column: ColumnCoord, height: i32) -> Self {
        let rows = (height.max(0) + 2) as usize;
        ColumnCluster {
            column,
            height,
            slots: (0..3 * rows * 3).map(|_| None).collect(),
            changed: HashSet::new(),
        }
    }

    #[inline]
    pub fn column(&self) -> ColumnCoord {
        self.column
    }

    /// Every chunk coordinate the cluster spans, including the layers above and below the world.
    pub fn coords(column: ColumnCoord, height: i32) -> impl Iterator<Item = ChunkCoord> {
        (-1..=1).flat_map(move |dz| {
            (-1..=height).flat_map(move |cy| {
                (-1..=1).map(move |dx| ChunkCoord::new(column.cx + dx, cy, column.cz + dz))
            })
        })
    }

    /// Layers above and below the world never exist and are not required.
    #[inline]
    pub fn is_vertical_edge(coord: ChunkCoord, height: i32) -> bool {
        coord.cy < 0 || coord.cy >= height
    }

    fn slot_of(&self, coord: ChunkCoord) -> Option<usize> {
        let x = coord.cx - self.column.cx + 1;
        let y = coord.cy + 1;
        let z = coord.cz - self.column.cz + 1;
        if !(0..3).contains(&x) || !(0..self.height + 2).contains(&y) || !(0..3).contains(&z) {
            return None;
        }
        Some(index3(
            x as usize,
            y as usize,
            z as usize,
            3,
            (self.height + 2) as usize,
        ))
    }

    /// Places a buffer in its slot; false if it lies outside the cluster.
    pub fn insert(&mut self, buf: VoxelBuf) -> bool {
        match self.slot_of(buf.coord) {
            Some(i) => {
                self.slots[i] = Some(buf);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&VoxelBuf> {
        self.slot_of(coord).and_then(|i| self.slots[i].as_ref())
    }

    /// Chunks, inside or just outside the cluster, whose meshes see changed light.
    pub fn changed(&self) -> &HashSet<ChunkCoord> {
        &self.changed
    }

    /// Splits the cluster back into its buffers and the set of chunks to remesh.
    pub fn into_parts(self) -> (Vec<VoxelBuf>, HashSet<ChunkCoord>) {
        (self.slots.into_iter().flatten().collect(), self.changed)
    }
}

impl LightVolume for ColumnCluster {
    fn voxel(&self, pos: VoxelPos) -> Option<Voxel> {
        let (x, y, z) = pos;
        self.get(ChunkCoord::of_voxel(x, y, z))?.get_world(x, y, z)
    }

    fn voxel_mut(&mut self, pos: VoxelPos) -> Option<&mut Voxel> {
        let (x, y, z) = pos;
        let i = self.slot_of(ChunkCoord::of_voxel(x, y, z))?;
        self.slots[i].as_mut()?.world_mut(x, y, z)
    }

    fn mark_dirty(&mut self, pos: VoxelPos, _immediate: bool) {
        let (x, y, z) = pos;
        let coord = ChunkCoord::of_voxel(x, y, z);
        self.changed.insert(coord);
        let (lx, ly, lz) = coord.local_of(x, y, z);
        for (dx, dy, dz) in boundary_offsets(lx as usize, ly as usize, lz as usize) {
            self.changed.insert(coord.offset(dx, dy, dz));
        }
    }
}

/// Floods sunlight down every voxel column of the cluster's center column and
/// spreads it through the cluster.
///
/// Each column is lit from the top of the world down to the first voxel that is
/// opaque or absorbs light.
pub fn illuminate_column(cluster: &mut ColumnCluster, reg: &BlockRegistry) {
    let mut queues = LightingQueues::new();
    let (ox, oz) = (
        cluster.column.cx * CHUNK_SIZE_I32,
        cluster.column.cz * CHUNK_SIZE_I32,
    );
    let top = cluster.height * CHUNK_SIZE_I32 - 1;
    for z in oz..oz + CHUNK_SIZE_I32 {
        for x in ox..ox + CHUNK_SIZE_I32 {
            for y in (0..=top).rev() {
                let Some(v) = cluster.voxel_mut((x, y, z)) else {
                    continue;
                };
                if !reg.is_transparent(v.block) || reg.absorption(v.block) > 0 {
                    break;
                }
                v.light.set(LightChannel::Sun, Light::MAX);
                cluster.mark_dirty((x, y, z), false);
                queues.push_add(LightChannel::Sun, (x, y, z), Light::MAX);
            }
        }
    }
    queues.calculate(cluster, reg, LightChannel::Sun);
    log::trace!(
        target: "lighting",
        "illuminated column ({}, {}); {} chunks changed",
        cluster.column.cx,
        cluster.column.cz,
        cluster.changed.len()
    );
}
