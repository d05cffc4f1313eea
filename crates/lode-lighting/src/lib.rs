//! Four-channel flood-fill lighting over a chunked voxel volume.
#![forbid(unsafe_code)]

mod cluster;
mod edit;

pub use cluster::{ColumnCluster, illuminate_column};
pub use edit::{destroy_voxel, place_voxel};

use lode_blocks::{BlockRegistry, Light, LightChannel, Voxel};
use std::collections::VecDeque;

/// World voxel position.
pub type VoxelPos = (i32, i32, i32);

/// Face neighbors in +x, -x, +y, -y, +z, -z order.
pub const SIDES: [VoxelPos; 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

#[inline]
pub fn offset(pos: VoxelPos, d: VoxelPos) -> VoxelPos {
    (pos.0 + d.0, pos.1 + d.1, pos.2 + d.2)
}

/// The voxels a flood fill may read and write.
///
/// Lookups return `None` for positions whose chunk is missing, not yet
/// generated, or owned by a background job; the fill treats those as walls.
pub trait LightVolume {
    fn voxel(&self, pos: VoxelPos) -> Option<Voxel>;

    fn voxel_mut(&mut self, pos: VoxelPos) -> Option<&mut Voxel>;

    /// Flags the chunk holding `pos`, and any face neighbor whose mesh samples it, for remeshing.
    fn mark_dirty(&mut self, pos: VoxelPos, immediate: bool);
}

/// A queued voxel and the light level it carried when queued.
///
/// Levels are signed so that `level - absorption - 1` can go below zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LightEntry {
    pub pos: VoxelPos,
    pub level: i32,
}

/// Pending add and remove work, one queue pair per channel.
#[derive(Default, Debug)]
pub struct LightingQueues {
    add: [VecDeque<LightEntry>; 4],
    remove: [VecDeque<LightEntry>; 4],
}

impl LightingQueues {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_add(&mut self, ch: LightChannel, pos: VoxelPos, level: u8) {
        self.add[ch.index()].push_back(LightEntry {
            pos,
            level: i32::from(level),
        });
    }

    #[inline]
    fn push_remove(&mut self, ch: LightChannel, pos: VoxelPos, level: u8) {
        self.remove[ch.index()].push_back(LightEntry {
            pos,
            level: i32::from(level),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.add.iter().chain(self.remove.iter()).all(VecDeque::is_empty)
    }

    /// Sets `pos` to `level` on `ch` and queues it as a source.
    ///
    /// Levels of 1 or less cannot spread and are ignored.
    pub fn add_light<V: LightVolume + ?Sized>(
        &mut self,
        vol: &mut V,
        pos: VoxelPos,
        ch: LightChannel,
        level: u8,
    ) {
        if level <= 1 {
            return;
        }
        let Some(v) = vol.voxel_mut(pos) else {
            return;
        };
        v.light.set(ch, level);
        vol.mark_dirty(pos, true);
        self.push_add(ch, pos, level.min(Light::MAX));
    }

    /// Queues whatever light `pos` already holds so it spreads again.
    pub fn add_light_existing<V: LightVolume + ?Sized>(
        &mut self,
        vol: &V,
        pos: VoxelPos,
        ch: LightChannel,
    ) {
        let Some(v) = vol.voxel(pos) else {
            return;
        };
        let level = v.light.get(ch);
        if level > 1 {
            self.push_add(ch, pos, level);
        }
    }

    /// Clears `pos` on `ch` and queues the old level for removal.
    pub fn remove_light<V: LightVolume + ?Sized>(
        &mut self,
        vol: &mut V,
        pos: VoxelPos,
        ch: LightChannel,
    ) {
        let Some(v) = vol.voxel_mut(pos) else {
            return;
        };
        let level = v.light.get(ch);
        if level <= 1 {
            return;
        }
        v.light.set(ch, 0);
        vol.mark_dirty(pos, true);
        self.push_remove(ch, pos, level);
    }

    /// Drains the remove queue and then the add queue for `ch`.
    ///
    /// Removal clears every neighbor whose level is exactly what the removed
    /// entry would have given it, and re-queues brighter neighbors as sources so
    /// the add pass can refill the hole.
    pub fn calculate<V: LightVolume + ?Sized>(
        &mut self,
        vol: &mut V,
        reg: &BlockRegistry,
        ch: LightChannel,
    ) {
        let c = ch.index();
        while let Some(entry) = self.remove[c].pop_front() {
            for side in SIDES {
                let npos = offset(entry.pos, side);
                let Some(n) = vol.voxel(npos) else {
                    continue;
                };
                let level = i32::from(n.light.get(ch));
                let absorption = i32::from(reg.absorption(n.block));
                if level != 0 && level == entry.level - absorption - 1 {
                    if let Some(v) = vol.voxel_mut(npos) {
                        v.light.set(ch, 0);
                    }
                    self.remove[c].push_back(LightEntry { pos: npos, level });
                    vol.mark_dirty(npos, true);
                } else if level >= entry.level {
                    self.add[c].push_back(LightEntry { pos: npos, level });
                }
            }
        }

        while let Some(entry) = self.add[c].pop_front() {
            if entry.level <= 1 {
                continue;
            }
            for side in SIDES {
                let npos = offset(entry.pos, side);
                let Some(n) = vol.voxel(npos) else {
                    continue;
                };
                if !reg.is_transparent(n.block) {
                    continue;
                }
                let level = i32::from(n.light.get(ch));
                let absorption = i32::from(reg.absorption(n.block));
                let spread = entry.level - absorption - 1;
                if level + absorption + 1 < entry.level {
                    if let Some(v) = vol.voxel_mut(npos) {
                        v.light.set(ch, spread as u8);
                    }
                    self.add[c].push_back(LightEntry {
                        pos: npos,
                        level: spread,
                    });
                    vol.mark_dirty(npos, true);
                }
            }
        }
    }
}
