use lode_blocks::{AIR, BlockId, BlockRegistry, Light, LightChannel};

use crate::{LightVolume, LightingQueues, SIDES, VoxelPos, offset};

/// Replaces the voxel at `pos` with air and relights around it.
///
/// Returns false, changing nothing, when the voxel's chunk is unavailable.
pub fn destroy_voxel<V: LightVolume + ?Sized>(
    vol: &mut V,
    reg: &BlockRegistry,
    pos: VoxelPos,
) -> bool {
    let Some(v) = vol.voxel_mut(pos) else {
        return false;
    };
    v.block = AIR;
    vol.mark_dirty(pos, true);

    let mut queues = LightingQueues::new();
    for ch in LightChannel::COLORS {
        queues.remove_light(vol, pos, ch);
    }
    for ch in LightChannel::COLORS {
        queues.calculate(vol, reg, ch);
    }

    let (x, y, z) = pos;
    let open_sky = vol
        .voxel((x, y + 1, z))
        .is_some_and(|above| above.is_air() && above.light.sun() == Light::MAX);
    if open_sky {
        let mut wy = y;
        while wy >= 0 && vol.voxel((x, wy, z)).is_some_and(|v| v.is_air()) {
            queues.add_light(vol, (x, wy, z), LightChannel::Sun, Light::MAX);
            wy -= 1;
        }
    }

    for ch in LightChannel::ALL {
        for side in SIDES {
            queues.add_light_existing(vol, offset(pos, side), ch);
        }
        queues.calculate(vol, reg, ch);
    }
    true
}

/// Writes `block` at `pos`, darkens what it now shades, and lights from its emission.
///
/// Returns false, changing nothing, when the voxel's chunk is unavailable.
pub fn place_voxel<V: LightVolume + ?Sized>(
    vol: &mut V,
    reg: &BlockRegistry,
    pos: VoxelPos,
    block: BlockId,
) -> bool {
    let Some(v) = vol.voxel_mut(pos) else {
        return false;
    };
    v.block = block;
    vol.mark_dirty(pos, true);

    let mut queues = LightingQueues::new();
    for ch in LightChannel::ALL {
        queues.remove_light(vol, pos, ch);
    }

    let (x, y, z) = pos;
    let mut wy = y - 1;
    while wy >= 0
        && vol
            .voxel((x, wy, z))
            .is_some_and(|v| reg.is_transparent(v.block))
    {
        queues.remove_light(vol, (x, wy, z), LightChannel::Sun);
        wy -= 1;
    }

    for ch in LightChannel::ALL {
        queues.calculate(vol, reg, ch);
    }

    let emission = reg.emission(block);
    for ch in LightChannel::COLORS {
        let level = emission.get(ch);
        if level != 0 {
            queues.add_light(vol, pos, ch, level);
            queues.calculate(vol, reg, ch);
        }
    }
    true
}
