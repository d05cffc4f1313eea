use std::sync::Arc;

use lode_blocks::{BlockId, BlockRegistry, LightChannel};
use lode_chunk::{ChunkCoord, ChunkStatus, ColumnCoord};
use lode_geom::{Aabb, Vec3};
use lode_runtime::{VoxelWorld, WorldConfig};
use lode_world::FlatGenerator;

const BLOCKS: &str = r#"
    [[blocks]]
    name = "stone"

    [[blocks]]
    name = "lamp"
    emission = { r = 12 }
"#;

const STONE: BlockId = 1;
const LAMP: BlockId = 2;

fn flat_world(center: ColumnCoord, workers: usize) -> VoxelWorld {
    let reg = Arc::new(BlockRegistry::from_toml_str(BLOCKS).unwrap());
    let cfg = WorldConfig {
        distance: 0,
        height: 1,
        load_batch: 9,
        workers,
        mesh_budget: 64,
    };
    let generator = Arc::new(FlatGenerator {
        ground: 8,
        block: STONE,
    });
    VoxelWorld::new(cfg, center, reg, generator).unwrap()
}

fn run_until_settled(world: &mut VoxelWorld) -> usize {
    for n in 1..=200 {
        world.tick();
        if world.is_settled() {
            return n;
        }
        if world.runtime().workers() > 0 {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }
    panic!("world did not settle");
}

fn sun(world: &VoxelWorld, pos: (i32, i32, i32)) -> u8 {
    world.get_voxel(pos).light.get(LightChannel::Sun)
}

#[test]
fn flat_world_is_sunlit_above_ground_only() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);

    for y in 8..16 {
        assert_eq!(sun(&world, (8, y, 8)), 15, "y = {y}");
        assert_eq!(sun(&world, (0, y, 15)), 15, "y = {y}");
    }
    for y in 0..8 {
        assert_eq!(sun(&world, (8, y, 8)), 0, "y = {y}");
    }
    let center = world.store().get(ChunkCoord::new(0, 0, 0)).unwrap();
    assert!(!center.status.contains(ChunkStatus::NOT_ILLUMINATED));
    assert!(!center.status.contains(ChunkStatus::DIRTY));

    // Only the rendered chunk gets a mesh; the ring around it is buffer.
    let events = world.drain_events();
    assert_eq!(events.meshes.len(), 1);
    let mesh = &events.meshes[0];
    assert_eq!(mesh.coord, ChunkCoord::new(0, 0, 0));
    // Ground top faces only; sides face stone neighbors.
    assert_eq!(mesh.quad_count(), 16 * 16);
}

#[test]
fn digging_opens_a_sunlit_shaft_and_tunnel() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);
    world.drain_events();

    assert!(world.destroy_voxel((8, 7, 8)));
    assert_eq!(sun(&world, (8, 7, 8)), 15);
    assert!(world.destroy_voxel((8, 6, 8)));
    assert!(world.destroy_voxel((8, 5, 8)));
    assert_eq!(sun(&world, (8, 5, 8)), 15);

    assert!(world.destroy_voxel((9, 5, 8)));
    assert!(world.destroy_voxel((10, 5, 8)));
    assert_eq!(sun(&world, (9, 5, 8)), 14);
    assert_eq!(sun(&world, (10, 5, 8)), 13);

    // Air can't be destroyed twice.
    assert!(!world.destroy_voxel((8, 5, 8)));

    // Edits rebuild synchronously on the next tick.
    let stats = world.tick();
    assert_eq!(stats.meshed_immediate, 1);
    let events = world.drain_events();
    assert_eq!(events.meshes.len(), 1);
    assert_eq!(events.meshes[0].coord, ChunkCoord::new(0, 0, 0));
}

#[test]
fn placing_a_lamp_lights_and_shades() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);

    assert!(world.place_voxel((8, 10, 8), STONE, None));
    assert_eq!(sun(&world, (8, 9, 8)), 14);
    assert_eq!(sun(&world, (8, 8, 8)), 14);

    assert!(world.place_voxel((4, 8, 4), LAMP, None));
    let red = |pos| world.get_voxel(pos).light.get(LightChannel::Red);
    assert_eq!(red((4, 9, 4)), 11);
    assert_eq!(red((6, 8, 4)), 10);

    assert!(world.destroy_voxel((4, 8, 4)));
    assert_eq!(world.get_voxel((4, 9, 4)).light.get(LightChannel::Red), 0);
}

#[test]
fn placement_is_refused_into_hitbox_or_solid() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);

    let player = Aabb::from_center_extents(Vec3::new(8.5, 9.0, 8.5), Vec3::new(0.3, 0.9, 0.3));
    assert!(!world.place_voxel((8, 8, 8), STONE, Some(&player)));
    assert!(world.get_voxel((8, 8, 8)).is_air());
    assert!(!world.place_voxel((8, 7, 8), STONE, None));
    assert!(world.place_voxel((9, 8, 8), STONE, Some(&player)));
}

#[test]
fn edits_outside_loaded_chunks_do_nothing() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);
    assert!(!world.destroy_voxel((100, 4, 100)));
    assert!(!world.place_voxel((100, 9, 100), STONE, None));
    assert!(world.get_voxel((100, 4, 100)).is_air());
}

#[test]
fn raycast_picks_the_ground_below() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);
    let hit = world
        .raycast(Vec3::new(3.5, 12.5, 3.5), Vec3::new(0.0, -1.0, 0.0), 16.0)
        .unwrap();
    assert_eq!(hit.block, (3, 7, 3));
    assert_eq!(hit.previous, (3, 8, 3));
    assert!(world.destroy_voxel(hit.block));
    assert!(world.place_voxel(hit.block, STONE, None));
}

#[test]
fn recentering_streams_a_new_column_and_drops_the_old() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    run_until_settled(&mut world);
    world.drain_events();

    world.set_center(ColumnCoord::new(1, 0));
    let stats = world.tick();
    assert_eq!(stats.destroyed, 3);
    let events = world.drain_events();
    assert_eq!(events.removed.len(), 3);
    assert!(events.removed.iter().all(|c| c.cx == -1));
    assert_eq!(events.hidden, vec![ChunkCoord::new(0, 0, 0)]);
    assert_eq!(events.shown, vec![ChunkCoord::new(1, 0, 0)]);

    run_until_settled(&mut world);
    assert_eq!(world.store().live_chunks(), 9);
    let events = world.drain_events();
    assert!(events.meshes.iter().any(|m| m.coord == ChunkCoord::new(1, 0, 0)));
    assert_eq!(sun(&world, (40, 9, 8)), 15);
    assert_eq!(sun(&world, (40, 7, 8)), 0);
}

#[test]
fn recenter_defers_destruction_of_chunks_in_flight() {
    let mut world = flat_world(ColumnCoord::new(0, 0), 0);
    world.set_center(ColumnCoord::new(10, 0));

    // Generation jobs still hold every spawned chunk when the recenter lands.
    let stats = world.tick();
    assert_eq!(stats.columns_spawned, 9);
    assert_eq!(stats.destroyed, 0);
    assert_eq!(stats.deferred, 9);
    assert_eq!(world.store().live_chunks(), 9);

    let stats = world.tick();
    assert_eq!(stats.destroyed, 9);

    run_until_settled(&mut world);
    assert_eq!(world.store().live_chunks(), 9);
    assert!(world.store().get(ChunkCoord::new(10, 0, 0)).is_some());
}

#[test]
fn shrinking_distance_destroys_the_outer_ring() {
    let reg = Arc::new(BlockRegistry::from_toml_str(BLOCKS).unwrap());
    let cfg = WorldConfig {
        distance: 1,
        height: 1,
        load_batch: 25,
        workers: 0,
        mesh_budget: 64,
    };
    let generator = Arc::new(FlatGenerator {
        ground: 8,
        block: STONE,
    });
    let mut world = VoxelWorld::new(cfg, ColumnCoord::new(0, 0), reg, generator).unwrap();
    run_until_settled(&mut world);
    assert_eq!(world.store().live_chunks(), 25);
    assert_eq!(world.drain_events().meshes.len(), 9);

    world.set_distance(0);
    let stats = world.tick();
    assert_eq!(stats.destroyed, 16);
    let events = world.drain_events();
    assert_eq!(events.hidden.len(), 8);
    run_until_settled(&mut world);
    assert_eq!(world.store().live_chunks(), 9);
}

#[test]
fn pooled_world_matches_inline_world() {
    let mut inline = flat_world(ColumnCoord::new(0, 0), 0);
    let mut pooled = flat_world(ColumnCoord::new(0, 0), 2);
    run_until_settled(&mut inline);
    run_until_settled(&mut pooled);
    for y in 0..16 {
        for x in [0, 7, 15] {
            let pos = (x, y, 5);
            assert_eq!(inline.get_voxel(pos), pooled.get_voxel(pos), "{pos:?}");
        }
    }
    let a = inline.drain_events();
    let b = pooled.drain_events();
    assert_eq!(a.meshes, b.meshes);
}
