use super::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lode_blocks::{BlockRegistry, LightChannel};
use lode_chunk::{ChunkCoord, VoxelBuf};
use lode_mesh_cpu::Neighborhood;
use lode_world::{ChunkArena, FlatGenerator};

fn registry() -> Arc<BlockRegistry> {
    Arc::new(BlockRegistry::from_toml_str("[[blocks]]\nname = \"stone\"\n").unwrap())
}

fn flat() -> Arc<FlatGenerator> {
    Arc::new(FlatGenerator {
        ground: 8,
        block: 1,
    })
}

fn some_handle() -> lode_world::ChunkHandle {
    let mut arena = ChunkArena::new();
    arena.insert(lode_chunk::Chunk::spawn(ChunkCoord::new(0, 0, 0), true))
}

#[test]
fn config_defaults_fill_missing_keys() {
    let cfg: WorldConfig = toml::from_str("distance = 5").unwrap();
    assert_eq!(cfg.distance, 5);
    assert_eq!(cfg.height, 16);
    assert_eq!(cfg.load_batch, 1);
    assert_eq!(cfg.mesh_budget, 64);
    assert_eq!(cfg.workers, WorldConfig::default().workers);
}

#[test]
fn config_rejects_flat_world() {
    let cfg: WorldConfig = toml::from_str("height = 0").unwrap();
    assert!(matches!(cfg.validate(), Err(ConfigError::Height(0))));
}

#[test]
fn missing_config_file_is_io_error() {
    let err = load_world_config(std::path::Path::new("/nonexistent/world.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn inline_runtime_answers_on_next_drain() {
    let rt = Runtime::new(0, registry(), flat()).unwrap();
    let handle = some_handle();
    let buf = VoxelBuf::new(ChunkCoord::new(0, 0, 0));
    assert!(rt.submit(Job::Generate { handle, buf }).is_ok());
    assert_eq!(rt.queue_debug_counts(), (0, 0));

    let outs = rt.drain_worker_results();
    assert_eq!(outs.len(), 1);
    let JobOut::Generated { handle: h, buf, .. } = &outs[0] else {
        panic!("expected a generated chunk");
    };
    assert_eq!(*h, handle);
    assert_eq!(buf.get_local(0, 7, 0).block, 1);
    assert!(buf.get_local(0, 8, 0).is_air());
    assert!(rt.drain_worker_results().is_empty());
}

#[test]
fn pooled_runtime_meshes_off_thread() {
    let rt = Runtime::new(2, registry(), flat()).unwrap();
    assert_eq!(rt.workers(), 2);

    let mut buf = VoxelBuf::new(ChunkCoord::new(0, 0, 0));
    buf.set_local(3, 3, 3, lode_blocks::Voxel::new(1));
    for v in buf.voxels.iter_mut() {
        v.light.set(LightChannel::Sun, 15);
    }
    let mut nb = Neighborhood::new(buf.coord);
    for dz in -1..=1 {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let mut n = buf.clone();
                n.coord = buf.coord.offset(dx, dy, dz);
                if (dx, dy, dz) != (0, 0, 0) {
                    n.set_local(3, 3, 3, lode_blocks::Voxel::AIR);
                }
                assert!(nb.insert(n));
            }
        }
    }
    let handle = some_handle();
    assert!(rt.submit(Job::Mesh { handle, nb: Box::new(nb) }).is_ok());

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut outs = Vec::new();
    while outs.is_empty() && Instant::now() < deadline {
        outs = rt.drain_worker_results();
        std::thread::sleep(Duration::from_millis(1));
    }
    let [JobOut::Meshed { mesh, .. }] = outs.as_slice() else {
        panic!("expected one mesh");
    };
    assert_eq!(mesh.quad_count(), 6);
    assert_eq!(mesh.opaque.len(), 36);
}
