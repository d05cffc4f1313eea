use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lode_blocks::{BlockRegistry, BlocksError};
use lode_chunk::{CHUNK_SIZE_I32, ColumnCoord};
use lode_geom::Vec3;
use lode_runtime::{ConfigError, RuntimeError, TickStats, VoxelWorld, load_world_config};
use lode_world::TerrainGenerator;
use lode_world::worldgen::{WorldGenError, generator_from_config, load_worldgen_from_path};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "lode", about = "Headless voxel world streaming driver")]
struct Args {
    /// World streaming config (TOML)
    #[arg(long, default_value = "assets/world.toml")]
    config: PathBuf,
    /// Block table (TOML)
    #[arg(long, default_value = "assets/blocks.toml")]
    blocks: PathBuf,
    /// Terrain generator config (TOML)
    #[arg(long, default_value = "assets/worldgen.toml")]
    worldgen: PathBuf,
    /// Number of ticks to run
    #[arg(long, default_value_t = 300)]
    ticks: u64,
    /// Override the render distance from the config
    #[arg(long)]
    distance: Option<i32>,
    /// Override the worker count from the config (0 = inline)
    #[arg(long)]
    workers: Option<usize>,
    /// Terrain seed
    #[arg(long, default_value_t = 1337)]
    seed: i32,
    /// Move the center one column along +x every N ticks (0 = stay put)
    #[arg(long, default_value_t = 0)]
    walk: u64,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Blocks(#[from] BlocksError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    WorldGen(#[from] WorldGenError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[derive(Default)]
struct Totals {
    generated: usize,
    illuminated: usize,
    meshes: usize,
    quads: usize,
    destroyed: usize,
}

impl Totals {
    fn add(&mut self, stats: &TickStats) {
        self.generated += stats.generated;
        self.illuminated += stats.illuminated;
        self.destroyed += stats.destroyed;
    }
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let reg = Arc::new(BlockRegistry::load_from_path(&args.blocks)?);
    log::info!(
        "loaded {} blocks, {} sprites in a {}x{} atlas",
        reg.len(),
        reg.atlas.len(),
        reg.atlas.size(),
        reg.atlas.size()
    );

    let mut cfg = load_world_config(&args.config)?;
    if let Some(d) = args.distance {
        cfg.distance = d.max(0);
    }
    if let Some(w) = args.workers {
        cfg.workers = w;
    }
    let wg = load_worldgen_from_path(&args.worldgen)?;
    let generator: Arc<dyn TerrainGenerator> =
        Arc::from(generator_from_config(&wg, &reg, args.seed, cfg.height)?);

    let height = cfg.height;
    let mut center = ColumnCoord::new(0, 0);
    let mut world = VoxelWorld::new(cfg, center, reg.clone(), generator)?;
    let mut totals = Totals::default();

    for t in 0..args.ticks {
        if args.walk > 0 && t > 0 && t % args.walk == 0 {
            center = center.offset(1, 0);
            world.set_center(center);
        }
        let stats = world.tick();
        totals.add(&stats);
        let events = world.drain_events();
        totals.meshes += events.meshes.len();
        totals.quads += events.meshes.iter().map(|m| m.quad_count()).sum::<usize>();
        if stats.tick % 50 == 0 || !events.removed.is_empty() {
            log::info!(
                "[tick {}] chunks {} | columns pending {} | lighting pending {} | jobs {} queued {} running | meshes +{} | {} removed | {}ms",
                stats.tick,
                stats.chunks,
                stats.pending_columns,
                stats.pending_illumination,
                stats.jobs_queued,
                stats.jobs_running,
                events.meshes.len(),
                events.removed.len(),
                stats.t_tick_ms
            );
        }
    }

    dig_at_center(&mut world, center, height, &reg);

    log::info!(
        "done after {} ticks: {} generated, {} columns lit, {} meshes ({} quads), {} destroyed, settled: {}",
        args.ticks,
        totals.generated,
        totals.illuminated,
        totals.meshes,
        totals.quads,
        totals.destroyed,
        world.is_settled()
    );
    Ok(())
}

/// Casts straight down through the middle of `center`, breaks the first solid
/// voxel and puts a light source in its place.
fn dig_at_center(world: &mut VoxelWorld, center: ColumnCoord, height: i32, reg: &BlockRegistry) {
    let top = (height * CHUNK_SIZE_I32) as f32;
    let origin = Vec3::new(
        (center.cx * CHUNK_SIZE_I32) as f32 + 8.5,
        top - 0.5,
        (center.cz * CHUNK_SIZE_I32) as f32 + 8.5,
    );
    let Some(hit) = world.raycast(origin, Vec3::new(0.0, -1.0, 0.0), top) else {
        log::info!("raycast from {origin:?} found no ground");
        return;
    };
    let before = world.get_voxel(hit.previous).light;
    let broke = world.destroy_voxel(hit.block);
    let placed = reg
        .id_by_name("glowstone")
        .is_some_and(|id| world.place_voxel(hit.block, id, None));
    let stats = world.tick();
    log::info!(
        "dig at {:?} (from {:?}): broke {}, lamp {}, light above {:?} -> {:?}, {} immediate rebuilds",
        hit.block,
        hit.previous,
        broke,
        placed,
        before,
        world.get_voxel(hit.previous).light,
        stats.meshed_immediate
    );
}
