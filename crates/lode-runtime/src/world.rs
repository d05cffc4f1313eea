use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashMap;
use lode_blocks::{AIR, BlockId, BlockRegistry, Voxel};
use lode_chunk::{Chunk, ChunkCoord, ChunkStatus, ColumnCoord};
use lode_geom::{Aabb, Vec3};
use lode_lighting::{ColumnCluster, VoxelPos};
use lode_mesh_cpu::{ChunkMesh, Neighborhood, build_chunk_mesh};
use lode_world::{
    ChunkHandle, ChunkStore, LoadingQueue, Mutation, MutationQueue, RayHit, TerrainGenerator,
    VisibilityChanges, raycast_first_hit,
};

use crate::config::WorldConfig;
use crate::error::RuntimeError;
use crate::pool::{Job, JobOut, Runtime};

/// Renderer-facing output collected since the last [`VoxelWorld::drain_events`].
#[derive(Debug, Default)]
pub struct WorldEvents {
    pub meshes: Vec<ChunkMesh>,
    pub shown: Vec<ChunkCoord>,
    pub hidden: Vec<ChunkCoord>,
    /// Chunks destroyed; their meshes should be released.
    pub removed: Vec<ChunkCoord>,
}

impl WorldEvents {
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
            && self.shown.is_empty()
            && self.hidden.is_empty()
            && self.removed.is_empty()
    }

    fn extend_visibility(&mut self, changes: VisibilityChanges) {
        self.shown.extend(changes.shown);
        self.hidden.extend(changes.hidden);
    }
}

/// Counters for one [`VoxelWorld::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick: u64,
    pub chunks: usize,
    pub columns_spawned: usize,
    pub generated: usize,
    pub illuminations_started: usize,
    pub illuminated: usize,
    pub meshed: usize,
    pub meshed_immediate: usize,
    pub destroyed: usize,
    pub deferred: usize,
    pub pending_columns: usize,
    pub pending_illumination: usize,
    pub jobs_queued: usize,
    pub jobs_running: usize,
    pub t_tick_ms: u32,
}

/// A chunk's outstanding background mesh job.
#[derive(Copy, Clone, Debug)]
struct MeshTicket {
    /// Superseded by a synchronous rebuild; drop the result.
    stale: bool,
}

/// Streams, lights, and meshes chunks around a moving center.
///
/// Each [`VoxelWorld::tick`] runs its phases in a fixed order: job results,
/// loading, generation, illumination, meshing, then structural mutations.
pub struct VoxelWorld {
    config: WorldConfig,
    reg: Arc<BlockRegistry>,
    store: ChunkStore,
    loading: LoadingQueue,
    mutations: MutationQueue,
    runtime: Runtime,
    pending_light: Vec<ColumnCoord>,
    meshing: HashMap<ChunkHandle, MeshTicket>,
    target_center: ColumnCoord,
    target_distance: i32,
    events: WorldEvents,
    stats: TickStats,
    tick: u64,
}

impl VoxelWorld {
    pub fn new(
        config: WorldConfig,
        center: ColumnCoord,
        reg: Arc<BlockRegistry>,
        generator: Arc<dyn TerrainGenerator>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let mut store = ChunkStore::new(center, config.distance, config.height);
        let mut loading = LoadingQueue::new(config.load_batch);
        let mut events = WorldEvents::default();
        events.extend_visibility(loading.rebuild(&mut store));
        let runtime = Runtime::new(config.workers, reg.clone(), generator)?;
        log::info!(
            target: "runtime",
            "world at ({}, {}): distance {}, height {}, {} columns queued",
            center.cx,
            center.cz,
            store.distance(),
            store.height(),
            loading.len()
        );
        Ok(Self {
            target_center: center,
            target_distance: store.distance(),
            config,
            reg,
            store,
            loading,
            mutations: MutationQueue::new(),
            runtime,
            pending_light: Vec::new(),
            meshing: HashMap::new(),
            events,
            stats: TickStats::default(),
            tick: 0,
        })
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.reg
    }

    /// Stats of the last finished tick.
    #[inline]
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// True once nothing is queued, pending, or running.
    pub fn is_settled(&self) -> bool {
        let (queued, running) = self.runtime.queue_debug_counts();
        self.loading.is_empty()
            && self.pending_light.is_empty()
            && self.meshing.is_empty()
            && self.mutations.is_empty()
            && queued == 0
            && running == 0
            && !self.store.iter().any(|(_, c)| c.status.is_in_flight())
    }

    /// Requests a recenter; applied at the end of the next tick.
    pub fn set_center(&mut self, center: ColumnCoord) {
        if center != self.target_center {
            self.target_center = center;
            self.mutations.push(Mutation::SetCenter(center));
        }
    }

    /// Requests a new render distance; applied at the end of the next tick.
    pub fn set_distance(&mut self, distance: i32) {
        let distance = distance.max(0);
        if distance != self.target_distance {
            self.target_distance = distance;
            self.mutations.push(Mutation::SetDistance(distance));
        }
    }

    /// Voxel at `pos`, or the default voxel when its chunk is unavailable.
    #[inline]
    pub fn get_voxel(&self, pos: VoxelPos) -> Voxel {
        self.store.get_voxel(pos)
    }

    /// Breaks the voxel at `pos`. False if its chunk is unavailable or it is already air.
    pub fn destroy_voxel(&mut self, pos: VoxelPos) -> bool {
        if self.store.get_voxel(pos).is_air() {
            return false;
        }
        let ok = lode_lighting::destroy_voxel(&mut self.store, &self.reg, pos);
        log::debug!(target: "edit", "[tick {}] destroy {:?}: {}", self.tick, pos, ok);
        ok
    }

    /// Places `block` at `pos`.
    ///
    /// Refused when the cell is not air, when it overlaps `guard`, or when its
    /// chunk is unavailable.
    pub fn place_voxel(&mut self, pos: VoxelPos, block: BlockId, guard: Option<&Aabb>) -> bool {
        let (x, y, z) = pos;
        if block == AIR || self.reg.get(block).is_none() {
            log::warn!(target: "edit", "refusing to place block {block} at {pos:?}");
            return false;
        }
        if guard.is_some_and(|b| b.intersects_voxel(x, y, z)) {
            log::debug!(target: "edit", "[tick {}] place at {:?} blocked by hitbox", self.tick, pos);
            return false;
        }
        if !self.store.get_voxel(pos).is_air() {
            return false;
        }
        let ok = lode_lighting::place_voxel(&mut self.store, &self.reg, pos, block);
        log::debug!(target: "edit", "[tick {}] place {} at {:?}: {}", self.tick, block, pos, ok);
        ok
    }

    /// First solid voxel along a ray through the loaded chunks.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        raycast_first_hit(origin, dir, max_dist, |x, y, z| {
            self.reg.is_solid(self.store.get_voxel((x, y, z)).block)
        })
    }

    /// Takes the meshes and visibility changes produced so far.
    pub fn drain_events(&mut self) -> WorldEvents {
        std::mem::take(&mut self.events)
    }

    /// Runs one frame of streaming work.
    pub fn tick(&mut self) -> TickStats {
        let t0 = Instant::now();
        self.tick += 1;
        let mut stats = TickStats {
            tick: self.tick,
            ..TickStats::default()
        };

        for out in self.runtime.drain_worker_results() {
            self.apply_result(out, &mut stats);
        }

        let spawned = self.loading.drain(&mut self.store);
        stats.columns_spawned = spawned.len();
        for column in spawned {
            self.submit_generation(column);
            if !self.pending_light.contains(&column) {
                self.pending_light.push(column);
            }
        }

        self.schedule_illumination(&mut stats);
        self.settle_illumination();
        self.schedule_meshing(&mut stats);

        let applied = self.mutations.apply(&mut self.store);
        stats.destroyed = applied.destroyed.len();
        stats.deferred = applied.deferred;
        if applied.reshaped() {
            let changes = self.loading.rebuild(&mut self.store);
            self.events.extend_visibility(changes);
            let store = &self.store;
            self.pending_light.retain(|&c| store.column_in_buffer(c));
        }
        self.events.removed.extend(applied.destroyed);

        let (queued, running) = self.runtime.queue_debug_counts();
        stats.chunks = self.store.live_chunks();
        stats.pending_columns = self.loading.len();
        stats.pending_illumination = self.pending_light.len();
        stats.jobs_queued = queued;
        stats.jobs_running = running;
        stats.t_tick_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
        log::trace!(target: "runtime", "[tick {}] {:?}", self.tick, stats);
        self.stats = stats;
        stats
    }

    fn apply_result(&mut self, out: JobOut, stats: &mut TickStats) {
        match out {
            JobOut::Generated { handle, buf, t_ms } => {
                let Some(chunk) = self.store.chunk_mut(handle) else {
                    log::warn!(target: "runtime", "[tick {}] generated chunk {:?} is gone", self.tick, buf.coord);
                    return;
                };
                chunk.restore(buf);
                chunk.status.remove(ChunkStatus::NOT_GENERATED);
                stats.generated += 1;
                log::trace!(target: "runtime", "[tick {}] generated {:?} in {}ms", self.tick, chunk.coord, t_ms);
            }
            JobOut::Illuminated {
                column,
                bufs,
                changed,
                handles,
                t_ms,
            } => {
                for buf in bufs {
                    let chunk = handles
                        .get(&buf.coord)
                        .and_then(|&h| self.store.chunk_mut(h));
                    match chunk {
                        Some(chunk) => chunk.restore(buf),
                        None => {
                            log::warn!(target: "lighting", "[tick {}] lit chunk {:?} is gone", self.tick, buf.coord)
                        }
                    }
                }
                for cy in 0..self.store.height() {
                    let chunk = handles
                        .get(&column.chunk(cy))
                        .and_then(|&h| self.store.chunk_mut(h));
                    if let Some(chunk) = chunk {
                        chunk.status.insert(ChunkStatus::ILLUMINATED);
                    }
                }
                for coord in changed {
                    self.store.mark_chunk_dirty(coord, false);
                }
                stats.illuminated += 1;
                log::debug!(
                    target: "lighting",
                    "[tick {}] column ({}, {}) lit in {}ms",
                    self.tick,
                    column.cx,
                    column.cz,
                    t_ms
                );
            }
            JobOut::Meshed { handle, mesh, t_ms } => {
                let stale = self.meshing.remove(&handle).is_none_or(|t| t.stale);
                if stale || self.store.chunk(handle).is_none() {
                    log::trace!(target: "mesh", "[tick {}] dropping stale mesh {:?}", self.tick, mesh.coord);
                    return;
                }
                stats.meshed += 1;
                log::trace!(
                    target: "mesh",
                    "[tick {}] meshed {:?}: {} quads in {}ms",
                    self.tick,
                    mesh.coord,
                    mesh.quad_count(),
                    t_ms
                );
                self.events.meshes.push(mesh);
            }
        }
    }

    fn submit_generation(&mut self, column: ColumnCoord) {
        for cy in 0..self.store.height() {
            let Some(handle) = self.store.get_handle(column.chunk(cy)) else {
                continue;
            };
            let Some(chunk) = self.store.chunk_mut(handle) else {
                continue;
            };
            if chunk.status.is_generated() {
                continue;
            }
            let Some(buf) = chunk.lend() else {
                continue;
            };
            if let Err(Job::Generate { handle, buf }) =
                self.runtime.submit(Job::Generate { handle, buf })
            {
                log::error!(target: "runtime", "worker pool closed, generation of {:?} dropped", buf.coord);
                if let Some(chunk) = self.store.chunk_mut(handle) {
                    chunk.restore(buf);
                }
            }
        }
    }

    /// Every in-world chunk of the cluster that the store can hold must be
    /// generated and idle. Neighbors past the buffer edge are never loaded and
    /// do not block.
    fn cluster_ready(&self, column: ColumnCoord) -> bool {
        let height = self.store.height();
        ColumnCluster::coords(column, height).all(|coord| {
            if ColumnCluster::is_vertical_edge(coord, height) || self.store.is_out_of_buffer(coord) {
                return true;
            }
            self.store
                .get(coord)
                .is_some_and(|c| c.status.is_generated() && !c.status.is_in_flight())
        })
    }

    fn schedule_illumination(&mut self, stats: &mut TickStats) {
        let pending = std::mem::take(&mut self.pending_light);
        for column in pending {
            if !self.store.column_in_buffer(column) {
                continue;
            }
            if !self.cluster_ready(column) {
                self.pending_light.push(column);
                continue;
            }
            let height = self.store.height();
            let mut cluster = ColumnCluster::new(column, height);
            let mut handles = HashMap::new();
            for coord in ColumnCluster::coords(column, height) {
                let Some(h) = self.store.get_handle(coord) else {
                    continue;
                };
                if let Some(buf) = self.store.chunk_mut(h).and_then(Chunk::lend) {
                    cluster.insert(buf);
                    handles.insert(coord, h);
                }
            }
            match self.runtime.submit(Job::Illuminate { cluster, handles }) {
                Ok(()) => stats.illuminations_started += 1,
                Err(Job::Illuminate { cluster, handles }) => {
                    log::error!(target: "runtime", "worker pool closed, illumination of ({}, {}) delayed", column.cx, column.cz);
                    let (bufs, _) = cluster.into_parts();
                    for buf in bufs {
                        if let Some(chunk) = handles.get(&buf.coord).and_then(|&h| self.store.chunk_mut(h)) {
                            chunk.restore(buf);
                        }
                    }
                    self.pending_light.push(column);
                }
                Err(_) => {}
            }
        }
    }

    /// Clears `NOT_ILLUMINATED` on lit chunks whose whole neighborhood is lit.
    fn settle_illumination(&mut self) {
        let ready: Vec<ChunkHandle> = self
            .store
            .iter()
            .filter(|(_, c)| {
                c.status
                    .contains(ChunkStatus::ILLUMINATED | ChunkStatus::NOT_ILLUMINATED)
            })
            .filter(|(_, c)| self.store.neighborhood_lit(c.coord))
            .map(|(h, _)| h)
            .collect();
        for h in ready {
            if let Some(chunk) = self.store.chunk_mut(h) {
                chunk.status.remove(ChunkStatus::NOT_ILLUMINATED);
            }
        }
    }

    fn snapshot(&self, coord: ChunkCoord) -> Option<Neighborhood> {
        let store = &self.store;
        Neighborhood::snapshot(coord, store.height(), |c| {
            store.get(c).and_then(Chunk::voxels)
        })
    }

    fn schedule_meshing(&mut self, stats: &mut TickStats) {
        let blocked = ChunkStatus::NOT_GENERATED | ChunkStatus::NOT_ILLUMINATED | ChunkStatus::IN_FLIGHT;
        let mut candidates: Vec<(ChunkHandle, ChunkCoord, bool)> = self
            .store
            .iter()
            .filter(|(_, c)| {
                c.status.contains(ChunkStatus::DIRTY | ChunkStatus::VISIBLE)
                    && !c.status.intersects(blocked)
            })
            .map(|(h, c)| (h, c.coord, c.status.contains(ChunkStatus::IMMEDIATE)))
            .collect();
        // Immediate rebuilds first.
        candidates.sort_by_key(|&(_, _, immediate)| !immediate);

        let mut submitted = 0usize;
        for (h, coord, immediate) in candidates {
            if !immediate && (submitted >= self.config.mesh_budget || self.meshing.contains_key(&h)) {
                continue;
            }
            let Some(nb) = self.snapshot(coord) else {
                continue;
            };
            if let Some(chunk) = self.store.chunk_mut(h) {
                chunk.status.remove(ChunkStatus::DIRTY | ChunkStatus::IMMEDIATE);
            }
            if immediate {
                let mesh = build_chunk_mesh(&nb, &self.reg);
                if let Some(ticket) = self.meshing.get_mut(&h) {
                    ticket.stale = true;
                }
                stats.meshed_immediate += 1;
                self.events.meshes.push(mesh);
                continue;
            }
            match self.runtime.submit(Job::Mesh {
                handle: h,
                nb: Box::new(nb),
            }) {
                Ok(()) => {
                    self.meshing.insert(h, MeshTicket { stale: false });
                    submitted += 1;
                }
                Err(_) => {
                    log::error!(target: "runtime", "worker pool closed, mesh of {coord:?} delayed");
                    self.store.mark_chunk_dirty(coord, false);
                }
            }
        }
    }
}
