use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;
use lode_blocks::BlockRegistry;
use lode_chunk::{ChunkCoord, ColumnCoord, VoxelBuf};
use lode_lighting::{ColumnCluster, illuminate_column};
use lode_mesh_cpu::{ChunkMesh, Neighborhood, build_chunk_mesh};
use lode_world::{ChunkHandle, TerrainGenerator};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::RuntimeError;

/// Work handed to the pool. Voxel buffers inside a job are owned by it until
/// they come back in the matching [`JobOut`].
pub enum Job {
    Generate {
        handle: ChunkHandle,
        buf: VoxelBuf,
    },
    Illuminate {
        cluster: ColumnCluster,
        handles: HashMap<ChunkCoord, ChunkHandle>,
    },
    Mesh {
        handle: ChunkHandle,
        nb: Box<Neighborhood>,
    },
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::Generate { .. } => JobKind::Generate,
            Job::Illuminate { .. } => JobKind::Illuminate,
            Job::Mesh { .. } => JobKind::Mesh,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobKind {
    Generate,
    Illuminate,
    Mesh,
}

pub enum JobOut {
    Generated {
        handle: ChunkHandle,
        buf: VoxelBuf,
        t_ms: u32,
    },
    Illuminated {
        column: ColumnCoord,
        bufs: Vec<VoxelBuf>,
        changed: Vec<ChunkCoord>,
        handles: HashMap<ChunkCoord, ChunkHandle>,
        t_ms: u32,
    },
    Meshed {
        handle: ChunkHandle,
        mesh: ChunkMesh,
        t_ms: u32,
    },
}

fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn process_job(job: Job, reg: &BlockRegistry, generator: &dyn TerrainGenerator) -> JobOut {
    let t0 = Instant::now();
    match job {
        Job::Generate { handle, mut buf } => {
            generator.generate(&mut buf);
            JobOut::Generated {
                handle,
                buf,
                t_ms: elapsed_ms(t0),
            }
        }
        Job::Illuminate {
            mut cluster,
            handles,
        } => {
            illuminate_column(&mut cluster, reg);
            let column = cluster.column();
            let (bufs, changed) = cluster.into_parts();
            JobOut::Illuminated {
                column,
                bufs,
                changed: changed.into_iter().collect(),
                handles,
                t_ms: elapsed_ms(t0),
            }
        }
        Job::Mesh { handle, nb } => {
            let mesh = build_chunk_mesh(&nb, reg);
            JobOut::Meshed {
                handle,
                mesh,
                t_ms: elapsed_ms(t0),
            }
        }
    }
}

/// Worker pool fed through an unbounded job channel; results come back on a
/// second channel and are polled with [`Runtime::drain_worker_results`].
///
/// With zero workers every job runs on the submitting thread and its result is
/// queued for the next drain.
pub struct Runtime {
    job_tx: Option<Sender<Job>>,
    res_tx: Sender<JobOut>,
    res_rx: Receiver<JobOut>,
    _pool: Option<Arc<ThreadPool>>,
    reg: Arc<BlockRegistry>,
    generator: Arc<dyn TerrainGenerator>,
    q: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    workers: usize,
}

impl Runtime {
    pub fn new(
        workers: usize,
        reg: Arc<BlockRegistry>,
        generator: Arc<dyn TerrainGenerator>,
    ) -> Result<Self, RuntimeError> {
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let q_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_ctr = Arc::new(AtomicUsize::new(0));

        let (job_tx, pool) = if workers > 0 {
            let (job_tx, job_rx) = unbounded::<Job>();
            let pool = Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("lode-worker-{i}"))
                    .build()?,
            );
            for _ in 0..workers {
                let rx = job_rx.clone();
                let tx = res_tx.clone();
                let reg = reg.clone();
                let generator = generator.clone();
                let q = q_ctr.clone();
                let inflight = inflight_ctr.clone();
                pool.spawn(move || {
                    while let Ok(job) = rx.recv() {
                        q.fetch_sub(1, Ordering::Relaxed);
                        inflight.fetch_add(1, Ordering::Relaxed);
                        let out = process_job(job, reg.as_ref(), generator.as_ref());
                        let _ = tx.send(out);
                        inflight.fetch_sub(1, Ordering::Relaxed);
                    }
                });
            }
            (Some(job_tx), Some(pool))
        } else {
            (None, None)
        };
        log::info!(target: "runtime", "worker pool ready: {workers} workers");

        Ok(Self {
            job_tx,
            res_tx,
            res_rx,
            _pool: pool,
            reg,
            generator,
            q: q_ctr,
            inflight: inflight_ctr,
            workers,
        })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues a job. Returns it back if the pool has shut down.
    pub fn submit(&self, job: Job) -> Result<(), Job> {
        log::trace!(target: "runtime", "submit {:?}", job.kind());
        let Some(tx) = &self.job_tx else {
            let out = process_job(job, self.reg.as_ref(), self.generator.as_ref());
            let _ = self.res_tx.send(out);
            return Ok(());
        };
        self.q.fetch_add(1, Ordering::Relaxed);
        tx.send(job).map_err(|e| {
            self.q.fetch_sub(1, Ordering::Relaxed);
            e.into_inner()
        })
    }

    pub fn drain_worker_results(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    /// `(queued, running)` job counts.
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.q.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }
}
