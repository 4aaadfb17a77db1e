use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use quadcraft_core::types::ChunkCoord;
use quadcraft_world::{CellStore, NeighborSnapshot};
use rayon::prelude::*;

use crate::cache::ChunkMeshCache;
use crate::error::SchedulerError;
use crate::mesh::MeshOutcome;
use crate::mesher::{mesh_chunk, mesh_snapshot, MeshContext};

struct MeshDone {
    chunk: ChunkCoord,
    epoch: u64,
    revision: u64,
    /// None if the job saw its cancel flag before meshing.
    outcome: Option<MeshOutcome>,
}

struct InFlight {
    cancel: Arc<AtomicBool>,
    /// Another request arrived while this job ran.
    follow_up: bool,
}

/// What [`MeshScheduler::request`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Spawned,
    /// A job is already running for the chunk; one follow-up is recorded.
    Coalesced,
    NotLoaded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub installed: usize,
    /// Results for chunks that were cancelled, unloaded or reloaded.
    pub discarded: usize,
    pub requeued: usize,
}

/// Background mesher. Jobs work from [`NeighborSnapshot`]s on a dedicated
/// rayon pool and report back over a channel; at most one job per chunk
/// is in flight.
pub struct MeshScheduler {
    pool: rayon::ThreadPool,
    tx_done: Sender<MeshDone>,
    rx_done: Receiver<MeshDone>,
    in_flight: HashMap<ChunkCoord, InFlight>,
}

impl MeshScheduler {
    /// `threads == 0` lets rayon pick from the available cores.
    pub fn new(threads: usize) -> Result<Self, SchedulerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mesh-worker-{i}"))
            .build()?;
        let (tx_done, rx_done) = unbounded();
        log::info!("mesh scheduler started with {} workers", pool.current_num_threads());
        Ok(Self {
            pool,
            tx_done,
            rx_done,
            in_flight: HashMap::new(),
        })
    }

    /// Number of chunks with a job in flight.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_pending(&self, chunk: &ChunkCoord) -> bool {
        self.in_flight.contains_key(chunk)
    }

    /// Queue a remesh of `chunk`. A second request while one is in flight
    /// is folded into a single follow-up.
    pub fn request(
        &mut self,
        chunk: ChunkCoord,
        store: &CellStore,
        ctx: &MeshContext,
    ) -> RequestStatus {
        if let Some(job) = self.in_flight.get_mut(&chunk) {
            job.follow_up = true;
            return RequestStatus::Coalesced;
        }
        let Some(snapshot) = NeighborSnapshot::capture(store, chunk) else {
            return RequestStatus::NotLoaded;
        };

        let cancel = Arc::new(AtomicBool::new(false));
        self.in_flight.insert(
            chunk,
            InFlight {
                cancel: cancel.clone(),
                follow_up: false,
            },
        );

        let tx_done = self.tx_done.clone();
        let ctx = ctx.clone();
        self.pool.spawn(move || {
            let outcome = if cancel.load(Ordering::Relaxed) {
                None
            } else {
                Some(mesh_snapshot(&snapshot, &ctx))
            };
            // The receiver lives as long as the scheduler.
            let _ = tx_done.send(MeshDone {
                chunk: snapshot.chunk,
                epoch: snapshot.epoch,
                revision: snapshot.revision,
                outcome,
            });
        });
        RequestStatus::Spawned
    }

    /// Cancel the in-flight job for `chunk` and drop any follow-up.
    pub fn cancel(&mut self, chunk: &ChunkCoord) -> bool {
        match self.in_flight.get_mut(chunk) {
            Some(job) => {
                job.cancel.store(true, Ordering::Relaxed);
                job.follow_up = false;
                true
            }
            None => false,
        }
    }

    /// Install every finished result that is still valid. Non-blocking.
    pub fn collect<H>(
        &mut self,
        store: &mut CellStore,
        cache: &mut ChunkMeshCache<H>,
        ctx: &MeshContext,
    ) -> CollectReport {
        let mut report = CollectReport::default();
        while let Ok(done) = self.rx_done.try_recv() {
            self.handle_done(done, store, cache, ctx, &mut report);
        }
        report
    }

    /// Block until every in-flight job, including follow-ups, has been
    /// collected.
    pub fn finish<H>(
        &mut self,
        store: &mut CellStore,
        cache: &mut ChunkMeshCache<H>,
        ctx: &MeshContext,
    ) -> CollectReport {
        let mut report = CollectReport::default();
        while !self.in_flight.is_empty() {
            match self.rx_done.recv() {
                Ok(done) => self.handle_done(done, store, cache, ctx, &mut report),
                Err(_) => break,
            }
        }
        report
    }

    fn handle_done<H>(
        &mut self,
        done: MeshDone,
        store: &mut CellStore,
        cache: &mut ChunkMeshCache<H>,
        ctx: &MeshContext,
        report: &mut CollectReport,
    ) {
        let job = self.in_flight.remove(&done.chunk);
        let cancelled = job.as_ref().map_or(true, |j| j.cancel.load(Ordering::Relaxed));
        let current = store.epoch(&done.chunk) == Some(done.epoch);

        match done.outcome {
            Some(outcome) if !cancelled && current => {
                cache.install(done.chunk, outcome, done.revision, store);
                report.installed += 1;
            }
            _ => {
                log::debug!("discarded mesh for chunk {} (cancelled: {cancelled})", done.chunk);
                report.discarded += 1;
            }
        }

        if job.is_some_and(|j| j.follow_up) && store.is_loaded(&done.chunk) {
            if self.request(done.chunk, store, ctx) == RequestStatus::Spawned {
                report.requeued += 1;
            }
        }
    }
}

/// Remesh every dirty chunk in parallel and install the results. Returns
/// the number of chunks remeshed.
pub fn mesh_all_dirty<H>(
    store: &mut CellStore,
    cache: &mut ChunkMeshCache<H>,
    ctx: &MeshContext,
) -> usize {
    let dirty = store.dirty_chunks();
    let shared: &CellStore = store;
    let results: Vec<(ChunkCoord, u64, MeshOutcome)> = dirty
        .par_iter()
        .filter_map(|coord| {
            let revision = shared.chunk(coord)?.revision();
            Some((*coord, revision, mesh_chunk(shared, *coord, ctx)))
        })
        .collect();

    let count = results.len();
    for (coord, revision, outcome) in results {
        cache.install(coord, outcome, revision, store);
    }
    log::debug!("remeshed {count} dirty chunks");
    count
}
