use std::time::Instant;

use quadcraft_core::config::CoreConfig;
use quadcraft_mesh::{mesh_all_dirty, ChunkMeshCache, MeshContext, MeshScheduler, SchedulerError};
use quadcraft_world::{CellStore, StoreError};

use crate::scenes::{generate_scene, SceneConfig};

/// Timing data for repeated remesh passes.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Mesh statistics for one chunk.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChunkStats {
    pub chunk: [i32; 3],
    pub cells: usize,
    pub faces: usize,
    pub culled: usize,
    pub truncated: bool,
}

/// Result of a single scene.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SceneResult {
    pub scene_name: String,
    pub cells: usize,
    pub chunk_count: usize,
    pub faces: usize,
    pub culled: usize,
    pub truncated_chunks: usize,
    /// Background meshes matched the synchronous ones for every chunk.
    pub scheduler_consistent: bool,
    pub timings: TimingSeries,
    pub chunks: Vec<ChunkStats>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Meshes check scenes with the full store/cache/scheduler stack.
pub struct CheckRunner {
    config: CoreConfig,
    ctx: MeshContext,
    iterations: u32,
    threads: usize,
}

impl CheckRunner {
    pub fn new(config: CoreConfig, iterations: u32, threads: usize) -> Self {
        Self {
            ctx: MeshContext::from_config(&config),
            config,
            iterations: iterations.max(1),
            threads,
        }
    }

    /// Populate a store with the scene, remesh it `iterations` times in
    /// parallel, then cross-check against the background scheduler.
    pub fn run_scene(&self, scene: &SceneConfig) -> Result<SceneResult, RunError> {
        log::info!("Running scene '{}' (radius {})...", scene.name, scene.radius);

        let mut store = CellStore::new(&self.config)?;
        let cells = generate_scene(scene);
        for (coord, cell) in &cells {
            store.set_cell(*coord, *cell);
        }
        let chunk_coords = store.dirty_chunks();
        log::info!("  Populated {} cells across {} chunks", cells.len(), chunk_coords.len());

        let mut cache: ChunkMeshCache<()> = ChunkMeshCache::new();
        let mut pass_times = Vec::with_capacity(self.iterations as usize);
        for _ in 0..self.iterations {
            for coord in &chunk_coords {
                if let Some(chunk) = store.chunk_mut(coord) {
                    chunk.mark_dirty();
                }
            }
            let start = Instant::now();
            mesh_all_dirty(&mut store, &mut cache, &self.ctx);
            pass_times.push(start.elapsed().as_secs_f64() * 1000.0);
        }

        let mut chunks = Vec::with_capacity(chunk_coords.len());
        for coord in &chunk_coords {
            let (Some(chunk), Some(outcome)) = (store.chunk(coord), cache.get(coord)) else {
                continue;
            };
            let stats = ChunkStats {
                chunk: coord.to_array(),
                cells: chunk.len(),
                faces: outcome.faces_emitted,
                culled: outcome.faces_culled,
                truncated: outcome.truncated,
            };
            log::debug!(
                "  chunk {coord}: {} cells, {} faces, {} culled{}",
                stats.cells,
                stats.faces,
                stats.culled,
                if stats.truncated { " (truncated)" } else { "" }
            );
            chunks.push(stats);
        }

        let scheduler_consistent = self.cross_check(&mut store, &cache, &chunk_coords)?;
        let timings = compute_timings(&pass_times);
        let result = SceneResult {
            scene_name: scene.name.clone(),
            cells: store.cell_count(),
            chunk_count: chunk_coords.len(),
            faces: chunks.iter().map(|c| c.faces).sum(),
            culled: chunks.iter().map(|c| c.culled).sum(),
            truncated_chunks: chunks.iter().filter(|c| c.truncated).count(),
            scheduler_consistent,
            timings,
            chunks,
        };
        log::info!(
            "  Done: {} faces ({} culled), mean={:.2}ms, p95={:.2}ms",
            result.faces,
            result.culled,
            result.timings.mean_ms,
            result.timings.p95_ms
        );
        Ok(result)
    }

    /// Remesh every chunk on the background scheduler and compare with the
    /// synchronous cache.
    fn cross_check(
        &self,
        store: &mut CellStore,
        reference: &ChunkMeshCache<()>,
        chunk_coords: &[quadcraft_core::types::ChunkCoord],
    ) -> Result<bool, RunError> {
        let mut sched = MeshScheduler::new(self.threads)?;
        let mut background: ChunkMeshCache<()> = ChunkMeshCache::new();
        for coord in chunk_coords {
            sched.request(*coord, store, &self.ctx);
        }
        sched.finish(store, &mut background, &self.ctx);

        let mut consistent = true;
        for coord in chunk_coords {
            if background.get(coord) != reference.get(coord) {
                log::warn!("  chunk {coord}: background mesh differs from synchronous mesh");
                consistent = false;
            }
        }
        Ok(consistent)
    }
}

/// Compute timing statistics from a list of pass times in milliseconds.
fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
