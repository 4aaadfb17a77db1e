use std::collections::HashMap;

use quadcraft_core::types::ChunkCoord;
use quadcraft_world::CellStore;

use crate::error::UploadError;
use crate::mesh::{Mesh, MeshOutcome};
use crate::mesher::{mesh_chunk, MeshContext};

/// Receiver of generated meshes, typically a GPU buffer allocator.
///
/// A handle is released exactly once: before a replacement is bound, on
/// eviction, or when the cache is cleared. Regeneration detaches the old
/// handle immediately, so it is never returned for a newer mesh.
pub trait MeshConsumer {
    type Handle;

    fn upload(&mut self, chunk: ChunkCoord, mesh: &Mesh) -> Result<Self::Handle, UploadError>;
    fn release(&mut self, handle: Self::Handle);
}

#[derive(Debug)]
struct CachedMesh<H> {
    outcome: MeshOutcome,
    /// Chunk revision the mesh was built from.
    revision: u64,
    handle: Option<H>,
    /// Revision of the mesh currently bound to `handle`.
    uploaded: Option<u64>,
}

/// Outcome of [`ChunkMeshCache::sync_uploads`].
#[derive(Debug, Default)]
pub struct SyncReport {
    pub uploaded: usize,
    pub released: usize,
    pub failed: Vec<UploadError>,
}

/// Per-chunk meshes, the revision each was built from, and the consumer
/// handle bound to it.
#[derive(Debug)]
pub struct ChunkMeshCache<H> {
    entries: HashMap<ChunkCoord, CachedMesh<H>>,
    /// Handles detached by regeneration, awaiting release.
    retired: Vec<H>,
}

impl<H> Default for ChunkMeshCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ChunkMeshCache<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            retired: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.entries.contains_key(coord)
    }

    /// Cached mesh without regenerating.
    pub fn get(&self, coord: &ChunkCoord) -> Option<&MeshOutcome> {
        self.entries.get(coord).map(|e| &e.outcome)
    }

    /// Revision the cached mesh was built from.
    pub fn revision(&self, coord: &ChunkCoord) -> Option<u64> {
        self.entries.get(coord).map(|e| e.revision)
    }

    /// Handle bound to the current mesh. None while the mesh is newer
    /// than its last upload.
    pub fn handle(&self, coord: &ChunkCoord) -> Option<&H> {
        let entry = self.entries.get(coord)?;
        if entry.uploaded != Some(entry.revision) {
            return None;
        }
        entry.handle.as_ref()
    }

    /// Detached handles not yet handed back to a consumer.
    pub fn pending_releases(&self) -> usize {
        self.retired.len()
    }

    /// Release every handle detached by regeneration.
    pub fn release_retired<C>(&mut self, consumer: &mut C) -> usize
    where
        C: MeshConsumer<Handle = H>,
    {
        let count = self.retired.len();
        for handle in self.retired.drain(..) {
            consumer.release(handle);
        }
        count
    }

    /// Current mesh for a chunk, regenerating it if the chunk changed since
    /// it was last built. None if the chunk is not loaded.
    pub fn mesh(
        &mut self,
        coord: ChunkCoord,
        store: &mut CellStore,
        ctx: &MeshContext,
    ) -> Option<&MeshOutcome> {
        let chunk = store.chunk(&coord)?;
        let revision = chunk.revision();
        let fresh = !chunk.is_dirty() && self.revision(&coord) == Some(revision);
        if !fresh {
            let outcome = mesh_chunk(store, coord, ctx);
            self.install(coord, outcome, revision, store);
        }
        self.get(&coord)
    }

    /// Store a mesh built from `revision` of `coord`. The chunk is marked
    /// clean only if nothing changed while the mesh was built. Any handle
    /// bound to the replaced mesh is detached for release. Returns false
    /// and drops the mesh if the chunk is no longer loaded.
    pub fn install(
        &mut self,
        coord: ChunkCoord,
        outcome: MeshOutcome,
        revision: u64,
        store: &mut CellStore,
    ) -> bool {
        let Some(chunk) = store.chunk_mut(&coord) else {
            return false;
        };
        chunk.mark_clean(revision);
        match self.entries.get_mut(&coord) {
            Some(entry) => {
                if let Some(old) = entry.handle.take() {
                    self.retired.push(old);
                }
                entry.outcome = outcome;
                entry.revision = revision;
                entry.uploaded = None;
            }
            None => {
                self.entries.insert(
                    coord,
                    CachedMesh {
                        outcome,
                        revision,
                        handle: None,
                        uploaded: None,
                    },
                );
            }
        }
        true
    }

    /// Chunks whose bound handle does not match their current mesh.
    pub fn stale_uploads(&self) -> Vec<ChunkCoord> {
        let mut stale: Vec<ChunkCoord> = self
            .entries
            .iter()
            .filter(|(_, e)| e.uploaded != Some(e.revision))
            .map(|(c, _)| *c)
            .collect();
        stale.sort_by_key(|c| c.to_array());
        stale
    }

    /// Upload every mesh whose handle is stale. Detached handles are
    /// released before any replacement is bound. Empty meshes are not
    /// uploaded. Failures leave the chunk unbound and are reported.
    pub fn sync_uploads<C>(&mut self, consumer: &mut C) -> SyncReport
    where
        C: MeshConsumer<Handle = H>,
    {
        let mut report = SyncReport {
            released: self.release_retired(consumer),
            ..SyncReport::default()
        };
        for coord in self.stale_uploads() {
            let Some(entry) = self.entries.get_mut(&coord) else {
                continue;
            };
            if let Some(old) = entry.handle.take() {
                consumer.release(old);
                report.released += 1;
            }
            if entry.outcome.mesh.is_empty() {
                entry.uploaded = Some(entry.revision);
                continue;
            }
            match consumer.upload(coord, &entry.outcome.mesh) {
                Ok(handle) => {
                    entry.handle = Some(handle);
                    entry.uploaded = Some(entry.revision);
                    report.uploaded += 1;
                }
                Err(e) => {
                    log::warn!("{e}");
                    entry.uploaded = None;
                    report.failed.push(e);
                }
            }
        }
        report
    }

    /// Forget a chunk's mesh and release its handle.
    pub fn evict<C>(&mut self, coord: &ChunkCoord, consumer: &mut C) -> bool
    where
        C: MeshConsumer<Handle = H>,
    {
        let Some(entry) = self.entries.remove(coord) else {
            return false;
        };
        self.release_retired(consumer);
        if let Some(handle) = entry.handle {
            consumer.release(handle);
        }
        log::debug!("mesh for chunk {coord} evicted");
        true
    }

    /// Evict every entry whose chunk is no longer loaded in `store`.
    pub fn evict_unloaded<C>(&mut self, store: &CellStore, consumer: &mut C) -> usize
    where
        C: MeshConsumer<Handle = H>,
    {
        let gone: Vec<ChunkCoord> = self
            .entries
            .keys()
            .filter(|c| !store.is_loaded(c))
            .copied()
            .collect();
        for coord in &gone {
            self.evict(coord, consumer);
        }
        gone.len()
    }

    /// Release every handle and empty the cache.
    pub fn clear<C>(&mut self, consumer: &mut C)
    where
        C: MeshConsumer<Handle = H>,
    {
        self.release_retired(consumer);
        for (_, entry) in self.entries.drain() {
            if let Some(handle) = entry.handle {
                consumer.release(handle);
            }
        }
    }
}
