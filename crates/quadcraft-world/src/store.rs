use std::collections::HashMap;

use quadcraft_core::config::CoreConfig;
use quadcraft_core::lattice::{face_neighbors, LatticeCoord};
use quadcraft_core::math::coord_to_chunk;
use quadcraft_core::types::{Cell, ChunkCoord};

use crate::chunk::Chunk;
use crate::error::StoreError;
use crate::occupancy::{NeighborState, OccupancySource};

/// Sparse map from lattice coordinates to cells, partitioned into chunks.
///
/// Absent coordinates are empty. Every mutation dirties the owning chunk
/// and any loaded chunk holding one of the cell's face neighbors, since
/// those chunks' boundary faces may change.
///
/// Chunks stay loaded until the caller unloads them, even once empty;
/// [`CellStore::prune_empty`] releases the empty ones in one pass.
#[derive(Debug)]
pub struct CellStore {
    extent: i32,
    chunks: HashMap<ChunkCoord, Chunk>,
    /// Load epoch of each loaded chunk. Every load draws a fresh value, so
    /// background results built before an unload never match again.
    epochs: HashMap<ChunkCoord, u64>,
    next_epoch: u64,
}

impl CellStore {
    pub fn new(config: &CoreConfig) -> Result<Self, StoreError> {
        Self::with_extent(config.chunk_extent)
    }

    pub fn with_extent(extent: i32) -> Result<Self, StoreError> {
        if extent <= 0 {
            return Err(StoreError::InvalidChunkExtent(extent));
        }
        Ok(Self {
            extent,
            chunks: HashMap::new(),
            epochs: HashMap::new(),
            next_epoch: 0,
        })
    }

    pub fn extent(&self) -> i32 {
        self.extent
    }

    /// Chunk that owns `coord`.
    pub fn chunk_of(&self, coord: &LatticeCoord) -> ChunkCoord {
        coord_to_chunk(coord, self.extent)
    }

    /// Load an empty chunk, or return the existing one.
    pub fn load_chunk(&mut self, coord: ChunkCoord) -> &mut Chunk {
        if !self.chunks.contains_key(&coord) {
            self.epochs.insert(coord, self.next_epoch);
            self.next_epoch += 1;
            log::debug!("chunk {coord} loaded");
        }
        self.chunks.entry(coord).or_insert_with(|| Chunk::new(coord))
    }

    /// Evict a chunk and hand it back to the caller. Any mesh job in
    /// flight for it becomes stale, and loaded chunks whose cells touch it
    /// are dirtied: their boundary faces now border unavailable space.
    pub fn unload_chunk(&mut self, coord: &ChunkCoord) -> Option<Chunk> {
        let chunk = self.chunks.remove(coord)?;
        self.epochs.remove(coord);
        let mut touched: Vec<ChunkCoord> = chunk
            .iter()
            .flat_map(|(cell, _)| self.boundary_chunks(cell, *coord))
            .collect();
        touched.sort_by_key(|c| c.to_array());
        touched.dedup();
        for neighbor in &touched {
            if let Some(other) = self.chunks.get_mut(neighbor) {
                other.mark_dirty();
            }
        }
        log::debug!(
            "chunk {coord} unloaded ({} cells, {} neighbors dirtied)",
            chunk.len(),
            touched.len()
        );
        Some(chunk)
    }

    /// Unload every empty chunk, returning their coordinates in order.
    pub fn prune_empty(&mut self) -> Vec<ChunkCoord> {
        let mut empty: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(_, c)| c.is_empty())
            .map(|(coord, _)| *coord)
            .collect();
        empty.sort_by_key(|c| c.to_array());
        for coord in &empty {
            self.unload_chunk(coord);
        }
        empty
    }

    pub fn is_loaded(&self, coord: &ChunkCoord) -> bool {
        self.chunks.contains_key(coord)
    }

    /// Load epoch of a loaded chunk.
    pub fn epoch(&self, coord: &ChunkCoord) -> Option<u64> {
        self.epochs.get(coord).copied()
    }

    pub fn chunk(&self, coord: &ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(coord)
    }

    pub fn chunk_mut(&mut self, coord: &ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(coord)
    }

    pub fn get(&self, coord: &LatticeCoord) -> Option<&Cell> {
        self.chunks.get(&self.chunk_of(coord))?.get(coord)
    }

    pub fn is_occupied(&self, coord: &LatticeCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Occupy `coord`. Air is a clear. Loads the owning chunk on demand.
    /// Returns true if stored data changed.
    pub fn set_cell(&mut self, coord: LatticeCoord, cell: Cell) -> bool {
        if cell.is_air() {
            return self.clear_cell(&coord).is_some();
        }
        let owner = self.chunk_of(&coord);
        let changed = self.load_chunk(owner).insert(coord, cell);
        if changed {
            self.dirty_boundary_neighbors(&coord, owner);
        }
        changed
    }

    /// Empty `coord`, returning the previous cell.
    pub fn clear_cell(&mut self, coord: &LatticeCoord) -> Option<Cell> {
        let owner = self.chunk_of(coord);
        let removed = self.chunks.get_mut(&owner)?.remove(coord);
        if removed.is_some() {
            self.dirty_boundary_neighbors(coord, owner);
        }
        removed
    }

    /// Loaded chunks other than `owner` that contain a face neighbor of `coord`.
    pub fn boundary_chunks(&self, coord: &LatticeCoord, owner: ChunkCoord) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = face_neighbors(coord)
            .iter()
            .map(|n| self.chunk_of(n))
            .filter(|c| *c != owner && self.chunks.contains_key(c))
            .collect();
        out.sort_by_key(|c| c.to_array());
        out.dedup();
        out
    }

    fn dirty_boundary_neighbors(&mut self, coord: &LatticeCoord, owner: ChunkCoord) {
        for neighbor in self.boundary_chunks(coord, owner) {
            if let Some(chunk) = self.chunks.get_mut(&neighbor) {
                chunk.mark_dirty();
            }
        }
    }

    /// Iterator over all loaded chunks.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    /// Dirty chunk coordinates in a stable order.
    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        let mut dirty: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(_, c)| c.is_dirty())
            .map(|(coord, _)| *coord)
            .collect();
        dirty.sort_by_key(|c| c.to_array());
        dirty
    }

    /// Dirty chunks with the revision each was taken at, marking them clean.
    /// A later mutation dirties them again.
    pub fn take_dirty(&mut self) -> Vec<(ChunkCoord, u64)> {
        let dirty = self.dirty_chunks();
        let mut taken = Vec::with_capacity(dirty.len());
        for coord in dirty {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                let revision = chunk.revision();
                chunk.mark_clean(revision);
                taken.push((coord, revision));
            }
        }
        taken
    }

    /// Number of loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total occupied cells across loaded chunks.
    pub fn cell_count(&self) -> usize {
        self.chunks.values().map(|c| c.len()).sum()
    }
}

impl OccupancySource for CellStore {
    fn query(&self, coord: &LatticeCoord) -> NeighborState {
        match self.chunks.get(&self.chunk_of(coord)) {
            None => NeighborState::Unavailable,
            Some(chunk) => match chunk.get(coord) {
                Some(cell) => NeighborState::Occupied(*cell),
                None => NeighborState::Empty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use quadcraft_core::types::MaterialId;

    fn stone() -> Cell {
        Cell::new(MaterialId(1))
    }

    #[test]
    fn test_invalid_extent_rejected() {
        assert_eq!(
            CellStore::with_extent(0).unwrap_err(),
            StoreError::InvalidChunkExtent(0)
        );
        assert!(CellStore::with_extent(-3).is_err());
        assert!(CellStore::new(&CoreConfig::default()).is_ok());
    }

    #[test]
    fn test_set_get_clear() {
        let mut store = CellStore::with_extent(8).expect("valid extent");
        let c = LatticeCoord::new(2, 1, 0, 1);
        assert!(!store.is_occupied(&c));
        assert!(store.set_cell(c, stone()));
        assert_eq!(store.get(&c), Some(&stone()));
        // Same position under a different representation.
        assert!(store.is_occupied(&LatticeCoord::new(3, 2, 1, 2)));
        assert_eq!(store.cell_count(), 1);
        assert_eq!(store.clear_cell(&c), Some(stone()));
        assert!(!store.is_occupied(&c));
        assert_eq!(store.clear_cell(&c), None);
    }

    #[test]
    fn test_setting_air_clears() {
        let mut store = CellStore::with_extent(8).expect("valid extent");
        let c = LatticeCoord::ORIGIN;
        store.set_cell(c, stone());
        assert!(store.set_cell(c, Cell::new(MaterialId::AIR)));
        assert!(!store.is_occupied(&c));
    }

    #[test]
    fn test_query_states() {
        let mut store = CellStore::with_extent(8).expect("valid extent");
        let c = LatticeCoord::ORIGIN;
        assert_eq!(store.query(&c), NeighborState::Unavailable);
        store.set_cell(c, stone());
        assert_eq!(store.query(&c), NeighborState::Occupied(stone()));
        let empty = LatticeCoord::new(1, 0, 0, 0);
        assert_eq!(store.query(&empty), NeighborState::Empty);
    }

    #[test]
    fn test_mutation_dirties_boundary_chunk() {
        let mut store = CellStore::with_extent(2).expect("valid extent");
        // Origin sits at lattice point (0,0,0); its face neighbor (0,1,1,1)
        // sits at (-1,-1,-1), which is in chunk (-1,-1,-1).
        let c = LatticeCoord::ORIGIN;
        let neighbor_chunk = store.chunk_of(&LatticeCoord::new(0, 1, 1, 1));
        assert_eq!(neighbor_chunk, IVec3::new(-1, -1, -1));
        store.load_chunk(neighbor_chunk);
        let rev = store.chunk(&neighbor_chunk).expect("loaded").revision();
        store.chunk_mut(&neighbor_chunk).expect("loaded").mark_clean(rev);

        store.set_cell(c, stone());
        assert!(store.chunk(&neighbor_chunk).expect("loaded").is_dirty());
        assert!(store.boundary_chunks(&c, store.chunk_of(&c)).contains(&neighbor_chunk));
    }

    #[test]
    fn test_unchanged_write_dirties_nothing() {
        let mut store = CellStore::with_extent(8).expect("valid extent");
        let c = LatticeCoord::ORIGIN;
        store.set_cell(c, stone());
        let owner = store.chunk_of(&c);
        let rev = store.chunk(&owner).expect("loaded").revision();
        store.chunk_mut(&owner).expect("loaded").mark_clean(rev);
        assert!(!store.set_cell(c, stone()));
        assert!(store.dirty_chunks().is_empty());
    }

    #[test]
    fn test_take_dirty_drains() {
        let mut store = CellStore::with_extent(8).expect("valid extent");
        store.set_cell(LatticeCoord::ORIGIN, stone());
        let taken = store.take_dirty();
        assert_eq!(taken.len(), 1);
        assert!(store.dirty_chunks().is_empty());
        assert!(store.take_dirty().is_empty());
        store.clear_cell(&LatticeCoord::ORIGIN);
        assert_eq!(store.dirty_chunks(), vec![taken[0].0]);
    }

    #[test]
    fn test_reload_draws_new_epoch() {
        let mut store = CellStore::with_extent(8).expect("valid extent");
        let c = LatticeCoord::ORIGIN;
        store.set_cell(c, stone());
        let owner = store.chunk_of(&c);
        let first = store.epoch(&owner).expect("loaded");
        let evicted = store.unload_chunk(&owner).expect("was loaded");
        assert_eq!(evicted.len(), 1);
        assert_eq!(store.epoch(&owner), None);
        assert!(!store.is_loaded(&owner));
        assert_eq!(store.query(&c), NeighborState::Unavailable);
        assert!(store.unload_chunk(&owner).is_none());

        store.load_chunk(owner);
        assert_ne!(store.epoch(&owner), Some(first));
    }

    #[test]
    fn test_unload_dirties_boundary_neighbors() {
        let mut store = CellStore::with_extent(1).expect("valid extent");
        let a = LatticeCoord::ORIGIN;
        let b = face_neighbors(&a)[0];
        store.set_cell(a, stone());
        store.set_cell(b, stone());
        let (ca, cb) = (store.chunk_of(&a), store.chunk_of(&b));
        store.take_dirty();

        store.unload_chunk(&cb);
        assert_eq!(store.dirty_chunks(), vec![ca]);
    }

    #[test]
    fn test_prune_empty_releases_cleared_chunks() {
        let mut store = CellStore::with_extent(1).expect("valid extent");
        let a = LatticeCoord::ORIGIN;
        let b = face_neighbors(&a)[0];
        store.set_cell(a, stone());
        store.set_cell(b, stone());
        store.clear_cell(&b);
        assert_eq!(store.loaded_count(), 2);

        let cb = store.chunk_of(&b);
        assert_eq!(store.prune_empty(), vec![cb]);
        assert_eq!(store.loaded_count(), 1);
        assert_eq!(store.epoch(&cb), None);
        assert!(store.prune_empty().is_empty());
    }

    #[test]
    fn test_chunks_never_span_partition() {
        let mut store = CellStore::with_extent(3).expect("valid extent");
        for raw in quadcraft_core::lattice::grid(4) {
            store.set_cell(LatticeCoord::from_array(raw), stone());
        }
        for (coord, chunk) in store.iter() {
            for (cell, _) in chunk.iter() {
                assert_eq!(store.chunk_of(cell), *coord);
            }
        }
    }
}
