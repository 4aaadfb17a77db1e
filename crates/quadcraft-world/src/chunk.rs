use std::collections::HashMap;

use quadcraft_core::lattice::LatticeCoord;
use quadcraft_core::types::{Cell, ChunkCoord};

/// Mesh freshness of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Cells or boundary neighbors changed since the last mesh.
    Dirty,
    /// The last generated mesh reflects the current revision.
    Clean,
}

/// One fixed-extent partition of lattice space and the cells inside it.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk coordinate in chunk-space.
    pub coord: ChunkCoord,
    cells: HashMap<LatticeCoord, Cell>,
    state: ChunkState,
    /// Bumped on every change that can affect this chunk's mesh.
    revision: u64,
}

impl Chunk {
    /// New chunks start dirty so their first mesh request builds one.
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            cells: HashMap::new(),
            state: ChunkState::Dirty,
            revision: 0,
        }
    }

    pub fn get(&self, coord: &LatticeCoord) -> Option<&Cell> {
        self.cells.get(coord)
    }

    /// Store a cell. Returns true if the stored data changed.
    pub fn insert(&mut self, coord: LatticeCoord, cell: Cell) -> bool {
        let changed = self.cells.insert(coord, cell) != Some(cell);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Remove a cell, returning it if it was present.
    pub fn remove(&mut self, coord: &LatticeCoord) -> Option<Cell> {
        let removed = self.cells.remove(coord);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LatticeCoord, &Cell)> {
        self.cells.iter()
    }

    /// Cells in key order, for deterministic traversal.
    pub fn sorted_cells(&self) -> Vec<(LatticeCoord, Cell)> {
        let mut cells: Vec<(LatticeCoord, Cell)> =
            self.cells.iter().map(|(k, v)| (*k, *v)).collect();
        cells.sort_by_key(|(k, _)| *k);
        cells
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == ChunkState::Dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Invalidate the cached mesh.
    pub fn mark_dirty(&mut self) {
        self.state = ChunkState::Dirty;
        self.revision += 1;
    }

    /// Record that a mesh for `revision` was installed. A stale revision
    /// leaves the chunk dirty.
    pub fn mark_clean(&mut self, revision: u64) -> bool {
        if revision == self.revision {
            self.state = ChunkState::Clean;
            true
        } else {
            false
        }
    }
}
