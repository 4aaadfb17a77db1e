use std::collections::HashMap;

use quadcraft_core::lattice::{face_neighbors, LatticeCoord};
use quadcraft_core::math::coord_to_chunk;
use quadcraft_core::types::{Cell, ChunkCoord};

use crate::occupancy::{NeighborState, OccupancySource};
use crate::store::CellStore;

/// Owned copy of one chunk plus the occupancy of every face neighbor that
/// lies outside it. Background mesh jobs work from a snapshot so they never
/// read the live store.
#[derive(Debug, Clone)]
pub struct NeighborSnapshot {
    pub chunk: ChunkCoord,
    pub extent: i32,
    /// Chunk revision at capture time.
    pub revision: u64,
    /// Load epoch of the chunk at capture time.
    pub epoch: u64,
    own: HashMap<LatticeCoord, Cell>,
    border: HashMap<LatticeCoord, NeighborState>,
}

impl NeighborSnapshot {
    /// Capture `chunk` from `store`. Returns None if it is not loaded.
    pub fn capture(store: &CellStore, chunk: ChunkCoord) -> Option<Self> {
        let source = store.chunk(&chunk)?;
        let extent = store.extent();
        let own: HashMap<LatticeCoord, Cell> = source.iter().map(|(k, v)| (*k, *v)).collect();

        let mut border = HashMap::new();
        for coord in own.keys() {
            for neighbor in face_neighbors(coord) {
                if coord_to_chunk(&neighbor, extent) != chunk {
                    border
                        .entry(neighbor)
                        .or_insert_with(|| store.query(&neighbor));
                }
            }
        }

        Some(Self {
            chunk,
            extent,
            revision: source.revision(),
            epoch: store.epoch(&chunk)?,
            own,
            border,
        })
    }

    /// Cells of the captured chunk in key order.
    pub fn sorted_cells(&self) -> Vec<(LatticeCoord, Cell)> {
        let mut cells: Vec<(LatticeCoord, Cell)> = self.own.iter().map(|(k, v)| (*k, *v)).collect();
        cells.sort_by_key(|(k, _)| *k);
        cells
    }

    pub fn len(&self) -> usize {
        self.own.len()
    }

    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }
}

impl OccupancySource for NeighborSnapshot {
    fn query(&self, coord: &LatticeCoord) -> NeighborState {
        if let Some(cell) = self.own.get(coord) {
            return NeighborState::Occupied(*cell);
        }
        if let Some(state) = self.border.get(coord) {
            return *state;
        }
        if coord_to_chunk(coord, self.extent) == self.chunk {
            NeighborState::Empty
        } else {
            NeighborState::Unavailable
        }
    }
}
