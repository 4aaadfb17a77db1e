use quadcraft_core::lattice::LatticeCoord;
use quadcraft_core::types::Cell;

/// What a neighbor lookup found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborState {
    /// Loaded and unoccupied.
    Empty,
    Occupied(Cell),
    /// The owning chunk is not loaded; meshing treats this as empty.
    Unavailable,
}

impl NeighborState {
    pub fn cell(&self) -> Option<&Cell> {
        match self {
            NeighborState::Occupied(cell) => Some(cell),
            _ => None,
        }
    }
}

/// Read-only occupancy capability the mesher uses for neighbor lookups,
/// including ones that cross chunk boundaries.
pub trait OccupancySource {
    fn query(&self, coord: &LatticeCoord) -> NeighborState;
}
