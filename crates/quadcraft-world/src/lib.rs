//! Sparse cell storage for the quadray lattice, partitioned into chunks
//! with dirty tracking and neighbor-aware snapshots for meshing.

pub mod chunk;
pub mod error;
pub mod occupancy;
pub mod snapshot;
pub mod store;

pub use chunk::{Chunk, ChunkState};
pub use error::StoreError;
pub use occupancy::{NeighborState, OccupancySource};
pub use snapshot::NeighborSnapshot;
pub use store::CellStore;
