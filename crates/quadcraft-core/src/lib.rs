//! Coordinate engine and lattice tables shared by every QuadCraft consumer.

pub mod config;
pub mod constants;
pub mod error;
pub mod integrity;
pub mod lattice;
pub mod material;
pub mod math;
pub mod quadray;
pub mod synergetics;
pub mod types;

pub use config::{CoreConfig, MeshLimits};
pub use error::{ConfigError, CoordError, CoreError};
pub use integrity::{require_integrity, verify_integrity, IntegrityReport};
pub use lattice::{cell_parity, Adjacency, CellParity, LatticeCoord};
pub use material::{MaterialRegistry, MaterialTable};
pub use quadray::Quadray;
pub use synergetics::{IvmGrid, Jitterbug, Polyhedron};
pub use types::{Cell, ChunkCoord, MaterialId, Orientation};
