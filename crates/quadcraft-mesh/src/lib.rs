//! Face-culled tetrahedral meshing of lattice chunks, with a per-chunk mesh
//! cache and a background scheduler.

pub mod cache;
pub mod error;
pub mod mesh;
pub mod mesher;
pub mod scheduler;
pub mod shading;
pub mod tetra;

pub use cache::{ChunkMeshCache, MeshConsumer, SyncReport};
pub use error::{SchedulerError, UploadError};
pub use mesh::{Mesh, MeshOutcome, Vertex};
pub use mesher::{mesh_cells, mesh_chunk, mesh_snapshot, MeshContext};
pub use scheduler::{mesh_all_dirty, CollectReport, MeshScheduler, RequestStatus};
