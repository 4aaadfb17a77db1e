use quadcraft_core::types::ChunkCoord;

/// Errors a [`crate::cache::MeshConsumer`] reports when it cannot take a mesh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("chunk {chunk}: mesh too large ({vertices} vertices, consumer accepts {capacity})")]
    TooLarge {
        chunk: ChunkCoord,
        vertices: usize,
        capacity: usize,
    },

    #[error("chunk {chunk}: upload rejected: {reason}")]
    Rejected { chunk: ChunkCoord, reason: String },
}

/// Errors raised while setting up background meshing.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("failed to build mesh worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
