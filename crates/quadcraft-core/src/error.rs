use thiserror::Error;

/// Errors raised at the coordinate API boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("non-finite quadray component: ({0}, {1}, {2}, {3})")]
    NonFinite(f64, f64, f64, f64),

    #[error("non-finite Cartesian component: ({0}, {1}, {2})")]
    NonFiniteCartesian(f64, f64, f64),

    #[error("lattice component {value} outside 0..={limit} after normalization")]
    OutOfRange { value: f64, limit: i32 },

    #[error("malformed lattice key '{0}' (expected \"a,b,c,d\" integers)")]
    MalformedKey(String),
}

/// Errors loading data-driven configuration (RON).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse materials RON: {0}")]
    MaterialParseError(String),

    #[error("Failed to parse core config RON: {0}")]
    ConfigParseError(String),

    #[error("invalid chunk extent {0} (must be positive)")]
    InvalidChunkExtent(i32),

    #[error("invalid mesh limits: {max_vertices} vertices / {max_indices} indices")]
    InvalidMeshLimits {
        max_vertices: usize,
        max_indices: usize,
    },
}

/// Top-level error for consumers that treat the core as a precondition.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("lattice integrity check failed: {failed} of {total} checks failed")]
    Integrity { failed: usize, total: usize },
}
