/// Errors raised when constructing a cell store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid chunk extent {0} (must be positive)")]
    InvalidChunkExtent(i32),
}
