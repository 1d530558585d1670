use forcache_types::Version;

/// Errors from confirmed store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The admission check refused the store's current version. Nothing was
    /// applied.
    #[error("overlay refused at version {current}")]
    Rejected { current: Version },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
