//! Error types for branch mutations.

use forcache_types::{BranchId, BranchState, TypeError};
use thiserror::Error;

/// Errors that can occur while mutating a branch record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BranchError {
    /// The branch no longer accepts writes.
    #[error("branch {id} is {state}, not pending")]
    NotPending { id: BranchId, state: BranchState },

    /// A lifecycle transition that would move a branch backwards.
    #[error(transparent)]
    Transition(#[from] TypeError),
}

/// Convenience type alias for branch operations.
pub type Result<T> = std::result::Result<T, BranchError>;
