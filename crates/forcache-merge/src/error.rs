use forcache_branch::BranchError;
use forcache_types::{BranchId, Version};
use thiserror::Error;

/// Errors from commit and rollback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The branch never existed or has already been retired. The two cases
    /// are indistinguishable.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    /// The policy refused the branch's base version.
    #[error("branch {branch} rejected: version conflict (base {base}, current {current})")]
    Conflict {
        branch: BranchId,
        base: Version,
        current: Version,
    },

    #[error("branch state error: {0}")]
    Branch(#[from] BranchError),
}

impl MergeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BranchNotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type MergeResult<T> = Result<T, MergeError>;
