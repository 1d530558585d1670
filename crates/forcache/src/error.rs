use forcache_branch::BranchError;
use forcache_merge::MergeError;
use forcache_types::{BranchId, BranchState, Version};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    #[error("branch {branch} rejected: version conflict (base {base}, current {current})")]
    Conflict {
        branch: BranchId,
        base: Version,
        current: Version,
    },

    #[error("branch {id} is {state}, not pending")]
    BranchClosed { id: BranchId, state: BranchState },

    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Key or branch absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_) | Self::BranchNotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<BranchError> for CacheError {
    fn from(err: BranchError) -> Self {
        match err {
            BranchError::NotPending { id, state } => Self::BranchClosed { id, state },
            BranchError::Transition(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<MergeError> for CacheError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::BranchNotFound(id) => Self::BranchNotFound(id),
            MergeError::Conflict {
                branch,
                base,
                current,
            } => Self::Conflict {
                branch,
                base,
                current,
            },
            MergeError::Branch(e) => e.into(),
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
