use thiserror::Error;

use crate::branch::BranchState;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch id: {0}")]
    InvalidBranchId(String),

    #[error("invalid branch state transition: {from} -> {to}")]
    InvalidTransition { from: BranchState, to: BranchState },
}
