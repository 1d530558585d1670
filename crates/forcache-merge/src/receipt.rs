use forcache_types::{BranchId, BranchState, Version};
use serde::{Deserialize, Serialize};

/// Record of a successful commit.
///
/// The branch is already retired when this is returned; the receipt is the
/// only place its terminal state survives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub branch: BranchId,
    pub base_version: Version,
    /// Keys applied, in application order.
    pub applied_keys: Vec<String>,
    /// Confirmed version after the last applied key.
    pub new_version: Version,
    pub state: BranchState,
}

/// Record of a successful rollback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReceipt {
    pub branch: BranchId,
    pub base_version: Version,
    pub discarded_keys: Vec<String>,
    pub state: BranchState,
}
