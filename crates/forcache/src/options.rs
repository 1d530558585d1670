use forcache_types::{BranchId, Version};
use serde::{Deserialize, Serialize};

/// Controls how reads see speculative branches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// If set, the named branch's overlay shadows confirmed state.
    pub branch: Option<BranchId>,
}

impl QueryOptions {
    /// Read confirmed state only.
    pub fn confirmed() -> Self {
        Self::default()
    }

    /// Read through `branch`'s overlay, falling back to confirmed state.
    pub fn branch(branch: BranchId) -> Self {
        Self {
            branch: Some(branch),
        }
    }
}

/// Point-in-time counters for a cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub version: Version,
    pub confirmed_keys: usize,
    pub active_branches: usize,
}
