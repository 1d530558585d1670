//! The [`SpeculativeStore`] trait defining the branch registry interface.

use forcache_types::{BranchId, Overlay, Version};

use crate::types::BranchHandle;

/// Registry of live branches.
///
/// Membership operations never fail. Implementations must be thread-safe and
/// must never hold the registry lock while waiting on a branch record's lock;
/// callers are allowed to lock a record first and then query the registry.
pub trait SpeculativeStore<V>: Send + Sync {
    /// Register a new pending branch seeded with `overlay` and return it.
    fn create_branch_with(&self, base: Version, overlay: Overlay<V>) -> BranchHandle<V>;

    /// Register a new pending branch with an empty overlay.
    fn create_branch(&self, base: Version) -> BranchHandle<V> {
        self.create_branch_with(base, Overlay::new())
    }

    /// Look up a live branch.
    fn get_branch(&self, id: &BranchId) -> Option<BranchHandle<V>>;

    /// Remove a branch from the active set.
    ///
    /// Returns `true` if the branch was registered, `false` if it was already
    /// gone.
    fn delete_branch(&self, id: &BranchId) -> bool;

    /// Returns `true` if the branch is still registered.
    fn contains(&self, id: &BranchId) -> bool {
        self.get_branch(id).is_some()
    }

    /// Ids of all live branches, sorted.
    fn branch_ids(&self) -> Vec<BranchId>;

    /// Number of live branches.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
