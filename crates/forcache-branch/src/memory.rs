//! In-memory branch registry.
//!
//! [`InMemorySpeculativeStore`] keeps every live branch in a `HashMap`
//! protected by a `RwLock`. Lookups take the shared lock; create and delete
//! take the exclusive lock. Record contents are guarded separately by each
//! [`BranchHandle`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use forcache_types::{BranchId, Overlay, Version};
use tracing::debug;

use crate::traits::SpeculativeStore;
use crate::types::{Branch, BranchHandle};

/// An in-memory implementation of [`SpeculativeStore`].
///
/// Branches that are never committed or rolled back stay registered for the
/// life of the store.
pub struct InMemorySpeculativeStore<V> {
    branches: RwLock<HashMap<BranchId, BranchHandle<V>>>,
}

impl<V> InMemorySpeculativeStore<V> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            branches: RwLock::new(HashMap::new()),
        }
    }

    fn registry(&self) -> RwLockReadGuard<'_, HashMap<BranchId, BranchHandle<V>>> {
        self.branches.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, HashMap<BranchId, BranchHandle<V>>> {
        self.branches.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> Default for InMemorySpeculativeStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Send> SpeculativeStore<V> for InMemorySpeculativeStore<V> {
    fn create_branch_with(&self, base: Version, overlay: Overlay<V>) -> BranchHandle<V> {
        let handle = BranchHandle::new(Branch::with_overlay(base, overlay));
        self.registry_mut()
            .insert(handle.id().clone(), handle.clone());
        debug!(branch = %handle.id(), %base, "branch created");
        handle
    }

    fn get_branch(&self, id: &BranchId) -> Option<BranchHandle<V>> {
        self.registry().get(id).cloned()
    }

    fn delete_branch(&self, id: &BranchId) -> bool {
        let removed = self.registry_mut().remove(id).is_some();
        if removed {
            debug!(branch = %id, "branch retired");
        }
        removed
    }

    fn contains(&self, id: &BranchId) -> bool {
        self.registry().contains_key(id)
    }

    fn branch_ids(&self) -> Vec<BranchId> {
        let mut ids: Vec<BranchId> = self.registry().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn len(&self) -> usize {
        self.registry().len()
    }
}

impl<V> std::fmt::Debug for InMemorySpeculativeStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySpeculativeStore")
            .field("branch_count", &self.registry().len())
            .finish()
    }
}
