use std::sync::Arc;

use forcache_branch::{BranchHandle, BranchInfo, InMemorySpeculativeStore, SpeculativeStore};
use forcache_merge::{CommitReceipt, MergeEngine, RollbackReceipt, SimpleMergeEngine};
use forcache_store::{ConfirmedWriter, InMemoryConfirmedStore};
use forcache_types::{BranchId, Overlay, Version, VersionedValue};
use tracing::debug;

use crate::error::{CacheError, CacheResult};
use crate::options::{CacheStats, QueryOptions};

/// High-level speculative cache API.
///
/// Holds references to the confirmed store, the branch registry and the merge
/// engine, and nothing else. Cloning a `Cache` yields another view of the same
/// stores.
pub struct Cache<V> {
    confirmed: Arc<dyn ConfirmedWriter<V>>,
    speculative: Arc<dyn SpeculativeStore<V>>,
    merge: Arc<dyn MergeEngine<V>>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// In-memory stores and global-version OCC.
    pub fn new() -> Self {
        Self::with_components(
            Arc::new(InMemoryConfirmedStore::<V>::new()),
            Arc::new(InMemorySpeculativeStore::<V>::new()),
            Arc::new(SimpleMergeEngine::new()),
        )
    }

    /// Assemble a cache from explicit components.
    pub fn with_components(
        confirmed: Arc<dyn ConfirmedWriter<V>>,
        speculative: Arc<dyn SpeculativeStore<V>>,
        merge: Arc<dyn MergeEngine<V>>,
    ) -> Self {
        Self {
            confirmed,
            speculative,
            merge,
        }
    }

    // ---- Speculative writes ----

    /// Stage `value` under `key` in a new branch based on the current
    /// confirmed version and return the branch id.
    pub fn put_speculative(&self, key: impl Into<String>, value: V) -> BranchId {
        let base = self.confirmed.current_version();
        let mut overlay = Overlay::new();
        overlay.insert(key.into(), value);
        let handle = self.speculative.create_branch_with(base, overlay);
        handle.id().clone()
    }

    /// Add or replace a key in an existing pending branch.
    pub fn stage(&self, branch: &BranchId, key: impl Into<String>, value: V) -> CacheResult<()> {
        let handle = self.live_branch(branch)?;
        let mut record = handle.lock();
        if !self.speculative.contains(branch) {
            return Err(CacheError::BranchNotFound(branch.clone()));
        }
        let key = key.into();
        record.stage(key.as_str(), value)?;
        debug!(branch = %branch, key = %key, "value staged");
        Ok(())
    }

    // ---- Reads ----

    /// Read `key`, letting the branch in `opts` shadow confirmed state.
    ///
    /// A branch overlay entry always wins while the branch is registered, even
    /// if the confirmed value is newer. An unknown branch is ignored and the
    /// read falls through to confirmed state.
    pub fn get(&self, key: &str, opts: &QueryOptions) -> CacheResult<V> {
        if let Some(id) = &opts.branch {
            if let Some(handle) = self.speculative.get_branch(id) {
                if let Some(value) = handle.lock().get(key) {
                    return Ok(value.clone());
                }
            }
        }
        self.confirmed
            .read(key)
            .map(VersionedValue::into_value)
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    /// Confirmed value and the version it was set at, ignoring all branches.
    pub fn read_confirmed(&self, key: &str) -> Option<VersionedValue<V>> {
        self.confirmed.read(key)
    }

    /// Current confirmed version.
    pub fn version(&self) -> Version {
        self.confirmed.current_version()
    }

    // ---- Resolution ----

    pub fn commit(&self, branch: &BranchId) -> CacheResult<CommitReceipt> {
        self.merge
            .commit_branch(branch, self.confirmed.as_ref(), self.speculative.as_ref())
            .map_err(CacheError::from)
    }

    pub fn rollback(&self, branch: &BranchId) -> CacheResult<RollbackReceipt> {
        self.merge
            .rollback_branch(branch, self.speculative.as_ref())
            .map_err(CacheError::from)
    }

    // ---- Introspection ----

    /// Snapshot of a live branch.
    pub fn branch_info(&self, branch: &BranchId) -> CacheResult<BranchInfo> {
        let handle = self.live_branch(branch)?;
        let info = handle.lock().info();
        Ok(info)
    }

    /// Ids of all live branches, sorted.
    pub fn branch_ids(&self) -> Vec<BranchId> {
        self.speculative.branch_ids()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            version: self.confirmed.current_version(),
            confirmed_keys: self.confirmed.len(),
            active_branches: self.speculative.len(),
        }
    }

    fn live_branch(&self, branch: &BranchId) -> CacheResult<BranchHandle<V>> {
        self.speculative
            .get_branch(branch)
            .ok_or_else(|| CacheError::BranchNotFound(branch.clone()))
    }
}

impl<V> Default for Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            confirmed: Arc::clone(&self.confirmed),
            speculative: Arc::clone(&self.speculative),
            merge: Arc::clone(&self.merge),
        }
    }
}

impl<V> std::fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("version", &self.confirmed.current_version())
            .field("confirmed_keys", &self.confirmed.len())
            .field("active_branches", &self.speculative.len())
            .finish()
    }
}
