use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use forcache_types::{Overlay, Version, VersionedValue};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ConfirmedReader, ConfirmedWriter};

/// In-memory, HashMap-based confirmed store.
///
/// The map and the version counter live together behind one `RwLock`, so a
/// reader always sees a version that matches the entries it reads. Values are
/// cloned out on read.
pub struct InMemoryConfirmedStore<V> {
    inner: RwLock<ConfirmedState<V>>,
}

struct ConfirmedState<V> {
    entries: HashMap<String, VersionedValue<V>>,
    version: Version,
}

impl<V> ConfirmedState<V> {
    /// Caller holds the write lock.
    fn set(&mut self, key: &str, value: V) -> Version {
        self.version = self.version.next();
        self.entries
            .insert(key.to_string(), VersionedValue::new(value, self.version));
        self.version
    }
}

impl<V> InMemoryConfirmedStore<V> {
    /// Create a new empty store at [`Version::ZERO`].
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ConfirmedState {
                entries: HashMap::new(),
                version: Version::ZERO,
            }),
        }
    }

    // No code panics while holding the write guard, so a poisoned lock still
    // guards consistent data.
    fn state(&self) -> RwLockReadGuard<'_, ConfirmedState<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ConfirmedState<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sorted list of all confirmed keys.
    pub fn keys(&self) -> Vec<String> {
        let state = self.state();
        let mut keys: Vec<String> = state.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl<V: Clone> InMemoryConfirmedStore<V> {
    /// Consistent copy of every entry, sorted by key, with the version it was
    /// taken at.
    pub fn snapshot(&self) -> (Version, Vec<(String, VersionedValue<V>)>) {
        let state = self.state();
        let mut entries: Vec<(String, VersionedValue<V>)> = state
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        (state.version, entries)
    }
}

impl<V> Default for InMemoryConfirmedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> ConfirmedReader<V> for InMemoryConfirmedStore<V> {
    fn current_version(&self) -> Version {
        self.state().version
    }

    fn read(&self, key: &str) -> Option<VersionedValue<V>> {
        self.state().entries.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.state().entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.state().entries.len()
    }
}

impl<V: Clone + Send + Sync> ConfirmedWriter<V> for InMemoryConfirmedStore<V> {
    fn apply(&self, key: &str, value: V) -> Version {
        let version = self.state_mut().set(key, value);
        debug!(key, %version, "confirmed key applied");
        version
    }

    fn apply_overlay(&self, overlay: &Overlay<V>) -> Version {
        let mut state = self.state_mut();
        let from = state.version;
        for (key, value) in overlay {
            state.set(key, value.clone());
        }
        debug!(keys = overlay.len(), %from, to = %state.version, "overlay applied");
        state.version
    }

    fn apply_overlay_if(
        &self,
        overlay: &Overlay<V>,
        admit: &dyn Fn(Version) -> bool,
    ) -> StoreResult<Version> {
        let mut state = self.state_mut();
        let current = state.version;
        if !admit(current) {
            debug!(%current, keys = overlay.len(), "overlay refused");
            return Err(StoreError::Rejected { current });
        }
        for (key, value) in overlay {
            state.set(key, value.clone());
        }
        debug!(keys = overlay.len(), from = %current, to = %state.version, "overlay applied");
        Ok(state.version)
    }
}

impl<V> std::fmt::Debug for InMemoryConfirmedStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("InMemoryConfirmedStore")
            .field("version", &state.version)
            .field("key_count", &state.entries.len())
            .finish()
    }
}
