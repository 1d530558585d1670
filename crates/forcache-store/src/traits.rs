use forcache_types::{Overlay, Version, VersionedValue};

use crate::error::StoreResult;

/// Read boundary of the confirmed store.
///
/// Reads never fail and may run concurrently with each other.
pub trait ConfirmedReader<V>: Send + Sync {
    /// The store-wide version.
    fn current_version(&self) -> Version;

    /// Read a key and the version at which it was last set.
    ///
    /// Returns `None` if the key has never been applied.
    fn read(&self, key: &str) -> Option<VersionedValue<V>>;

    /// Check whether a key is present.
    fn contains(&self, key: &str) -> bool {
        self.read(key).is_some()
    }

    /// Number of confirmed keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write boundary of the confirmed store.
///
/// Only the merge engine holds a writer. Every operation takes the store's
/// exclusive lock for its whole duration.
pub trait ConfirmedWriter<V>: ConfirmedReader<V> {
    /// Set one key, bump the version, and return the version recorded for it.
    fn apply(&self, key: &str, value: V) -> Version;

    /// Apply every overlay entry in iteration order as one critical section.
    ///
    /// Returns the version after the last entry. An empty overlay leaves the
    /// version unchanged.
    fn apply_overlay(&self, overlay: &Overlay<V>) -> Version;

    /// Like [`apply_overlay`](Self::apply_overlay), but `admit` is consulted
    /// with the current version inside the same critical section.
    ///
    /// If `admit` returns `false` nothing is applied and the call fails with
    /// [`StoreError::Rejected`](crate::StoreError::Rejected).
    fn apply_overlay_if(
        &self,
        overlay: &Overlay<V>,
        admit: &dyn Fn(Version) -> bool,
    ) -> StoreResult<Version>;
}
