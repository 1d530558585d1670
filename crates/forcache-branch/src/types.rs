//! Core branch types.
//!
//! A [`Branch`] is the mutable record; a [`BranchHandle`] is the shared,
//! mutex-guarded reference to it that the registry hands out; a
//! [`BranchInfo`] is a detached, serializable snapshot for callers that only
//! want to look.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use forcache_types::{BranchId, BranchState, Overlay, Version};
use serde::{Deserialize, Serialize};

use crate::error::{BranchError, Result};

/// A unit of speculative work.
///
/// The overlay is private to this branch. An absent key means "no speculative
/// write for that key here", so reads fall through to the confirmed store.
#[derive(Clone, Debug)]
pub struct Branch<V> {
    id: BranchId,
    base_version: Version,
    created_at: DateTime<Utc>,
    state: BranchState,
    overlay: Overlay<V>,
}

impl<V> Branch<V> {
    /// A fresh pending branch with an empty overlay.
    pub fn new(base_version: Version) -> Self {
        Self::with_overlay(base_version, Overlay::new())
    }

    /// A fresh pending branch seeded with `overlay`.
    pub fn with_overlay(base_version: Version, overlay: Overlay<V>) -> Self {
        Self {
            id: BranchId::new(),
            base_version,
            created_at: Utc::now(),
            state: BranchState::Pending,
            overlay,
        }
    }

    pub fn id(&self) -> &BranchId {
        &self.id
    }

    /// Confirmed version this branch was created against.
    pub fn base_version(&self) -> Version {
        self.base_version
    }

    /// Informational only; never consulted by merge policy.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> BranchState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == BranchState::Pending
    }

    pub fn overlay(&self) -> &Overlay<V> {
        &self.overlay
    }

    /// The staged value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.overlay.get(key)
    }

    /// Sorted list of staged keys.
    pub fn keys(&self) -> Vec<String> {
        self.overlay.keys().cloned().collect()
    }

    /// Stage `value` under `key`, returning the value it replaces.
    ///
    /// Only a pending branch accepts writes.
    pub fn stage(&mut self, key: impl Into<String>, value: V) -> Result<Option<V>> {
        if !self.is_pending() {
            return Err(BranchError::NotPending {
                id: self.id.clone(),
                state: self.state,
            });
        }
        Ok(self.overlay.insert(key.into(), value))
    }

    pub fn mark_committed(&mut self) -> Result<()> {
        self.state = self.state.transition(BranchState::Committed)?;
        Ok(())
    }

    pub fn mark_rejected(&mut self) -> Result<()> {
        self.state = self.state.transition(BranchState::Rejected)?;
        Ok(())
    }

    /// Detached snapshot of this branch.
    pub fn info(&self) -> BranchInfo {
        BranchInfo {
            id: self.id.clone(),
            base_version: self.base_version,
            created_at: self.created_at,
            state: self.state,
            keys: self.keys(),
        }
    }
}

/// Shared reference to a registered branch record.
///
/// Cloning a handle clones the reference, not the branch: every holder
/// observes mutations made through any other handle.
pub struct BranchHandle<V> {
    id: BranchId,
    record: Arc<Mutex<Branch<V>>>,
}

impl<V> BranchHandle<V> {
    pub fn new(branch: Branch<V>) -> Self {
        Self {
            id: branch.id().clone(),
            record: Arc::new(Mutex::new(branch)),
        }
    }

    /// The branch id, readable without taking the record lock.
    pub fn id(&self) -> &BranchId {
        &self.id
    }

    /// Lock the record for a read-modify-write.
    pub fn lock(&self) -> MutexGuard<'_, Branch<V>> {
        // Branch mutations never panic midway, so the record stays consistent.
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles refer to the same record.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

impl<V> Clone for BranchHandle<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            record: Arc::clone(&self.record),
        }
    }
}

impl<V> fmt::Debug for BranchHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchHandle").field("id", &self.id).finish()
    }
}

/// Summary information about a live branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Branch identifier.
    pub id: BranchId,
    /// Confirmed version the branch was created against.
    pub base_version: Version,
    /// When the branch was created.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub state: BranchState,
    /// Staged keys, sorted.
    pub keys: Vec<String>,
}
