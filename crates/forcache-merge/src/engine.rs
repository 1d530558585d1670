use forcache_branch::SpeculativeStore;
use forcache_store::{ConfirmedWriter, StoreError};
use forcache_types::{BranchId, BranchState};
use tracing::{info, warn};

use crate::error::{MergeError, MergeResult};
use crate::policy::{GlobalVersionPolicy, MergePolicy};
use crate::receipt::{CommitReceipt, RollbackReceipt};

/// Commit/rollback boundary between the facade and the stores.
///
/// Every resolution of a branch runs with that branch's record lock held from
/// lookup to retirement, so two resolutions of the same branch never
/// interleave. The confirmed store's lock and the registry lock are taken in
/// sequence under the record lock, never together.
pub trait MergeEngine<V>: Send + Sync {
    /// Validate a branch and, if admitted, fold its overlay into the
    /// confirmed store and retire it.
    ///
    /// On conflict the branch is marked `Rejected` but stays registered, so
    /// reads through it keep working until it is rolled back.
    fn commit_branch(
        &self,
        id: &BranchId,
        confirmed: &dyn ConfirmedWriter<V>,
        speculative: &dyn SpeculativeStore<V>,
    ) -> MergeResult<CommitReceipt>;

    /// Discard a branch unconditionally. Never touches the confirmed store.
    fn rollback_branch(
        &self,
        id: &BranchId,
        speculative: &dyn SpeculativeStore<V>,
    ) -> MergeResult<RollbackReceipt>;
}

/// The default engine: one [`MergePolicy`], no retries, no state of its own.
#[derive(Clone, Debug, Default)]
pub struct SimpleMergeEngine<P = GlobalVersionPolicy> {
    policy: P,
}

impl SimpleMergeEngine {
    /// Engine using store-wide optimistic concurrency control.
    pub fn new() -> Self {
        Self {
            policy: GlobalVersionPolicy,
        }
    }
}

impl<P: MergePolicy> SimpleMergeEngine<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<V, P> MergeEngine<V> for SimpleMergeEngine<P>
where
    V: Clone + Send + Sync,
    P: MergePolicy,
{
    fn commit_branch(
        &self,
        id: &BranchId,
        confirmed: &dyn ConfirmedWriter<V>,
        speculative: &dyn SpeculativeStore<V>,
    ) -> MergeResult<CommitReceipt> {
        let handle = speculative
            .get_branch(id)
            .ok_or_else(|| MergeError::BranchNotFound(id.clone()))?;
        let mut branch = handle.lock();

        // Another resolution may have retired the branch between the lookup
        // and acquiring the record.
        if branch.state() == BranchState::Committed || !speculative.contains(id) {
            return Err(MergeError::BranchNotFound(id.clone()));
        }

        let base = branch.base_version();
        if branch.state() == BranchState::Rejected {
            let current = confirmed.current_version();
            warn!(branch = %id, %base, %current, "commit of already rejected branch");
            return Err(MergeError::Conflict {
                branch: id.clone(),
                base,
                current,
            });
        }

        let policy = &self.policy;
        match confirmed.apply_overlay_if(branch.overlay(), &|current| policy.admits(base, current)) {
            Ok(new_version) => {
                branch.mark_committed()?;
                speculative.delete_branch(id);
                let applied_keys = branch.keys();
                info!(
                    branch = %id,
                    %base,
                    %new_version,
                    keys = applied_keys.len(),
                    "branch committed"
                );
                Ok(CommitReceipt {
                    branch: id.clone(),
                    base_version: base,
                    applied_keys,
                    new_version,
                    state: branch.state(),
                })
            }
            Err(StoreError::Rejected { current }) => {
                branch.mark_rejected()?;
                warn!(
                    branch = %id,
                    %base,
                    %current,
                    policy = policy.name(),
                    "branch rejected: version conflict"
                );
                Err(MergeError::Conflict {
                    branch: id.clone(),
                    base,
                    current,
                })
            }
        }
    }

    fn rollback_branch(
        &self,
        id: &BranchId,
        speculative: &dyn SpeculativeStore<V>,
    ) -> MergeResult<RollbackReceipt> {
        let handle = speculative
            .get_branch(id)
            .ok_or_else(|| MergeError::BranchNotFound(id.clone()))?;
        let mut branch = handle.lock();

        if branch.state() == BranchState::Committed || !speculative.contains(id) {
            return Err(MergeError::BranchNotFound(id.clone()));
        }

        // A branch rejected by a failed commit is already terminal; rolling it
        // back only retires it.
        if branch.is_pending() {
            branch.mark_rejected()?;
        }
        speculative.delete_branch(id);

        let discarded_keys = branch.keys();
        info!(branch = %id, keys = discarded_keys.len(), "branch rolled back");
        Ok(RollbackReceipt {
            branch: id.clone(),
            base_version: branch.base_version(),
            discarded_keys,
            state: branch.state(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use forcache_branch::InMemorySpeculativeStore;
    use forcache_store::{ConfirmedReader, InMemoryConfirmedStore};
    use forcache_types::{Overlay, Version};

    struct Fixture {
        confirmed: InMemoryConfirmedStore<i32>,
        spec: InMemorySpeculativeStore<i32>,
        engine: SimpleMergeEngine,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                confirmed: InMemoryConfirmedStore::new(),
                spec: InMemorySpeculativeStore::new(),
                engine: SimpleMergeEngine::new(),
            }
        }

        fn branch(&self, entries: &[(&str, i32)]) -> BranchId {
            let overlay: Overlay<i32> = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
            self.spec
                .create_branch_with(self.confirmed.current_version(), overlay)
                .id()
                .clone()
        }

        fn commit(&self, id: &BranchId) -> MergeResult<CommitReceipt> {
            MergeEngine::<i32>::commit_branch(&self.engine, id, &self.confirmed, &self.spec)
        }

        fn rollback(&self, id: &BranchId) -> MergeResult<RollbackReceipt> {
            MergeEngine::<i32>::rollback_branch(&self.engine, id, &self.spec)
        }
    }

    // ---- Commit ----
    #[test]
    fn commit_applies_overlay_and_retires_branch() {
        let f = Fixture::new();
        let id = f.branch(&[("a", 1), ("b", 2), ("c", 3)]);

        let receipt = f.commit(&id).unwrap();
        assert_eq!(receipt.state, BranchState::Committed);
        assert_eq!(receipt.base_version, Version::ZERO);
        assert_eq!(receipt.new_version, Version::new(3));
        assert_eq!(receipt.applied_keys, vec!["a", "b", "c"]);

        assert_eq!(f.confirmed.current_version(), Version::new(3));
        for key in ["a", "b", "c"] {
            assert!(f.confirmed.read(key).unwrap().version > Version::ZERO);
        }
        assert!(!f.spec.contains(&id));
    }

    #[test]
    fn commit_unknown_branch_is_not_found() {
        let f = Fixture::new();
        let err = f.commit(&BranchId::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn commit_twice_is_not_found() {
        let f = Fixture::new();
        let id = f.branch(&[("x", 1)]);
        f.commit(&id).unwrap();
        assert!(f.commit(&id).unwrap_err().is_not_found());
        assert_eq!(f.confirmed.current_version(), Version::new(1));
    }

    // ---- Conflict ----
    #[test]
    fn conflict_rejects_but_keeps_branch() {
        let f = Fixture::new();
        let b1 = f.branch(&[("x", 1)]);
        let b2 = f.branch(&[("x", 2)]);

        f.commit(&b1).unwrap();
        let err = f.commit(&b2).unwrap_err();
        assert_eq!(
            err,
            MergeError::Conflict {
                branch: b2.clone(),
                base: Version::ZERO,
                current: Version::new(1),
            }
        );

        let handle = f.spec.get_branch(&b2).expect("conflicted branch stays registered");
        assert_eq!(handle.lock().state(), BranchState::Rejected);
        assert_eq!(f.confirmed.read("x").unwrap().value, 1);
    }

    #[test]
    fn conflict_is_store_wide() {
        let f = Fixture::new();
        let mine = f.branch(&[("mine", 1)]);
        let other = f.branch(&[("unrelated", 9)]);
        f.commit(&other).unwrap();

        assert!(f.commit(&mine).unwrap_err().is_conflict());
        assert!(!f.confirmed.contains("mine"));
    }

    #[test]
    fn rejected_branch_stays_rejected() {
        let f = Fixture::new();
        let b1 = f.branch(&[("x", 1)]);
        let b2 = f.branch(&[("x", 2)]);
        f.commit(&b1).unwrap();
        f.commit(&b2).unwrap_err();

        assert!(f.commit(&b2).unwrap_err().is_conflict());
        assert_eq!(f.confirmed.current_version(), Version::new(1));
    }

    // ---- Rollback ----
    #[test]
    fn rollback_retires_without_touching_confirmed() {
        let f = Fixture::new();
        let id = f.branch(&[("y", 5)]);

        let receipt = f.rollback(&id).unwrap();
        assert_eq!(receipt.state, BranchState::Rejected);
        assert_eq!(receipt.discarded_keys, vec!["y"]);
        assert!(!f.spec.contains(&id));
        assert_eq!(f.confirmed.current_version(), Version::ZERO);
        assert!(!f.confirmed.contains("y"));
    }

    #[test]
    fn rollback_is_one_shot() {
        let f = Fixture::new();
        let id = f.branch(&[("y", 5)]);
        f.rollback(&id).unwrap();
        assert!(f.rollback(&id).unwrap_err().is_not_found());
        assert!(f.commit(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn rollback_retires_conflicted_branch() {
        let f = Fixture::new();
        let b1 = f.branch(&[("x", 1)]);
        let b2 = f.branch(&[("x", 2)]);
        f.commit(&b1).unwrap();
        f.commit(&b2).unwrap_err();

        let receipt = f.rollback(&b2).unwrap();
        assert_eq!(receipt.state, BranchState::Rejected);
        assert!(!f.spec.contains(&b2));
    }

    // ---- Policy ----
    struct LastWriterWins;

    impl MergePolicy for LastWriterWins {
        fn name(&self) -> &str {
            "last-writer-wins"
        }

        fn admits(&self, _base: Version, _current: Version) -> bool {
            true
        }
    }

    #[test]
    fn custom_policy_is_consulted() {
        let confirmed: InMemoryConfirmedStore<i32> = InMemoryConfirmedStore::new();
        let spec: InMemorySpeculativeStore<i32> = InMemorySpeculativeStore::new();
        let engine = SimpleMergeEngine::with_policy(LastWriterWins);
        let commit = |id: &BranchId| MergeEngine::<i32>::commit_branch(&engine, id, &confirmed, &spec);
        assert_eq!(engine.policy().name(), "last-writer-wins");

        let a = spec.create_branch(Version::ZERO);
        a.lock().stage("x", 1).unwrap();
        let b = spec.create_branch(Version::ZERO);
        b.lock().stage("x", 2).unwrap();

        commit(a.id()).unwrap();
        commit(b.id()).unwrap();
        assert_eq!(confirmed.read("x").unwrap().value, 2);
        assert_eq!(confirmed.current_version(), Version::new(2));
    }

    // ---- Concurrency ----
    fn shared() -> Arc<Fixture> {
        Arc::new(Fixture::new())
    }

    #[test]
    fn concurrent_commits_of_one_branch_succeed_once() {
        let f = shared();
        let id = f.branch(&[("a", 1), ("b", 2)]);

        let results: Vec<MergeResult<CommitReceipt>> = (0..8)
            .map(|_| {
                let f = Arc::clone(&f);
                let id = id.clone();
                thread::spawn(move || f.commit(&id))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();

        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(MergeError::is_not_found));
        assert_eq!(f.confirmed.current_version(), Version::new(2));
    }

    #[test]
    fn commit_and_rollback_race_resolves_once() {
        for _ in 0..50 {
            let f = shared();
            let id = f.branch(&[("k", 1)]);

            let committer = {
                let f = Arc::clone(&f);
                let id = id.clone();
                thread::spawn(move || f.commit(&id).is_ok())
            };
            let roller = {
                let f = Arc::clone(&f);
                let id = id.clone();
                thread::spawn(move || f.rollback(&id).is_ok())
            };
            let committed = committer.join().expect("commit thread");
            let rolled_back = roller.join().expect("rollback thread");

            assert!(committed ^ rolled_back, "exactly one resolution must win");
            assert_eq!(f.confirmed.contains("k"), committed);
            assert!(!f.spec.contains(&id));
        }
    }

    #[test]
    fn concurrent_commits_from_one_base_admit_exactly_one() {
        let f = shared();
        let ids: Vec<BranchId> = (0..8).map(|i| f.branch(&[("x", i)])).collect();

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let f = Arc::clone(&f);
                thread::spawn(move || f.commit(&id))
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.join().expect("thread should not panic") {
                Ok(_) => ok += 1,
                Err(e) if e.is_conflict() => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(f.confirmed.current_version(), Version::new(1));
    }
}
