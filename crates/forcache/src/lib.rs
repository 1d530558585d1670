//! Speculative in-memory key/value cache.
//!
//! Writes land in a private branch first. A branch can be read through,
//! committed into the shared confirmed state, or rolled back. A commit
//! succeeds only if nothing at all has been committed since the branch was
//! created; otherwise it fails with [`CacheError::Conflict`] and the caller
//! decides whether to recreate the branch from fresh state.
//!
//! [`Cache`] is the entry point. It composes the confirmed store
//! (`forcache-store`), the branch registry (`forcache-branch`) and the merge
//! engine (`forcache-merge`) and owns no state of its own.
//!
//! ```
//! use forcache::{Cache, QueryOptions};
//!
//! let cache: Cache<i64> = Cache::new();
//! let branch = cache.put_speculative("x", 42);
//! assert_eq!(cache.get("x", &QueryOptions::branch(branch.clone())).unwrap(), 42);
//! assert!(cache.get("x", &QueryOptions::confirmed()).is_err());
//!
//! cache.commit(&branch).unwrap();
//! assert_eq!(cache.get("x", &QueryOptions::confirmed()).unwrap(), 42);
//! ```

pub mod cache;
pub mod error;
pub mod options;

pub use cache::Cache;
pub use error::{CacheError, CacheResult};
pub use options::{CacheStats, QueryOptions};

// Re-export key types
pub use forcache_branch::{BranchInfo, InMemorySpeculativeStore, SpeculativeStore};
pub use forcache_merge::{
    CommitReceipt, GlobalVersionPolicy, MergeEngine, MergePolicy, RollbackReceipt,
    SimpleMergeEngine,
};
pub use forcache_store::{ConfirmedReader, ConfirmedWriter, InMemoryConfirmedStore};
pub use forcache_types::{BranchId, BranchState, Overlay, Version, VersionedValue};
