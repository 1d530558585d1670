//! Merge engine for forcache.
//!
//! Decides whether a speculative branch may be folded into the confirmed
//! store (commit) or discarded (rollback), and performs the corresponding
//! mutation across both stores.
//!
//! The shipped policy is single global-version optimistic concurrency
//! control: a branch commits only if the confirmed store's version still
//! equals the branch's base version. Any commit to any key since the branch
//! was created invalidates it, even if the branch's own keys were untouched.
//! The policy is a [`MergePolicy`] so a finer-grained one can be slotted in
//! without touching the stores or the facade.

pub mod engine;
pub mod error;
pub mod policy;
pub mod receipt;

pub use engine::{MergeEngine, SimpleMergeEngine};
pub use error::{MergeError, MergeResult};
pub use policy::{GlobalVersionPolicy, MergePolicy};
pub use receipt::{CommitReceipt, RollbackReceipt};
