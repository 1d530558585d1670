//! Speculative branch store for forcache.
//!
//! A branch is a named, private set of tentative writes staged against the
//! confirmed store's version at creation time (its base version). This crate
//! owns the population of live branches; it does not decide whether a branch
//! may be committed. That policy lives in `forcache-merge`.
//!
//! # Architecture
//!
//! - The registry maps [`BranchId`] to a [`BranchHandle`] and is guarded by
//!   its own `RwLock`, separate from the confirmed store's lock.
//! - Each branch record sits behind its own `Mutex`. Anyone reading or
//!   mutating a branch's state or overlay holds that mutex for the whole
//!   read-modify-write, so two resolutions of the same branch serialize.
//!
//! # Modules
//!
//! - [`error`]: Error types for branch mutations
//! - [`types`]: [`Branch`], [`BranchHandle`] and the [`BranchInfo`] snapshot
//! - [`traits`]: The [`SpeculativeStore`] trait defining the registry interface
//! - [`memory`]: In-memory [`InMemorySpeculativeStore`]

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{BranchError, Result};
pub use memory::InMemorySpeculativeStore;
pub use traits::SpeculativeStore;
pub use types::{Branch, BranchHandle, BranchInfo};

pub use forcache_types::{BranchId, BranchState};
