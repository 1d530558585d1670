//! Foundation types for forcache.
//!
//! This crate provides the vocabulary shared by every other forcache crate.
//! It has no notion of locking or storage; it only describes what the stores
//! hold and how branches move through their lifecycle.
//!
//! # Key Types
//!
//! - [`Version`]: Global, monotonically increasing version of the confirmed store
//! - [`VersionedValue`]: A value paired with the version at which it was set
//! - [`Overlay`]: A branch's private, ordered key → value staging area
//! - [`BranchId`]: UUID v7 branch identifier, unique for the life of the process
//! - [`BranchState`]: `Pending`, `Committed` or `Rejected`

pub mod branch;
pub mod error;
pub mod version;

pub use branch::{BranchId, BranchState};
pub use error::TypeError;
pub use version::{Overlay, Version, VersionedValue};
