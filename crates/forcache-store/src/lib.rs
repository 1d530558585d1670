//! Versioned confirmed store for forcache.
//!
//! The confirmed store is the single source of truth for settled key/value
//! state. It pairs a key → [`VersionedValue`] map with one version counter
//! covering the whole store.
//!
//! # Access Split
//!
//! - [`ConfirmedReader`]: `current_version` and `read`, safe for any caller
//! - [`ConfirmedWriter`]: `apply` and the overlay operations, reserved for
//!   the merge engine
//!
//! # Storage Backends
//!
//! - [`InMemoryConfirmedStore`]: `HashMap` behind a single `RwLock`
//!
//! # Design Rules
//!
//! 1. Map and version are one unit guarded by one reader/writer lock.
//! 2. Every applied key bumps the version by exactly one.
//! 3. An overlay is applied inside one exclusive critical section; readers
//!    see all of it or none of it.
//! 4. The store never interprets values.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryConfirmedStore;
pub use traits::{ConfirmedReader, ConfirmedWriter};

pub use forcache_types::{Overlay, Version, VersionedValue};
