//! HTTP server for forcache.
//!
//! Exposes one shared [`forcache::Cache`] over JSON: speculative puts open
//! branches, reads may go through a branch, and branches are committed or
//! rolled back by id.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::SharedCache;
pub use server::CacheServer;
