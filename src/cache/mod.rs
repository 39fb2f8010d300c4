//! Versioned response cache for offline support.
//!
//! This module provides the storage side of the router:
//! - Named namespaces mapping request keys to stored responses
//! - SQLite persistence and an in-memory backend
//! - Cache-first and network-first lookups with offline fallback

mod layer;
mod memory;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use memory::MemoryStorage;
pub use storage::{CacheStorage, SqliteStorage};
pub use traits::{CacheResult, RequestKey};
#[cfg(test)]
pub use traits::{CacheEntry, CacheSource};
