//! Regeneration cache for incremental generation.
//!
//! Each project gets a stable identifier the first time it is seen and a
//! content hash of its defining script on every pass. Comparing hashes against
//! the persisted store decides which projects need their artifacts rendered
//! again, and whether project membership changed enough to redo the aggregate.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod hasher;
pub mod store;

pub use cache::{DirtySet, ProjectState, RegenerationCache, TrackedProject};
pub use error::CacheError;
pub use hasher::ScriptHasher;
pub use store::{CacheEntry, CacheStore, CACHE_DIR, STORE_FILE};
