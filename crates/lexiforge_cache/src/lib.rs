//! LEXIFORGE Cache
//!
//! Content-addressed store for validated model output. Keys are derived from
//! the operation name and a canonical serialization of the request, so two
//! requests that differ only in object key order share an entry.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod key;
pub mod store;

pub use key::{CacheKey, canonical_json};
pub use store::{Cache, CacheConfig, CacheEntry, CacheError, CacheStats, MemoryCache};
