//! tickerboard-cache
//!
//! A time-to-live cache for raw source payloads.
//!
//! - [`CacheKey`] derives a stable key from `(subject, source name, params)`.
//! - [`Backend`] is the storage seam; [`MemoryBackend`] keeps entries in
//!   process and [`FileBackend`] writes one JSON file per key.
//! - [`TtlCache`] layers freshness on top of a backend and never fails:
//!   storage problems are logged and behave like an empty cache.
#![warn(missing_docs)]

mod backend;
mod key;
mod ttl;

pub use backend::{Backend, FileBackend, MemoryBackend, StoreError, StoredRecord};
pub use key::CacheKey;
pub use ttl::{CacheEntry, TtlCache};
