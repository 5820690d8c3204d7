//! Cache module for storing API responses to disk
//!
//! All responses live in a single JSON file mapping a cache key to the time the
//! response was fetched and its raw payload. Freshness is decided by the caller per
//! lookup; the store only bounds how much it keeps.

mod store;

pub use store::{
    CacheEntry, CacheError, CacheMap, CacheStore, CACHE_FILE_NAME, DEFAULT_MAX_ENTRIES,
    DEFAULT_RETENTION_DAYS,
};
