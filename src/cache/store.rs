//! Single-file response cache
//!
//! Provides a `CacheStore` that keeps every cached API response in one JSON file,
//! keyed by a deterministic string. The whole mapping is read at the start of each
//! cache operation and rewritten in full on every update.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the cache file inside the cache directory
pub const CACHE_FILE_NAME: &str = "f1_cache.json";

/// Default maximum number of entries kept on disk
pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Default age after which an entry is swept regardless of how often it is used
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Full key -> entry mapping, the unit of persistence
pub type CacheMap = BTreeMap<String, CacheEntry>;

/// Errors raised while reading or writing the cache file
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read
    #[error("Failed to read cache file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// The cache file is not a JSON object
    #[error("Cache file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Serializing or writing the temporary file failed
    #[error("Failed to write cache file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// Renaming the temporary file over the cache file failed
    #[error("Failed to replace cache file {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

/// One cached response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the payload was fetched. `None` when the stored timestamp is missing or unreadable.
    #[serde(default, with = "lenient_time")]
    pub time: Option<DateTime<Utc>>,
    /// The raw response body
    #[serde(default)]
    pub data: Value,
}

impl CacheEntry {
    /// Creates an entry stamped with the given time
    pub fn new(time: DateTime<Utc>, data: Value) -> Self {
        Self {
            time: Some(time),
            data,
        }
    }

    /// Whether the entry is still within `max_age` at `now`.
    ///
    /// Entries without a usable timestamp are never fresh.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.time {
            Some(time) => now.signed_duration_since(time) < max_age,
            None => false,
        }
    }
}

/// Reads and writes the cache file
///
/// The store itself holds no data; callers load a `CacheMap`, modify it and save it
/// back. Saves go through a temporary file in the same directory followed by a rename,
/// so readers only ever see the previous or the new file.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Path to the cache file
    path: PathBuf,
    /// Upper bound on entries kept after a save
    max_entries: usize,
    /// Entries older than this are dropped on save
    retention: Duration,
}

impl CacheStore {
    /// Creates a store backed by `path` with the default bounds
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
        }
    }

    /// Sets the maximum number of entries kept on disk
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Sets the retention window for swept entries
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cache, treating any failure as an empty cache.
    ///
    /// The cache is advisory; a corrupt or unreadable file is logged and ignored.
    pub fn load(&self) -> CacheMap {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable cache file");
                CacheMap::new()
            }
        }
    }

    /// Loads the cache, reporting read and parse failures.
    ///
    /// A missing or zero-length file is an empty cache, not an error. Entries that are
    /// not objects are skipped individually.
    pub fn try_load(&self) -> Result<CacheMap, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CacheMap::new()),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(CacheMap::new());
        }

        let raw: BTreeMap<String, Value> =
            serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut map = CacheMap::new();
        for (key, value) in raw {
            match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => {
                    map.insert(key, entry);
                }
                Err(e) => debug!(key = %key, error = %e, "skipping malformed cache entry"),
            }
        }
        Ok(map)
    }

    /// Prunes and atomically writes the full mapping
    pub fn save(&self, map: &mut CacheMap) -> Result<(), CacheError> {
        self.prune(map, Utc::now());
        let staged = self.stage(map)?;
        staged
            .persist(&self.path)
            .map_err(|e| CacheError::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;
        debug!(path = %self.path.display(), entries = map.len(), "cache saved");
        Ok(())
    }

    /// Writes the mapping to a synced temporary file next to the cache file.
    ///
    /// The canonical file is untouched until the returned file is persisted.
    pub(crate) fn stage(&self, map: &CacheMap) -> Result<NamedTempFile, CacheError> {
        let write_err = |source: io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let json = serde_json::to_vec(map)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        Ok(tmp)
    }

    /// Drops expired and excess entries.
    ///
    /// Entries older than the retention window, or without a timestamp, go first.
    /// If the map is still over `max_entries`, the oldest remaining entries are evicted.
    pub fn prune(&self, map: &mut CacheMap, now: DateTime<Utc>) {
        let before = map.len();
        map.retain(|_, entry| entry.is_fresh(self.retention, now));

        if map.len() > self.max_entries {
            let mut by_age: Vec<(Option<DateTime<Utc>>, String)> = map
                .iter()
                .map(|(key, entry)| (entry.time, key.clone()))
                .collect();
            by_age.sort();
            let excess = map.len() - self.max_entries;
            for (_, key) in by_age.into_iter().take(excess) {
                map.remove(&key);
            }
        }

        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, remaining = map.len(), "pruned cache entries");
        }
    }
}

/// Timestamp (de)serialization that never fails.
///
/// Writes RFC 3339. Reads RFC 3339, or a naive ISO-8601 timestamp taken as UTC;
/// anything else becomes `None`.
mod lenient_time {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&time.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().and_then(parse_timestamp))
    }

    pub(super) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
