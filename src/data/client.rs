//! Ergast API client configuration
//!
//! `ErgastClient` bundles the cache-fronted `Fetcher` with the per-query freshness
//! windows and the reconciliation pool size. The query methods themselves live in
//! the `standings`, `results`, `schedule` and `season` modules.

use chrono::Duration;
use directories::ProjectDirs;
use std::path::PathBuf;

use super::fetch::{Fetcher, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::cache::{CacheStore, CACHE_FILE_NAME, DEFAULT_MAX_ENTRIES};

/// Default number of per-race result fetches in flight during reconciliation
pub const DEFAULT_WORKERS: usize = 4;

/// How long each kind of response may be served from the cache
///
/// Standings move on an hour-to-day scale; results for a race that just ran can
/// still change, so they get a short window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub standings: Duration,
    pub schedule: Duration,
    pub race_results: Duration,
    pub season_results: Duration,
}

impl Default for Freshness {
    fn default() -> Self {
        Self {
            standings: Duration::minutes(60),
            schedule: Duration::minutes(1440),
            race_results: Duration::minutes(5),
            season_results: Duration::minutes(30),
        }
    }
}

/// Everything needed to build an `ErgastClient`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: std::time::Duration,
    /// Location of the cache file
    pub cache_path: PathBuf,
    /// Maximum entries kept in the cache file
    pub max_entries: usize,
    /// Per-race fetches in flight during reconciliation
    pub workers: usize,
    pub freshness: Freshness,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_path: default_cache_path(),
            max_entries: DEFAULT_MAX_ENTRIES,
            workers: DEFAULT_WORKERS,
            freshness: Freshness::default(),
        }
    }
}

/// XDG cache directory for pitwall (`~/.cache/pitwall/` on Linux)
///
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pitwall").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Default cache file, falling back to the working directory
pub fn default_cache_path() -> PathBuf {
    default_cache_dir()
        .map(|dir| dir.join(CACHE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME))
}

/// Client for the Ergast-compatible F1 API
#[derive(Debug, Clone)]
pub struct ErgastClient {
    pub(crate) fetcher: Fetcher,
    pub(crate) freshness: Freshness,
    pub(crate) workers: usize,
}

impl ErgastClient {
    /// Creates a client from the given configuration
    pub fn new(config: ClientConfig) -> Self {
        let store = CacheStore::new(config.cache_path).with_max_entries(config.max_entries);
        Self {
            fetcher: Fetcher::new(config.base_url, config.timeout, store),
            freshness: config.freshness,
            workers: config.workers.max(1),
        }
    }

    /// The underlying cache-fronted fetcher
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}
