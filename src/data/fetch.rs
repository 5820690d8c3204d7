//! Cache-fronted HTTP fetching
//!
//! `Fetcher` wraps a single GET request with a freshness-checked lookup in the
//! `CacheStore`, falling back to the network and recording the response on success.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStore};

/// Base URL for the Jolpica mirror of the Ergast API
pub const DEFAULT_BASE_URL: &str = "http://api.jolpi.ca";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Errors that can occur when fetching from the API
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection or transport failure
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not valid JSON
    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// HTTP client with a disk cache in front of it
///
/// Clones share the cache lock, so read-modify-write cycles on the cache file from
/// any clone are serialized.
#[derive(Debug, Clone)]
pub struct Fetcher {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL that endpoints are appended to
    base_url: String,
    /// Per-request timeout
    timeout: std::time::Duration,
    /// Backing cache file
    store: CacheStore,
    /// Serializes load/insert/save of the cache file
    write_lock: Arc<Mutex<()>>,
}

impl Fetcher {
    /// Creates a fetcher for `base_url` backed by `store`
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration, store: CacheStore) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The cache store this fetcher reads and writes
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Fetches `endpoint`, serving it from the cache when fresh enough
    ///
    /// # Arguments
    /// * `endpoint` - Path and query appended to the base URL
    /// * `cache_key` - Key the response is stored under
    /// * `max_age` - How old a cached response may be and still be served
    /// * `force` - Skip the cache lookup and always hit the network
    ///
    /// # Returns
    /// * `Ok(Value)` - The cached or freshly fetched payload
    /// * `Err(FetchError)` - The network call failed; nothing was cached
    pub async fn fetch_with_cache(
        &self,
        endpoint: &str,
        cache_key: &str,
        max_age: Duration,
        force: bool,
    ) -> Result<Value, FetchError> {
        if !force {
            if let Some(payload) = self.lookup(cache_key, max_age) {
                debug!(key = cache_key, "cache hit");
                return Ok(payload);
            }
        }

        let payload = self.get_json(endpoint).await?;
        self.remember(cache_key, payload.clone());
        Ok(payload)
    }

    /// Returns the cached payload for `cache_key` if it is younger than `max_age`
    fn lookup(&self, cache_key: &str, max_age: Duration) -> Option<Value> {
        let mut map = self.store.load();
        let entry = map.remove(cache_key)?;
        if entry.is_fresh(max_age, Utc::now()) {
            Some(entry.data)
        } else {
            debug!(key = cache_key, "cache entry stale");
            None
        }
    }

    /// Issues the GET request and decodes the body
    async fn get_json(&self, endpoint: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        info!(url = %url, "fetching");

        let response = self
            .http_client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }

    /// Stores `payload` under `cache_key`; failures are logged, not returned.
    ///
    /// No await happens while the lock is held, so a cancelled fetch either wrote
    /// the whole file or nothing.
    fn remember(&self, cache_key: &str, payload: Value) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut map = self.store.load();
        map.insert(cache_key.to_string(), CacheEntry::new(Utc::now(), payload));
        if let Err(e) = self.store.save(&mut map) {
            warn!(key = cache_key, error = %e, "failed to write cache");
        }
    }
}
