//! Cache layer that orchestrates caching logic with network fetching.

use color_eyre::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheEntry, CacheResult, RequestKey};
use crate::net::Response;

/// Cache layer that manages caching logic and network fetching.
///
/// Storage failures never escape this layer: a failed read is a miss and a
/// failed write is logged and skipped.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// Maximum entry count per namespace; unlisted namespaces are unbounded
  entry_limits: HashMap<String, usize>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      entry_limits: HashMap::new(),
    }
  }

  /// Cap the number of entries kept in `namespace`.
  pub fn with_entry_limit(mut self, namespace: impl Into<String>, max_entries: usize) -> Self {
    self.entry_limits.insert(namespace.into(), max_entries);
    self
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Look a key up in one namespace.
  pub fn lookup(&self, namespace: &str, key: &RequestKey) -> Option<CacheEntry> {
    match self.storage.get(namespace, key) {
      Ok(entry) => entry,
      Err(e) => {
        warn!(namespace, url = %key.url, error = %e, "cache read failed");
        None
      }
    }
  }

  /// Look a key up in every namespace.
  pub fn lookup_any(&self, key: &RequestKey) -> Option<CacheEntry> {
    match self.storage.match_any(key) {
      Ok(entry) => entry,
      Err(e) => {
        warn!(url = %key.url, error = %e, "cache read failed");
        None
      }
    }
  }

  /// Store a response if it is cacheable: GET request and 2xx status.
  ///
  /// Returns whether the response was written.
  pub fn store(&self, namespace: &str, key: &RequestKey, response: &Response) -> bool {
    if !key.is_get() || !response.is_success() {
      debug!(namespace, url = %key.url, status = response.status, "not cacheable");
      return false;
    }

    if let Err(e) = self.storage.put(namespace, key, response) {
      warn!(namespace, url = %key.url, error = %e, "cache write failed");
      return false;
    }

    if let Some(&limit) = self.entry_limits.get(namespace) {
      match self.storage.trim(namespace, limit) {
        Ok(0) => {}
        Ok(evicted) => debug!(namespace, evicted, "evicted oldest entries"),
        Err(e) => warn!(namespace, error = %e, "cache trim failed"),
      }
    }

    true
  }

  /// Cache-first lookup.
  ///
  /// 1. Check the namespace - if present, return it without touching the network
  /// 2. Otherwise fetch from network and store a successful response
  /// 3. Network errors propagate so the caller can pick a fallback
  pub async fn cache_first<F, Fut>(
    &self,
    namespace: &str,
    key: &RequestKey,
    fetcher: F,
  ) -> Result<CacheResult<Response>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Response>>,
  {
    if let Some(cached) = self.lookup(namespace, key) {
      debug!(namespace, url = %key.url, "cache hit");
      return Ok(CacheResult::from_cache(cached.response, cached.inserted_at));
    }

    debug!(namespace, url = %key.url, "cache miss");
    let response = fetcher().await?;
    self.store(namespace, key, &response);
    Ok(CacheResult::from_network(response))
  }

  /// Network-first lookup.
  ///
  /// 1. Fetch from network - store and return any response it produces
  /// 2. On network failure, return a cached copy from any namespace (offline mode)
  /// 3. With nothing cached, the network error propagates
  pub async fn network_first<F, Fut>(
    &self,
    namespace: &str,
    key: &RequestKey,
    fetcher: F,
  ) -> Result<CacheResult<Response>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Response>>,
  {
    match fetcher().await {
      Ok(response) => {
        self.store(namespace, key, &response);
        Ok(CacheResult::from_network(response))
      }
      Err(e) => match self.lookup_any(key) {
        Some(cached) => {
          debug!(url = %key.url, error = %e, "network failed, serving cached copy");
          Ok(CacheResult::offline(cached.response, cached.inserted_at))
        }
        None => Err(e),
      },
    }
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      entry_limits: self.entry_limits.clone(),
    }
  }
}
