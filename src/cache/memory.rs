//! In-process storage, used when persistence is disabled and in tests.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::storage::CacheStorage;
use super::traits::{CacheEntry, RequestKey};
use crate::net::Response;

#[derive(Default)]
struct Namespace {
  /// key hash -> (insertion sequence, entry)
  entries: HashMap<String, (u64, CacheEntry)>,
}

#[derive(Default)]
struct Inner {
  /// Namespaces in creation order
  namespaces: Vec<(String, Namespace)>,
  /// cache version -> lifecycle state
  states: HashMap<String, String>,
  next_seq: u64,
}

impl Inner {
  fn namespace_mut(&mut self, name: &str) -> &mut Namespace {
    let idx = match self.namespaces.iter().position(|(n, _)| n == name) {
      Some(idx) => idx,
      None => {
        self.namespaces.push((name.to_string(), Namespace::default()));
        self.namespaces.len() - 1
      }
    };
    &mut self.namespaces[idx].1
  }

  fn namespace(&self, name: &str) -> Option<&Namespace> {
    self
      .namespaces
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, ns)| ns)
  }

  fn insert(&mut self, name: &str, key: &RequestKey, response: &Response) {
    let seq = self.next_seq;
    self.next_seq += 1;
    let entry = CacheEntry {
      key: key.clone(),
      response: response.clone(),
      inserted_at: Utc::now(),
    };
    self
      .namespace_mut(name)
      .entries
      .insert(key.cache_hash(), (seq, entry));
  }
}

/// Storage that keeps everything in memory and forgets it on drop.
#[derive(Default)]
pub struct MemoryStorage {
  inner: Mutex<Inner>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn inner(&self) -> Result<MutexGuard<'_, Inner>> {
    self
      .inner
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStorage for MemoryStorage {
  fn open_namespace(&self, namespace: &str) -> Result<()> {
    self.inner()?.namespace_mut(namespace);
    Ok(())
  }

  fn has_namespace(&self, namespace: &str) -> Result<bool> {
    Ok(self.inner()?.namespace(namespace).is_some())
  }

  fn namespaces(&self) -> Result<Vec<String>> {
    Ok(
      self
        .inner()?
        .namespaces
        .iter()
        .map(|(n, _)| n.clone())
        .collect(),
    )
  }

  fn delete_namespace(&self, namespace: &str) -> Result<bool> {
    let mut inner = self.inner()?;
    let before = inner.namespaces.len();
    inner.namespaces.retain(|(n, _)| n != namespace);
    Ok(inner.namespaces.len() != before)
  }

  fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<CacheEntry>> {
    Ok(
      self
        .inner()?
        .namespace(namespace)
        .and_then(|ns| ns.entries.get(&key.cache_hash()))
        .map(|(_, entry)| entry.clone()),
    )
  }

  fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<()> {
    self.inner()?.insert(namespace, key, response);
    Ok(())
  }

  fn put_all(&self, namespace: &str, entries: &[(RequestKey, Response)]) -> Result<()> {
    let mut inner = self.inner()?;
    inner.namespace_mut(namespace);
    for (key, response) in entries {
      inner.insert(namespace, key, response);
    }
    Ok(())
  }

  fn entries(&self, namespace: &str) -> Result<Vec<RequestKey>> {
    let inner = self.inner()?;
    let Some(ns) = inner.namespace(namespace) else {
      return Ok(Vec::new());
    };

    let mut entries: Vec<&(u64, CacheEntry)> = ns.entries.values().collect();
    entries.sort_by_key(|(seq, _)| *seq);
    Ok(entries.into_iter().map(|(_, e)| e.key.clone()).collect())
  }

  fn trim(&self, namespace: &str, max_entries: usize) -> Result<usize> {
    let mut inner = self.inner()?;
    let ns = inner.namespace_mut(namespace);
    if ns.entries.len() <= max_entries {
      return Ok(0);
    }

    let mut by_age: Vec<(u64, String)> = ns
      .entries
      .iter()
      .map(|(hash, (seq, _))| (*seq, hash.clone()))
      .collect();
    by_age.sort();

    let excess = ns.entries.len() - max_entries;
    for (_, hash) in by_age.into_iter().take(excess) {
      ns.entries.remove(&hash);
    }
    Ok(excess)
  }

  fn load_state(&self, version: &str) -> Result<Option<String>> {
    Ok(self.inner()?.states.get(version).cloned())
  }

  fn save_state(&self, version: &str, state: &str) -> Result<()> {
    self
      .inner()?
      .states
      .insert(version.to_string(), state.to_string());
    Ok(())
  }
}
