//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::traits::{CacheEntry, RequestKey};
use crate::net::Response;

/// Trait for cache storage backends.
///
/// A backend holds named namespaces, each a map from request key to
/// response. Writes to the same key are last-write-wins.
pub trait CacheStorage: Send + Sync {
  /// Create the namespace if it does not exist yet.
  fn open_namespace(&self, namespace: &str) -> Result<()>;

  fn has_namespace(&self, namespace: &str) -> Result<bool>;

  /// All namespace names, oldest first.
  fn namespaces(&self) -> Result<Vec<String>>;

  /// Drop a namespace and every entry in it. Returns whether it existed.
  fn delete_namespace(&self, namespace: &str) -> Result<bool>;

  fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<CacheEntry>>;

  /// Store one response, opening the namespace if needed.
  fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<()>;

  /// Store a batch of responses; either all are written or none.
  fn put_all(&self, namespace: &str, entries: &[(RequestKey, Response)]) -> Result<()>;

  /// Keys stored in a namespace, oldest first.
  fn entries(&self, namespace: &str) -> Result<Vec<RequestKey>>;

  /// Evict the oldest entries until at most `max_entries` remain.
  /// Returns the number of evicted entries.
  fn trim(&self, namespace: &str, max_entries: usize) -> Result<usize>;

  /// Lifecycle state recorded for a cache version, if any.
  fn load_state(&self, version: &str) -> Result<Option<String>>;

  /// Record the lifecycle state of a cache version, replacing the previous one.
  fn save_state(&self, version: &str, state: &str) -> Result<()>;

  /// Look the key up in every namespace, oldest namespace first.
  fn match_any(&self, key: &RequestKey) -> Result<Option<CacheEntry>> {
    for namespace in self.namespaces()? {
      if let Some(entry) = self.get(&namespace, key)? {
        return Ok(Some(entry));
      }
    }
    Ok(None)
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the store at `path`, or at the default location when `None`.
  pub fn open(path: Option<&Path>) -> Result<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("swcache").join("cache.db"))
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    self
      .conn()?
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_namespaces (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per cached response; rowid doubles as insertion order
CREATE TABLE IF NOT EXISTS cache_entries (
    namespace TEXT NOT NULL,
    key_hash TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    status_text TEXT NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    inserted_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (namespace, key_hash)
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_namespace
    ON cache_entries(namespace, inserted_at);

-- Lifecycle state per cache version, so a restart resumes where it left off
CREATE TABLE IF NOT EXISTS worker_state (
    version TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const INSERT_NAMESPACE: &str = "INSERT OR IGNORE INTO cache_namespaces (name) VALUES (?)";

const INSERT_ENTRY: &str =
  "INSERT OR REPLACE INTO cache_entries (namespace, key_hash, method, url, status, status_text, headers, body, inserted_at)
   VALUES (?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))";

fn insert_entry(
  conn: &Connection,
  namespace: &str,
  key: &RequestKey,
  response: &Response,
) -> Result<()> {
  let headers = serde_json::to_string(&response.headers)
    .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

  conn
    .execute(
      INSERT_ENTRY,
      params![
        namespace,
        key.cache_hash(),
        key.method,
        key.url,
        response.status,
        response.status_text,
        headers,
        response.body,
      ],
    )
    .map_err(|e| eyre!("Failed to store cache entry {}: {}", key.url, e))?;

  Ok(())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<(RequestKey, u16, String, String, Vec<u8>, String)> {
  Ok((
    RequestKey::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?),
    row.get(2)?,
    row.get(3)?,
    row.get(4)?,
    row.get(5)?,
    row.get(6)?,
  ))
}

impl CacheStorage for SqliteStorage {
  fn open_namespace(&self, namespace: &str) -> Result<()> {
    self
      .conn()?
      .execute(INSERT_NAMESPACE, params![namespace])
      .map_err(|e| eyre!("Failed to open namespace {}: {}", namespace, e))?;
    Ok(())
  }

  fn has_namespace(&self, namespace: &str) -> Result<bool> {
    let conn = self.conn()?;
    let found: Option<i64> = conn
      .query_row(
        "SELECT 1 FROM cache_namespaces WHERE name = ?",
        params![namespace],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to look up namespace {}: {}", namespace, e))?;
    Ok(found.is_some())
  }

  fn namespaces(&self) -> Result<Vec<String>> {
    let conn = self.conn()?;
    let mut stmt = conn
      .prepare("SELECT name FROM cache_namespaces ORDER BY created_at, rowid")
      .map_err(|e| eyre!("Failed to prepare namespace query: {}", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list namespaces: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read namespace row: {}", e))?;

    Ok(names)
  }

  fn delete_namespace(&self, namespace: &str) -> Result<bool> {
    let mut conn = self.conn()?;
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    tx.execute(
      "DELETE FROM cache_entries WHERE namespace = ?",
      params![namespace],
    )
    .map_err(|e| eyre!("Failed to delete entries of {}: {}", namespace, e))?;

    let removed = tx
      .execute(
        "DELETE FROM cache_namespaces WHERE name = ?",
        params![namespace],
      )
      .map_err(|e| eyre!("Failed to delete namespace {}: {}", namespace, e))?;

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(removed > 0)
  }

  fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<CacheEntry>> {
    let conn = self.conn()?;
    let row = conn
      .query_row(
        "SELECT method, url, status, status_text, headers, body, inserted_at FROM cache_entries
         WHERE namespace = ? AND key_hash = ?",
        params![namespace, key.cache_hash()],
        entry_from_row,
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry {}: {}", key.url, e))?;

    let Some((key, status, status_text, headers, body, inserted_at)) = row else {
      return Ok(None);
    };

    let headers: Vec<(String, String)> = serde_json::from_str(&headers)
      .map_err(|e| eyre!("Failed to deserialize headers of {}: {}", key.url, e))?;

    Ok(Some(CacheEntry {
      key,
      response: Response {
        status,
        status_text,
        headers,
        body,
      },
      inserted_at: parse_datetime(&inserted_at)?,
    }))
  }

  fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<()> {
    self.put_all(namespace, &[(key.clone(), response.clone())])
  }

  fn put_all(&self, namespace: &str, entries: &[(RequestKey, Response)]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    tx.execute(INSERT_NAMESPACE, params![namespace])
      .map_err(|e| eyre!("Failed to open namespace {}: {}", namespace, e))?;

    for (key, response) in entries {
      insert_entry(&tx, namespace, key, response)?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }

  fn entries(&self, namespace: &str) -> Result<Vec<RequestKey>> {
    let conn = self.conn()?;
    let mut stmt = conn
      .prepare(
        "SELECT method, url FROM cache_entries WHERE namespace = ?
         ORDER BY inserted_at, rowid",
      )
      .map_err(|e| eyre!("Failed to prepare entry query: {}", e))?;

    let keys = stmt
      .query_map(params![namespace], |row| {
        Ok(RequestKey::new(
          row.get::<_, String>(0)?,
          row.get::<_, String>(1)?,
        ))
      })
      .map_err(|e| eyre!("Failed to list entries of {}: {}", namespace, e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read entry row: {}", e))?;

    Ok(keys)
  }

  fn trim(&self, namespace: &str, max_entries: usize) -> Result<usize> {
    let conn = self.conn()?;
    let evicted = conn
      .execute(
        "DELETE FROM cache_entries WHERE namespace = ?1 AND rowid IN (
           SELECT rowid FROM cache_entries WHERE namespace = ?1
           ORDER BY inserted_at DESC, rowid DESC
           LIMIT -1 OFFSET ?2
         )",
        params![namespace, max_entries as i64],
      )
      .map_err(|e| eyre!("Failed to trim namespace {}: {}", namespace, e))?;

    Ok(evicted)
  }

  fn load_state(&self, version: &str) -> Result<Option<String>> {
    self
      .conn()?
      .query_row(
        "SELECT state FROM worker_state WHERE version = ?",
        params![version],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read worker state of {}: {}", version, e))
  }

  fn save_state(&self, version: &str, state: &str) -> Result<()> {
    self
      .conn()?
      .execute(
        "INSERT OR REPLACE INTO worker_state (version, state, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![version, state],
      )
      .map_err(|e| eyre!("Failed to save worker state of {}: {}", version, e))?;
    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
