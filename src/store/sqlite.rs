//! SQLite-backed namespace store.
//!
//! Persists cached responses across process restarts so the offline cache
//! survives a relaunch. One row per entry, keyed by namespace plus a SHA-256
//! hash of the canonical (method, URL) key for a stable fixed-length primary
//! key.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{EntryKey, NamespaceStore, StoredEntry};
use crate::http::Response;

pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open the store at an explicit path, creating parent directories.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("cachefront").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for namespace and entry tables.
const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS namespaces (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS entries (
    namespace TEXT NOT NULL,
    key_hash TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers BLOB NOT NULL,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (namespace, key_hash)
);

CREATE INDEX IF NOT EXISTS idx_entries_key ON entries(key_hash);
"#;

/// SHA256 hash of the canonical entry key, for stable fixed-length keys.
fn key_hash(key: &EntryKey) -> String {
  let mut hasher = Sha256::new();
  hasher.update(key.canonical().as_bytes());
  hex::encode(hasher.finalize())
}

fn row_to_entry(
  status: u16,
  headers: Vec<u8>,
  body: Vec<u8>,
  stored_at: String,
) -> Result<StoredEntry> {
  let headers: Vec<(String, String)> =
    serde_json::from_slice(&headers).map_err(|e| eyre!("Failed to parse headers: {}", e))?;

  Ok(StoredEntry {
    response: Response {
      status,
      headers,
      body,
    },
    stored_at: parse_datetime(&stored_at)?,
  })
}

impl NamespaceStore for SqliteStore {
  fn open(&self, namespace: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR IGNORE INTO namespaces (name) VALUES (?)",
        params![namespace],
      )
      .map_err(|e| eyre!("Failed to create namespace: {}", e))?;

    Ok(())
  }

  fn put(&self, namespace: &str, key: &EntryKey, response: &Response) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let headers = serde_json::to_vec(&response.headers)
      .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

    conn
      .execute(
        "INSERT OR IGNORE INTO namespaces (name) VALUES (?)",
        params![namespace],
      )
      .map_err(|e| eyre!("Failed to create namespace: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO entries (namespace, key_hash, method, url, status, headers, body, stored_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'))",
        params![
          namespace,
          key_hash(key),
          key.method.as_str(),
          key.url,
          response.status,
          headers,
          response.body,
        ],
      )
      .map_err(|e| eyre!("Failed to store entry: {}", e))?;

    Ok(())
  }

  fn get(&self, namespace: &str, key: &EntryKey) -> Result<Option<StoredEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT status, headers, body, stored_at FROM entries
         WHERE namespace = ? AND key_hash = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(u16, Vec<u8>, Vec<u8>, String)> = stmt
      .query_row(params![namespace, key_hash(key)], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
      })
      .ok();

    match row {
      Some((status, headers, body, stored_at)) => {
        Ok(Some(row_to_entry(status, headers, body, stored_at)?))
      }
      None => Ok(None),
    }
  }

  fn lookup(&self, key: &EntryKey) -> Result<Option<StoredEntry>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT status, headers, body, stored_at FROM entries
         WHERE key_hash = ? LIMIT 1",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(u16, Vec<u8>, Vec<u8>, String)> = stmt
      .query_row(params![key_hash(key)], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
      })
      .ok();

    match row {
      Some((status, headers, body, stored_at)) => {
        Ok(Some(row_to_entry(status, headers, body, stored_at)?))
      }
      None => Ok(None),
    }
  }

  fn delete(&self, namespace: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM entries WHERE namespace = ?", params![namespace])
      .map_err(|e| eyre!("Failed to delete entries: {}", e))?;

    conn
      .execute("DELETE FROM namespaces WHERE name = ?", params![namespace])
      .map_err(|e| eyre!("Failed to delete namespace: {}", e))?;

    Ok(())
  }

  fn names(&self) -> Result<Vec<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT name FROM namespaces ORDER BY name")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names: Vec<String> = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list namespaces: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open_at(&dir.path().join("cache.db")).unwrap();
    (dir, store)
  }

  #[test]
  fn test_roundtrip_preserves_response() {
    let (_dir, store) = temp_store();
    let key = EntryKey::get("https://app.example.com/data.json");
    let response = Response::new(200, b"{\"a\":1}".to_vec()).with_header("Content-Type", "application/json");

    store.put("app-api-v1", &key, &response).unwrap();

    let hit = store.get("app-api-v1", &key).unwrap().unwrap();
    assert_eq!(hit.response, response);
  }

  #[test]
  fn test_put_creates_namespace_lazily() {
    let (_dir, store) = temp_store();
    let key = EntryKey::get("https://app.example.com/a.png");
    store.put("app-assets-v1", &key, &Response::new(200, vec![])).unwrap();

    assert_eq!(store.names().unwrap(), vec!["app-assets-v1".to_string()]);
  }

  #[test]
  fn test_delete_namespace_removes_entries() {
    let (_dir, store) = temp_store();
    let key = EntryKey::get("https://app.example.com/a");
    store.put("app-api-v1", &key, &Response::new(200, vec![])).unwrap();
    store.put("app-static-v1", &key, &Response::new(200, vec![])).unwrap();

    store.delete("app-api-v1").unwrap();

    assert!(store.get("app-api-v1", &key).unwrap().is_none());
    // Entry under the other namespace survives
    assert!(store.get("app-static-v1", &key).unwrap().is_some());
    assert_eq!(store.names().unwrap(), vec!["app-static-v1".to_string()]);
  }

  #[test]
  fn test_delete_nonexistent_is_ok() {
    let (_dir, store) = temp_store();
    store.delete("no-such-namespace").unwrap();
  }

  #[test]
  fn test_lookup_across_namespaces() {
    let (_dir, store) = temp_store();
    let key = EntryKey::get("https://app.example.com/logo.svg");
    store.put("app-assets-v1", &key, &Response::new(200, b"svg".to_vec())).unwrap();

    let hit = store.lookup(&key).unwrap().unwrap();
    assert_eq!(hit.response.body, b"svg".to_vec());
  }

  #[test]
  fn test_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let key = EntryKey::get("https://app.example.com/");

    {
      let store = SqliteStore::open_at(&path).unwrap();
      store.put("app-static-v1", &key, &Response::new(200, b"shell".to_vec())).unwrap();
    }

    let store = SqliteStore::open_at(&path).unwrap();
    let hit = store.get("app-static-v1", &key).unwrap().unwrap();
    assert_eq!(hit.response.body, b"shell".to_vec());
  }
}
