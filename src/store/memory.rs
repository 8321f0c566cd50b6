//! In-memory namespace store, used by embedded hosts and tests.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{EntryKey, NamespaceStore, StoredEntry};
use crate::http::Response;

/// Namespace store backed by a map of maps.
#[derive(Default)]
pub struct MemoryStore {
  namespaces: RwLock<HashMap<String, HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of entries in a namespace, zero if it does not exist.
  pub fn len(&self, namespace: &str) -> usize {
    self
      .namespaces
      .read()
      .map(|namespaces| {
        namespaces
          .get(namespace)
          .map(|entries| entries.len())
          .unwrap_or(0)
      })
      .unwrap_or(0)
  }

  pub fn is_empty(&self, namespace: &str) -> bool {
    self.len(namespace) == 0
  }
}

impl NamespaceStore for MemoryStore {
  fn open(&self, namespace: &str) -> Result<()> {
    let mut namespaces = self
      .namespaces
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    namespaces.entry(namespace.to_string()).or_default();
    Ok(())
  }

  fn put(&self, namespace: &str, key: &EntryKey, response: &Response) -> Result<()> {
    let mut namespaces = self
      .namespaces
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let entries = namespaces.entry(namespace.to_string()).or_default();
    entries.insert(
      key.canonical(),
      StoredEntry {
        response: response.clone(),
        stored_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn get(&self, namespace: &str, key: &EntryKey) -> Result<Option<StoredEntry>> {
    let namespaces = self
      .namespaces
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(
      namespaces
        .get(namespace)
        .and_then(|entries| entries.get(&key.canonical()))
        .cloned(),
    )
  }

  fn lookup(&self, key: &EntryKey) -> Result<Option<StoredEntry>> {
    let canonical = key.canonical();
    let namespaces = self
      .namespaces
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(
      namespaces
        .values()
        .find_map(|entries| entries.get(&canonical))
        .cloned(),
    )
  }

  fn delete(&self, namespace: &str) -> Result<()> {
    let mut namespaces = self
      .namespaces
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    namespaces.remove(namespace);
    Ok(())
  }

  fn names(&self) -> Result<Vec<String>> {
    let namespaces = self
      .namespaces
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(namespaces.keys().cloned().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry_key(url: &str) -> EntryKey {
    EntryKey::get(url)
  }

  #[test]
  fn test_put_get_roundtrip() {
    let store = MemoryStore::new();
    let key = entry_key("https://app.example.com/a.png");
    let response = Response::new(200, b"img".to_vec());

    store.put("ns", &key, &response).unwrap();

    let hit = store.get("ns", &key).unwrap().unwrap();
    assert_eq!(hit.response, response);
  }

  #[test]
  fn test_put_overwrites_never_appends() {
    let store = MemoryStore::new();
    let key = entry_key("https://app.example.com/data");

    store.put("ns", &key, &Response::new(200, b"old".to_vec())).unwrap();
    store.put("ns", &key, &Response::new(200, b"new".to_vec())).unwrap();

    assert_eq!(store.len("ns"), 1);
    let hit = store.get("ns", &key).unwrap().unwrap();
    assert_eq!(hit.response.body, b"new".to_vec());
  }

  #[test]
  fn test_lookup_searches_every_namespace() {
    let store = MemoryStore::new();
    let key = entry_key("https://app.example.com/x");
    store.put("other-ns", &key, &Response::new(200, vec![])).unwrap();

    assert!(store.lookup(&key).unwrap().is_some());
    assert!(store.get("ns", &key).unwrap().is_none());
  }

  #[test]
  fn test_delete_is_idempotent() {
    let store = MemoryStore::new();
    store.open("ns").unwrap();
    store.delete("ns").unwrap();
    // Deleting again must not error
    store.delete("ns").unwrap();
    assert!(store.names().unwrap().is_empty());
  }

  #[test]
  fn test_keys_distinguish_methods() {
    let store = MemoryStore::new();
    let get = EntryKey::get("https://app.example.com/x");
    let head = EntryKey {
      method: crate::http::Method::Head,
      url: "https://app.example.com/x".to_string(),
    };
    store.put("ns", &get, &Response::new(200, b"body".to_vec())).unwrap();

    assert!(store.get("ns", &head).unwrap().is_none());
  }
}
