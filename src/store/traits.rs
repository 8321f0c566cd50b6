//! Core trait and types for namespace storage backends.

use chrono::{DateTime, Utc};
use color_eyre::Result;

use crate::http::{Method, Request, Response};

/// Key of a cached entry: the method and full URL of the request it answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
  pub method: Method,
  pub url: String,
}

impl EntryKey {
  pub fn of(request: &Request) -> Self {
    Self {
      method: request.method,
      url: request.url.to_string(),
    }
  }

  pub fn get(url: &str) -> Self {
    Self {
      method: Method::Get,
      url: url.to_string(),
    }
  }

  /// Canonical string form, used by backends as the storage key.
  pub fn canonical(&self) -> String {
    format!("{} {}", self.method, self.url)
  }
}

/// A cached response together with the instant it was stored.
///
/// The timestamp is informational (CLI listings, offline-mode logging); it is
/// never consulted for expiry. Version bumps are the only eviction mechanism.
#[derive(Debug, Clone)]
pub struct StoredEntry {
  pub response: Response,
  pub stored_at: DateTime<Utc>,
}

/// Trait for namespace storage backends.
///
/// Operations are independent and idempotent; the host may drive concurrent
/// lookups and writes for distinct requests with no ordering guarantee, so
/// implementations rely on interior mutability only.
pub trait NamespaceStore: Send + Sync + 'static {
  /// Create the namespace if it does not exist yet.
  fn open(&self, namespace: &str) -> Result<()>;

  /// Store a response under the key, creating the namespace lazily.
  /// Writing an existing key overwrites; there is no history.
  fn put(&self, namespace: &str, key: &EntryKey, response: &Response) -> Result<()>;

  /// Look up an entry within one namespace.
  fn get(&self, namespace: &str, key: &EntryKey) -> Result<Option<StoredEntry>>;

  /// Look up an entry across every namespace.
  fn lookup(&self, key: &EntryKey) -> Result<Option<StoredEntry>>;

  /// Delete a namespace and all its entries. Deleting a nonexistent
  /// namespace is not an error.
  fn delete(&self, namespace: &str) -> Result<()>;

  /// Names of every namespace currently present, any version.
  fn names(&self) -> Result<Vec<String>>;
}
