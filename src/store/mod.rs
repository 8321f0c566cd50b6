//! Versioned cache namespaces and their storage backends.
//!
//! The layer owns a small fixed set of named stores, one per role, each
//! tagged with the deployed version. Eviction is wholesale: activation
//! deletes every namespace whose name is not in the current set. There is no
//! per-entry expiry and no LRU.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{EntryKey, NamespaceStore, StoredEntry};

/// Role of a namespace within the fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  /// HTML, JS, CSS build artifacts and the app shell.
  Static,
  /// Images, fonts, icons.
  Assets,
  /// API responses, short-lived by nature of version bumps.
  Api,
  /// Offline fallback documents.
  Offline,
}

impl Role {
  pub const ALL: [Role; 4] = [Role::Static, Role::Assets, Role::Api, Role::Offline];

  pub fn slug(&self) -> &'static str {
    match self {
      Role::Static => "static",
      Role::Assets => "assets",
      Role::Api => "api",
      Role::Offline => "offline",
    }
  }
}

/// Namespace naming for one deployed version.
///
/// Exactly one namespace per role is current at any time; every other name
/// in the store is stale and eligible for deletion on activation.
#[derive(Debug, Clone)]
pub struct Namespaces {
  prefix: String,
  version: String,
}

impl Namespaces {
  pub fn new(prefix: &str, version: &str) -> Self {
    Self {
      prefix: prefix.to_string(),
      version: version.to_string(),
    }
  }

  /// Name of the current namespace for a role.
  pub fn name(&self, role: Role) -> String {
    format!("{}-{}-{}", self.prefix, role.slug(), self.version)
  }

  /// The complete set of names valid for the current version.
  pub fn current(&self) -> Vec<String> {
    Role::ALL.iter().map(|role| self.name(*role)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_namespace_names_carry_version() {
    let names = Namespaces::new("app", "v3.0.0");
    assert_eq!(names.name(Role::Static), "app-static-v3.0.0");
    assert_eq!(names.name(Role::Api), "app-api-v3.0.0");
  }

  #[test]
  fn test_current_set_has_one_name_per_role() {
    let names = Namespaces::new("app", "v1");
    let current = names.current();
    assert_eq!(current.len(), 4);
    assert!(current.contains(&"app-offline-v1".to_string()));
  }

  #[test]
  fn test_version_bump_changes_every_name() {
    let v1 = Namespaces::new("app", "v1");
    let v2 = Namespaces::new("app", "v2");
    for name in v1.current() {
      assert!(!v2.current().contains(&name));
    }
  }
}
