//! Install and activate: the once-per-deployment transitions.

use color_eyre::Result;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::http::Request;
use crate::net::Fetch;
use crate::store::{EntryKey, NamespaceStore, Role};
use crate::worker::{write_entry, Worker};

impl<F: Fetch, S: NamespaceStore> Worker<F, S> {
  /// Pre-cache the app shell into the STATIC namespace for this version.
  ///
  /// Shell URLs are fetched concurrently. A URL that fails to fetch is
  /// logged and skipped; no install-time failure is allowed to block a
  /// deploy, so install completes and the new version signals ready without
  /// waiting for old clients to close.
  pub async fn install(&self) -> Result<()> {
    let namespace = self.names.name(Role::Static);
    info!(version = %self.config.version, %namespace, "installing");
    self.store.open(&namespace)?;

    let fetches = self.config.app_shell.iter().map(|path| {
      let namespace = namespace.clone();
      async move {
        let url = match self.config.resolve(path) {
          Ok(url) => url,
          Err(err) => {
            warn!(%path, "skipping unresolvable shell path: {err:#}");
            return false;
          }
        };

        let key = EntryKey::get(url.as_str());
        match self.fetch.fetch(Request::get(url)).await {
          Ok(response) if response.ok() => {
            write_entry(&*self.store, &namespace, &key, &response);
            true
          }
          Ok(response) => {
            warn!(url = %key.url, status = response.status, "shell fetch returned an error status");
            false
          }
          Err(err) => {
            warn!(url = %key.url, "shell fetch failed: {err:#}");
            false
          }
        }
      }
    });

    let cached = join_all(fetches).await.into_iter().filter(|ok| *ok).count();
    info!(
      cached,
      total = self.config.app_shell.len(),
      "install complete"
    );

    Ok(())
  }

  /// Prune every namespace not valid for the current version, then claim
  /// all open clients.
  ///
  /// This is the sole eviction mechanism: bumping the version invalidates
  /// all prior generations atomically. There is no per-entry expiry and no
  /// LRU policy.
  pub async fn activate(&self) -> Result<()> {
    let valid: HashSet<String> = self.names.current().into_iter().collect();

    for name in self.store.names()? {
      if !valid.contains(&name) {
        info!(%name, "removing stale namespace");
        if let Err(err) = self.store.delete(&name) {
          warn!(%name, "failed to remove stale namespace: {err:#}");
        }
      }
    }

    self.clients.claim();
    info!(version = %self.config.version, "activated, controlling all clients");

    Ok(())
  }
}
