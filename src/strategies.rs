//! Strategy executors: the four cache-vs-network policies.
//!
//! Every strategy resolves to a response; network and store failures are
//! absorbed into the documented fallback chain, never raised. Each network
//! race runs the fetch in a spawned task guarded by a deadline on the join
//! handle, so a fetch that loses the race still completes its namespace
//! write in the background.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::http::{Request, Response};
use crate::net::Fetch;
use crate::routes::Strategy;
use crate::store::{EntryKey, NamespaceStore, Role};
use crate::worker::{write_entry, Worker};

impl<F: Fetch, S: NamespaceStore> Worker<F, S> {
  pub(crate) async fn run_strategy(&self, strategy: Strategy, request: Request) -> Response {
    match strategy {
      Strategy::CacheFirst => self.cache_first(request).await,
      Strategy::NetworkFirst => self.network_first(request).await,
      Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
      Strategy::DocumentFallback => self.document_fallback(request).await,
    }
  }

  /// Stored entry wins outright; hashed asset names make staleness
  /// impossible by construction, so the network is never consulted on a hit.
  async fn cache_first(&self, request: Request) -> Response {
    let key = EntryKey::of(&request);

    if let Some(hit) = self.lookup_entry(&key) {
      return hit.response;
    }

    match self.fetch.fetch(request).await {
      Ok(response) => {
        if response.ok() {
          write_entry(&*self.store, &self.names.name(Role::Assets), &key, &response);
        }
        response
      }
      Err(err) => {
        debug!(url = %key.url, "cache-first miss with network down: {err:#}");
        Response::offline_placeholder()
      }
    }
  }

  /// Network wins unless it errors or outlives the deadline; then the
  /// stored entry, then a synthesized offline error.
  async fn network_first(&self, request: Request) -> Response {
    let key = EntryKey::of(&request);
    let deadline = self.config.network_timeout();

    if let Some(response) = self.fetch_with_deadline(request, deadline, Role::Api).await {
      return response;
    }

    match self.lookup_entry(&key) {
      Some(hit) => {
        info!(url = %key.url, stored_at = %hit.stored_at, "offline, serving from cache");
        hit.response
      }
      None => Response::offline_api(),
    }
  }

  /// Stored entry is returned immediately; the revalidation fetch keeps
  /// running and refreshes STATIC for next time. With nothing stored yet the
  /// caller gets the in-flight network result instead.
  async fn stale_while_revalidate(&self, request: Request) -> Response {
    let key = EntryKey::of(&request);
    let namespace = self.names.name(Role::Static);
    let cached = self.read_entry(Role::Static, &key);

    let fetch = Arc::clone(&self.fetch);
    let store = Arc::clone(&self.store);
    let task_key = key.clone();
    let task_namespace = namespace.clone();
    let revalidation = tokio::spawn(async move {
      let response = fetch.fetch(request).await?;
      if response.ok() {
        write_entry(&*store, &task_namespace, &task_key, &response);
      }
      Ok::<_, color_eyre::Report>(response)
    });

    if let Some(hit) = cached {
      // Revalidation continues in the background; its failure is discarded.
      return hit.response;
    }

    match revalidation.await {
      Ok(Ok(response)) => response,
      Ok(Err(err)) => {
        debug!(url = %key.url, "revalidation fetch failed with empty cache: {err:#}");
        Response::offline_placeholder()
      }
      Err(join_err) => {
        debug!(url = %key.url, "revalidation task failed: {join_err}");
        Response::offline_placeholder()
      }
    }
  }

  /// The default for navigations. Layered fallback: network, stored entry,
  /// the entry document, then a minimal synthesized error document, so a
  /// navigation gets an answer even with an empty cache and no connectivity.
  async fn document_fallback(&self, request: Request) -> Response {
    let key = EntryKey::of(&request);
    let deadline = self.config.navigation_timeout();

    if let Some(response) = self.fetch_with_deadline(request, deadline, Role::Static).await {
      return response;
    }

    if let Some(hit) = self.lookup_entry(&key) {
      return hit.response;
    }

    if let Some(document) = self.offline_document() {
      info!(url = %key.url, "offline navigation answered by entry document");
      return document;
    }

    Response::offline_document(&self.config.app_name)
  }

  /// Race a fetch against a deadline. A successful response is written into
  /// the role's namespace even when the race was already lost; errors,
  /// aborts and timeouts all resolve to `None`.
  async fn fetch_with_deadline(
    &self,
    request: Request,
    deadline: Duration,
    role: Role,
  ) -> Option<Response> {
    let fetch = Arc::clone(&self.fetch);
    let store = Arc::clone(&self.store);
    let namespace = self.names.name(role);
    let key = EntryKey::of(&request);
    let url = key.url.clone();

    let task = tokio::spawn(async move {
      let response = fetch.fetch(request).await?;
      if response.ok() {
        write_entry(&*store, &namespace, &key, &response);
      }
      Ok::<_, color_eyre::Report>(response)
    });

    match tokio::time::timeout(deadline, task).await {
      Ok(Ok(Ok(response))) => Some(response),
      Ok(Ok(Err(err))) => {
        debug!(%url, "fetch failed: {err:#}");
        None
      }
      Ok(Err(join_err)) => {
        debug!(%url, "fetch task failed: {join_err}");
        None
      }
      // Deadline hit; the task keeps running and a late success still
      // lands its write.
      Err(_elapsed) => {
        debug!(%url, "fetch exceeded deadline");
        None
      }
    }
  }

  /// Stored copy of the application's entry document, if any namespace
  /// holds one.
  fn offline_document(&self) -> Option<Response> {
    let url = self.config.resolve(&self.config.offline_page).ok()?;
    let key = EntryKey::get(url.as_str());
    self.lookup_entry(&key).map(|hit| hit.response)
  }
}
