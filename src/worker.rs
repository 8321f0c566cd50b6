//! The worker: event dispatch and shared state for every component.
//!
//! The host constructs one `Worker` per deployed version and drives it
//! through [`Worker::dispatch`]. Fetch events return a response (or a
//! passthrough decision); everything else is fire-and-forget from the
//! host's point of view.

use color_eyre::Result;
use std::sync::Arc;
use tracing::warn;

use crate::clients::{ClientGateway, NotificationSink};
use crate::config::WorkerConfig;
use crate::event::Event;
use crate::http::Response;
use crate::net::Fetch;
use crate::routes::{RouteDecision, RouteTable};
use crate::store::{EntryKey, NamespaceStore, Namespaces, Role, StoredEntry};

/// Outcome of dispatching one host event.
#[derive(Debug)]
pub enum Handled {
  /// The request is not intercepted; the host performs it unmodified.
  Passthrough,
  /// The intercepted request was answered, from store, network or synthesis.
  Response(Response),
  /// The event required no answer.
  Done,
}

/// The offline cache and request-interception layer.
///
/// Holds the immutable configuration, the compiled routing rules and the
/// seams to the store, the network and the platform. Cloning is cheap; all
/// shared state sits behind `Arc`.
pub struct Worker<F: Fetch, S: NamespaceStore> {
  pub(crate) config: WorkerConfig,
  pub(crate) routes: RouteTable,
  pub(crate) names: Namespaces,
  pub(crate) fetch: Arc<F>,
  pub(crate) store: Arc<S>,
  pub(crate) clients: Arc<dyn ClientGateway>,
  pub(crate) notifier: Arc<dyn NotificationSink>,
}

impl<F: Fetch, S: NamespaceStore> Worker<F, S> {
  pub fn new(
    config: WorkerConfig,
    fetch: Arc<F>,
    store: Arc<S>,
    clients: Arc<dyn ClientGateway>,
    notifier: Arc<dyn NotificationSink>,
  ) -> Result<Self> {
    let routes = RouteTable::new(&config)?;
    let names = Namespaces::new(&config.cache_prefix, &config.version);

    Ok(Self {
      config,
      routes,
      names,
      fetch,
      store,
      clients,
      notifier,
    })
  }

  /// Namespace names for the running version.
  pub fn namespaces(&self) -> &Namespaces {
    &self.names
  }

  /// Dispatch one host event.
  ///
  /// Fetch, push, click and sync events absorb their own failures (the
  /// worst outcome is a synthesized response); install, activate and
  /// control messages surface store corruption to the host.
  pub async fn dispatch(&self, event: Event) -> Result<Handled> {
    match event {
      Event::Install => {
        self.install().await?;
        Ok(Handled::Done)
      }
      Event::Activate => {
        self.activate().await?;
        Ok(Handled::Done)
      }
      Event::Fetch(request) => match self.routes.classify(&request) {
        RouteDecision::Passthrough => Ok(Handled::Passthrough),
        RouteDecision::Run(strategy) => {
          Ok(Handled::Response(self.run_strategy(strategy, request).await))
        }
      },
      Event::Push(data) => {
        self.on_push(data.as_deref());
        Ok(Handled::Done)
      }
      Event::NotificationClick(click) => {
        self.on_notification_click(&click);
        Ok(Handled::Done)
      }
      Event::Sync { tag } => {
        self.on_sync(&tag);
        Ok(Handled::Done)
      }
      Event::Message(message) => {
        self.on_message(message).await?;
        Ok(Handled::Done)
      }
    }
  }

  /// Read an entry from the current namespace for a role, swallowing store
  /// failures.
  pub(crate) fn read_entry(&self, role: Role, key: &EntryKey) -> Option<StoredEntry> {
    let namespace = self.names.name(role);
    match self.store.get(&namespace, key) {
      Ok(entry) => entry,
      Err(err) => {
        warn!(%namespace, "cache read failed: {err:#}");
        None
      }
    }
  }

  /// Read an entry from any namespace, swallowing store failures.
  pub(crate) fn lookup_entry(&self, key: &EntryKey) -> Option<StoredEntry> {
    match self.store.lookup(key) {
      Ok(entry) => entry,
      Err(err) => {
        warn!("cache lookup failed: {err:#}");
        None
      }
    }
  }
}

/// Fire-and-forget write used by strategies, including from background
/// tasks that outlive the original request.
pub(crate) fn write_entry<S: NamespaceStore>(
  store: &S,
  namespace: &str,
  key: &EntryKey,
  response: &Response,
) {
  if let Err(err) = store.put(namespace, key, response) {
    warn!(%namespace, "cache write failed: {err:#}");
  }
}

impl<F: Fetch, S: NamespaceStore> Clone for Worker<F, S> {
  fn clone(&self) -> Self {
    Self {
      config: self.config.clone(),
      routes: self.routes.clone(),
      names: self.names.clone(),
      fetch: Arc::clone(&self.fetch),
      store: Arc::clone(&self.store),
      clients: Arc::clone(&self.clients),
      notifier: Arc::clone(&self.notifier),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::{Method, Request};
  use crate::store::MemoryStore;
  use crate::testutil::{RecordingGateway, RecordingNotifier, StubFetch};
  use url::Url;

  fn worker_with(
    config: WorkerConfig,
    fetch: StubFetch,
  ) -> (Worker<StubFetch, MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let worker = Worker::new(
      config,
      Arc::new(fetch),
      Arc::clone(&store),
      Arc::new(RecordingGateway::new()),
      Arc::new(RecordingNotifier::new()),
    )
    .unwrap();
    (worker, store)
  }

  #[tokio::test]
  async fn test_never_cache_request_leaves_no_entry() {
    // Even with a network that answers, nothing may be stored.
    let fetch = StubFetch::ok(Response::new(200, b"token".to_vec()));
    let (worker, store) = worker_with(WorkerConfig::default(), fetch);

    let request = Request::get(Url::parse("https://backend.example.com/auth/v1/token").unwrap());
    let handled = worker.dispatch(Event::Fetch(request)).await.unwrap();

    assert!(matches!(handled, Handled::Passthrough));
    for namespace in store.names().unwrap() {
      assert!(store.is_empty(&namespace));
    }
  }

  #[tokio::test]
  async fn test_offline_auth_request_never_served_stale() {
    // A stale entry exists from a prior relaxed configuration; the request
    // must still pass through rather than being answered from it.
    let (worker, store) = worker_with(WorkerConfig::default(), StubFetch::fail());
    let key = EntryKey::get("https://backend.example.com/auth/v1/token");
    store
      .put("app-api-v0.0.9", &key, &Response::new(200, b"stale token".to_vec()))
      .unwrap();

    let request = Request::get(Url::parse("https://backend.example.com/auth/v1/token").unwrap());
    let handled = worker.dispatch(Event::Fetch(request)).await.unwrap();

    assert!(matches!(handled, Handled::Passthrough));
  }

  #[tokio::test]
  async fn test_non_get_passes_through() {
    let (worker, _store) = worker_with(WorkerConfig::default(), StubFetch::fail());
    let request = Request::new(
      Method::Post,
      Url::parse("https://app.example.com/orders").unwrap(),
    );

    let handled = worker.dispatch(Event::Fetch(request)).await.unwrap();
    assert!(matches!(handled, Handled::Passthrough));
  }
}
