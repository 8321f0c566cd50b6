//! Shared test doubles for the network and platform seams.

use color_eyre::{eyre::eyre, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::bridge::Notification;
use crate::clients::{AppMessage, ClientGateway, NotificationSink, WindowClient};
use crate::http::{Request, Response};
use crate::net::Fetch;

/// Scripted fetch behavior.
#[derive(Debug, Clone)]
enum Behavior {
  Respond(Response),
  Fail,
  Delayed(Duration, Response),
}

/// Fetch double with a default behavior, optional per-URL overrides and a
/// call counter.
pub(crate) struct StubFetch {
  default: Behavior,
  overrides: Mutex<Vec<(String, Behavior)>>,
  calls: AtomicU32,
}

impl StubFetch {
  /// Every fetch succeeds with a clone of the given response.
  pub(crate) fn ok(response: Response) -> Self {
    Self::with_behavior(Behavior::Respond(response))
  }

  /// Every fetch fails, as if the network were unreachable.
  pub(crate) fn fail() -> Self {
    Self::with_behavior(Behavior::Fail)
  }

  /// Every fetch succeeds after the given delay.
  pub(crate) fn delayed(delay: Duration, response: Response) -> Self {
    Self::with_behavior(Behavior::Delayed(delay, response))
  }

  fn with_behavior(default: Behavior) -> Self {
    Self {
      default,
      overrides: Mutex::new(Vec::new()),
      calls: AtomicU32::new(0),
    }
  }

  /// Fail fetches of one specific URL while keeping the default elsewhere.
  pub(crate) fn failing_for(self, url: &str) -> Self {
    self
      .overrides
      .lock()
      .unwrap()
      .push((url.to_string(), Behavior::Fail));
    self
  }

  /// Number of fetches issued so far.
  pub(crate) fn calls(&self) -> u32 {
    self.calls.load(Ordering::SeqCst)
  }
}

impl Fetch for StubFetch {
  async fn fetch(&self, request: Request) -> Result<Response> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    let url = request.url.to_string();
    let behavior = {
      let overrides = self.overrides.lock().unwrap();
      overrides
        .iter()
        .find(|(u, _)| *u == url)
        .map(|(_, b)| b.clone())
        .unwrap_or_else(|| self.default.clone())
    };

    match behavior {
      Behavior::Respond(response) => Ok(response),
      Behavior::Fail => Err(eyre!("connection refused: {}", url)),
      Behavior::Delayed(delay, response) => {
        tokio::time::sleep(delay).await;
        Ok(response)
      }
    }
  }
}

/// Gateway double recording every call.
#[derive(Default)]
pub(crate) struct RecordingGateway {
  claims: AtomicU32,
  windows: Mutex<Vec<WindowClient>>,
  focused: Mutex<Vec<u64>>,
  navigations: Mutex<Vec<(u64, String)>>,
  opened: Mutex<Vec<String>>,
  broadcasts: Mutex<Vec<AppMessage>>,
}

impl RecordingGateway {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn set_windows(&self, windows: Vec<WindowClient>) {
    *self.windows.lock().unwrap() = windows;
  }

  pub(crate) fn claims(&self) -> u32 {
    self.claims.load(Ordering::SeqCst)
  }

  pub(crate) fn focused(&self) -> Vec<u64> {
    self.focused.lock().unwrap().clone()
  }

  pub(crate) fn navigations(&self) -> Vec<(u64, String)> {
    self.navigations.lock().unwrap().clone()
  }

  pub(crate) fn opened(&self) -> Vec<String> {
    self.opened.lock().unwrap().clone()
  }

  pub(crate) fn broadcasts(&self) -> Vec<AppMessage> {
    self.broadcasts.lock().unwrap().clone()
  }
}

impl ClientGateway for RecordingGateway {
  fn claim(&self) {
    self.claims.fetch_add(1, Ordering::SeqCst);
  }

  fn windows(&self) -> Vec<WindowClient> {
    self.windows.lock().unwrap().clone()
  }

  fn focus(&self, id: u64) {
    self.focused.lock().unwrap().push(id);
  }

  fn navigate(&self, id: u64, url: &str) {
    self.navigations.lock().unwrap().push((id, url.to_string()));
  }

  fn open_window(&self, url: &str) {
    self.opened.lock().unwrap().push(url.to_string());
  }

  fn broadcast(&self, message: &AppMessage) {
    self.broadcasts.lock().unwrap().push(message.clone());
  }
}

/// Notification sink double recording what was shown.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
  shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn shown(&self) -> Vec<Notification> {
    self.shown.lock().unwrap().clone()
  }
}

impl NotificationSink for RecordingNotifier {
  fn show(&self, notification: &Notification) {
    self.shown.lock().unwrap().push(notification.clone());
  }
}
