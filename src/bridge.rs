//! Notification and sync bridge.
//!
//! Translates platform delivery events into host calls: push payloads into
//! displayed notifications, notification clicks into window focus or
//! navigation, background-sync tags into broadcast messages. It performs no
//! business resync itself; the application owns the retry policy.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clients::{AppMessage, ControlMessage};
use crate::net::Fetch;
use crate::store::{NamespaceStore, Role};
use crate::worker::Worker;

/// Structured push payload as produced upstream. Every field is optional;
/// absent fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
  pub title: Option<String>,
  pub body: Option<String>,
  pub tag: Option<String>,
  #[serde(default)]
  pub data: PushData,
  #[serde(default)]
  pub actions: Vec<NotificationAction>,
  #[serde(default, rename = "requireInteraction")]
  pub require_interaction: Option<bool>,
}

/// Opaque payload data carried through to the click handler. Only the URL is
/// interpreted; everything else passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushData {
  pub url: Option<String>,
  #[serde(flatten)]
  pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
  pub action: String,
  pub title: String,
}

/// A notification ready for display, every field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
  pub title: String,
  pub body: String,
  pub icon: String,
  pub badge: String,
  pub tag: String,
  pub data: PushData,
  pub actions: Vec<NotificationAction>,
  pub require_interaction: bool,
  pub vibrate: Vec<u32>,
}

/// A click on a displayed notification, as reported by the platform.
#[derive(Debug, Clone, Default)]
pub struct NotificationClick {
  /// Action button identifier; `None` for a click on the body.
  pub action: Option<String>,
  pub data: PushData,
}

impl<F: Fetch, S: NamespaceStore> Worker<F, S> {
  /// Handle an inbound push delivery.
  ///
  /// A malformed payload is never dropped silently: parse failures
  /// substitute a minimal payload with the raw text as body, so the user at
  /// least sees a generic notification. Delivery without any payload is
  /// ignored.
  pub(crate) fn on_push(&self, data: Option<&[u8]>) {
    let Some(bytes) = data else {
      return;
    };

    let payload = match serde_json::from_slice::<PushPayload>(bytes) {
      Ok(payload) => payload,
      Err(err) => {
        debug!("push payload is not structured, showing generic notification: {err}");
        PushPayload {
          body: Some(String::from_utf8_lossy(bytes).into_owned()),
          ..PushPayload::default()
        }
      }
    };

    let notification = self.resolve_notification(payload);
    self.notifier.show(&notification);
  }

  /// Derive the displayed notification from payload fields, defaulting each
  /// absent field from the configuration.
  fn resolve_notification(&self, payload: PushPayload) -> Notification {
    let defaults = &self.config.notifications;

    let actions = if payload.actions.is_empty() {
      defaults
        .actions
        .iter()
        .map(|a| NotificationAction {
          action: a.action.clone(),
          title: a.title.clone(),
        })
        .collect()
    } else {
      payload.actions
    };

    Notification {
      title: payload.title.unwrap_or_else(|| self.config.app_name.clone()),
      body: payload.body.unwrap_or_else(|| "New notification".to_string()),
      icon: defaults.icon.clone(),
      badge: defaults.badge.clone(),
      tag: payload.tag.unwrap_or_else(|| defaults.tag.clone()),
      data: payload.data,
      actions,
      require_interaction: payload
        .require_interaction
        .unwrap_or(defaults.require_interaction),
      vibrate: defaults.vibrate.clone(),
    }
  }

  /// Route a notification click to an application window.
  ///
  /// An existing same-origin window is focused and navigated to the payload
  /// URL; otherwise a new window opens there. An explicit dismiss action
  /// closes without navigating.
  pub(crate) fn on_notification_click(&self, click: &NotificationClick) {
    if click.action.as_deref() == Some("dismiss") {
      return;
    }

    let url = click
      .data
      .url
      .clone()
      .unwrap_or_else(|| self.config.notifications.url.clone());

    let existing = self
      .clients
      .windows()
      .into_iter()
      .find(|window| window.url.contains(&self.config.origin));

    match existing {
      Some(window) => {
        self.clients.focus(window.id);
        self.clients.navigate(window.id, &url);
      }
      None => self.clients.open_window(&url),
    }
  }

  /// Relay a background-sync delivery to every open foreground connection.
  /// The tag is opaque here; the application interprets it.
  pub(crate) fn on_sync(&self, tag: &str) {
    if !self.config.sync_tags.is_empty()
      && !self.config.sync_tags.iter().any(|known| known == tag)
    {
      debug!(%tag, "ignoring unknown sync tag");
      return;
    }

    info!(%tag, "background sync due, notifying clients");
    self.clients.broadcast(&AppMessage::BackgroundSyncDue {
      tag: tag.to_string(),
    });
  }

  /// Handle an inbound application control message.
  pub(crate) async fn on_message(&self, message: ControlMessage) -> Result<()> {
    match message {
      ControlMessage::ForceActivate => self.activate().await,
      ControlMessage::InvalidateApiNamespace => {
        let namespace = self.names.name(Role::Api);
        info!(%namespace, "invalidating API namespace on request");
        if let Err(err) = self.store.delete(&namespace) {
          warn!(%namespace, "failed to invalidate API namespace: {err:#}");
        }
        Ok(())
      }
    }
  }
}
