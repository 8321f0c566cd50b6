//! Platform seams: open application windows, the control-message channel,
//! and the notification display.
//!
//! The host implements these; the crate only decides what to call and when.
//! Tracing-backed implementations are provided for the CLI, where there is
//! no window system to talk to.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bridge::Notification;

/// An open application window, as reported by the host.
#[derive(Debug, Clone)]
pub struct WindowClient {
  pub id: u64,
  pub url: String,
}

/// Message emitted to every open foreground connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AppMessage {
  /// Deferred application work is due. The application owns the resync; the
  /// layer only relays the tag.
  #[serde(rename = "BACKGROUND_SYNC")]
  BackgroundSyncDue { tag: String },
}

/// Control message accepted from the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
  /// Take over immediately instead of waiting for old clients to close.
  #[serde(rename = "SKIP_WAITING")]
  ForceActivate,
  /// Drop the API namespace only, leaving STATIC and ASSETS intact. Sent
  /// after a manual user-triggered refresh.
  #[serde(rename = "CACHE_INVALIDATE")]
  InvalidateApiNamespace,
}

/// Host-side registry of open application windows.
pub trait ClientGateway: Send + Sync {
  /// Take control of every open connection so the current version governs
  /// all subsequent requests.
  fn claim(&self);

  fn windows(&self) -> Vec<WindowClient>;

  fn focus(&self, id: u64);

  fn navigate(&self, id: u64, url: &str);

  fn open_window(&self, url: &str);

  fn broadcast(&self, message: &AppMessage);
}

/// Host-side notification display.
pub trait NotificationSink: Send + Sync {
  fn show(&self, notification: &Notification);
}

/// Gateway for hosts without a window system; every call is logged and
/// otherwise ignored.
pub struct TracingGateway;

impl ClientGateway for TracingGateway {
  fn claim(&self) {
    info!("claiming open clients");
  }

  fn windows(&self) -> Vec<WindowClient> {
    Vec::new()
  }

  fn focus(&self, id: u64) {
    info!(id, "focus window");
  }

  fn navigate(&self, id: u64, url: &str) {
    info!(id, url, "navigate window");
  }

  fn open_window(&self, url: &str) {
    info!(url, "open window");
  }

  fn broadcast(&self, message: &AppMessage) {
    info!(?message, "broadcast to clients");
  }
}

/// Notification sink that only logs.
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
  fn show(&self, notification: &Notification) {
    info!(title = %notification.title, tag = %notification.tag, "show notification");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_control_message_wire_names() {
    let msg: ControlMessage = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
    assert_eq!(msg, ControlMessage::ForceActivate);

    let msg: ControlMessage = serde_json::from_str(r#"{"type":"CACHE_INVALIDATE"}"#).unwrap();
    assert_eq!(msg, ControlMessage::InvalidateApiNamespace);
  }

  #[test]
  fn test_app_message_wire_shape() {
    let msg = AppMessage::BackgroundSyncDue {
      tag: "sync-orders".to_string(),
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "BACKGROUND_SYNC");
    assert_eq!(json["tag"], "sync-orders");
  }
}
