//! Host events driving the worker.
//!
//! The host's event loop translates its platform callbacks into this enum
//! and awaits [`Worker::dispatch`](crate::worker::Worker::dispatch) for each
//! one. Install and activate arrive once per version deployment; the rest as
//! the platform delivers them.

use crate::bridge::NotificationClick;
use crate::clients::ControlMessage;
use crate::http::Request;

/// One platform event, keyed by kind.
#[derive(Debug)]
pub enum Event {
  /// New version deployed; pre-cache the app shell.
  Install,
  /// Take over: prune stale generations and claim open clients.
  Activate,
  /// An intercepted outbound request.
  Fetch(Request),
  /// Inbound push delivery; `None` when the delivery carried no payload.
  Push(Option<Vec<u8>>),
  /// The user clicked a displayed notification.
  NotificationClick(NotificationClick),
  /// Deferred application work is due.
  Sync { tag: String },
  /// Control message from the application.
  Message(ControlMessage),
}
