//! Client-side offline cache and request-interception layer.
//!
//! Sits between the application and the network, deciding per request
//! whether to answer from a local store, from the network, or a blend of
//! both. Survives version upgrades (wholesale namespace eviction),
//! connectivity loss (layered fallbacks ending in synthesized responses)
//! and background delivery of notifications, without ever turning a caching
//! failure into an application failure.
//!
//! The host drives a [`Worker`] through [`Event`]s; the network, the
//! namespace store and the window/notification platform are traits the host
//! implements (defaults are provided for the CLI).

pub mod bridge;
pub mod clients;
pub mod commands;
pub mod config;
pub mod event;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod routes;
pub mod store;
pub mod strategies;
pub mod worker;

#[cfg(test)]
mod testutil;

pub use config::WorkerConfig;
pub use event::Event;
pub use worker::{Handled, Worker};
