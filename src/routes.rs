//! Request classification: which strategy answers an intercepted request.
//!
//! Rules are consulted in a fixed priority order and short-circuit at the
//! first match. Anything that must always reflect live state (or is not
//! cacheable in principle) passes through untouched.

use color_eyre::{eyre::eyre, Result};
use regex::Regex;

use crate::config::WorkerConfig;
use crate::http::Request;

/// The cache-vs-network policy applied to a class of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  CacheFirst,
  NetworkFirst,
  StaleWhileRevalidate,
  /// Network-first with the layered document fallback; the default for
  /// unmatched requests (navigations, in practice).
  DocumentFallback,
}

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
  /// Do not intercept; the host performs the fetch unmodified.
  Passthrough,
  Run(Strategy),
}

/// Compiled routing rules for one configuration.
#[derive(Clone)]
pub struct RouteTable {
  dev_mode: bool,
  never_cache: Vec<Regex>,
  network_first: Vec<Regex>,
  cache_first: Vec<Regex>,
  stale_while_revalidate: Vec<Regex>,
}

impl RouteTable {
  pub fn new(config: &WorkerConfig) -> Result<Self> {
    Ok(Self {
      dev_mode: config.is_dev_origin(),
      never_cache: compile(&config.routes.never_cache)?,
      network_first: compile(&config.routes.network_first)?,
      cache_first: compile(&config.routes.cache_first)?,
      stale_while_revalidate: compile(&config.routes.stale_while_revalidate)?,
    })
  }

  /// Classify a request. Order matters and mirrors the guard chain:
  /// dev origin, non-GET, never-cache, then the strategy lists.
  pub fn classify(&self, request: &Request) -> RouteDecision {
    if self.dev_mode {
      return RouteDecision::Passthrough;
    }

    if !request.method.is_get() {
      return RouteDecision::Passthrough;
    }

    let url = request.url.as_str();

    if matches_any(&self.never_cache, url) {
      return RouteDecision::Passthrough;
    }

    if matches_any(&self.network_first, url) {
      return RouteDecision::Run(Strategy::NetworkFirst);
    }
    if matches_any(&self.cache_first, url) {
      return RouteDecision::Run(Strategy::CacheFirst);
    }
    if matches_any(&self.stale_while_revalidate, url) {
      return RouteDecision::Run(Strategy::StaleWhileRevalidate);
    }

    RouteDecision::Run(Strategy::DocumentFallback)
  }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
  patterns
    .iter()
    .map(|p| Regex::new(p).map_err(|e| eyre!("Invalid route pattern '{}': {}", p, e)))
    .collect()
}

fn matches_any(rules: &[Regex], url: &str) -> bool {
  rules.iter().any(|rule| rule.is_match(url))
}
