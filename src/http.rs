//! HTTP-shaped request and response types handled by the interception layer.
//!
//! The layer never interprets response bodies; it only caches and replays
//! them. These types carry exactly what a namespace entry needs to hold and
//! what the strategies need to inspect (method, URL, status).

use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
  Get,
  Head,
  Post,
  Put,
  Patch,
  Delete,
  Options,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Head => "HEAD",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
      Method::Options => "OPTIONS",
    }
  }

  pub fn is_get(&self) -> bool {
    matches!(self, Method::Get)
  }
}

impl std::fmt::Display for Method {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// An intercepted outbound request.
#[derive(Debug, Clone)]
pub struct Request {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(String, String)>,
}

impl Request {
  /// Build a GET request for the given URL.
  pub fn get(url: Url) -> Self {
    Self {
      method: Method::Get,
      url,
      headers: Vec::new(),
    }
  }

  /// Build a request with an explicit method.
  pub fn new(method: Method, url: Url) -> Self {
    Self {
      method,
      url,
      headers: Vec::new(),
    }
  }
}

/// A response as stored in and replayed from the cache namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Response {
  pub fn new(status: u16, body: Vec<u8>) -> Self {
    Self {
      status,
      headers: Vec::new(),
      body,
    }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.push((name.to_string(), value.to_string()));
    self
  }

  /// Whether the status is in the 2xx range.
  pub fn ok(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// First header value with the given name, case-insensitive.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Empty placeholder returned when cache-first misses and the network is
  /// unreachable.
  pub fn offline_placeholder() -> Self {
    Self::new(408, Vec::new())
  }

  /// Structured JSON error returned when network-first exhausts both the
  /// network and the store. Carries an explicit offline flag for the caller.
  pub fn offline_api() -> Self {
    let body = br#"{"error":"offline","cached":false}"#.to_vec();
    Self::new(503, body).with_header("Content-Type", "application/json")
  }

  /// Minimal synthesized document for navigations that cannot be answered
  /// from the network, the store, or the offline document.
  pub fn offline_document(app_name: &str) -> Self {
    let body = format!(
      "<h1>{} is offline</h1><p>Check your connection and try again.</p>",
      app_name
    );
    Self::new(503, body.into_bytes()).with_header("Content-Type", "text/html; charset=utf-8")
  }
}

/// Status text for common status codes.
pub fn status_text(status: u16) -> &'static str {
  match status {
    200 => "OK",
    201 => "Created",
    204 => "No Content",
    301 => "Moved Permanently",
    302 => "Found",
    304 => "Not Modified",
    400 => "Bad Request",
    401 => "Unauthorized",
    403 => "Forbidden",
    404 => "Not Found",
    408 => "Request Timeout",
    500 => "Internal Server Error",
    502 => "Bad Gateway",
    503 => "Service Unavailable",
    _ => "",
  }
}
