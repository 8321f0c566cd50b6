//! Network seam.
//!
//! The strategies talk to the network through the `Fetch` trait so hosts
//! (and tests) can substitute their own transport. The crate ships a
//! reqwest-backed implementation for the CLI.

use color_eyre::{eyre::eyre, Result};
use std::future::Future;

use crate::http::{Method, Request, Response};

/// A one-shot HTTP fetch. Implementations must be cheap to share; the
/// strategies clone the handle into background tasks.
pub trait Fetch: Send + Sync + 'static {
  fn fetch(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// Network client backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl Fetch for HttpFetcher {
  async fn fetch(&self, request: Request) -> Result<Response> {
    let method = match request.method {
      Method::Get => reqwest::Method::GET,
      Method::Head => reqwest::Method::HEAD,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
      Method::Options => reqwest::Method::OPTIONS,
    };

    let mut builder = self.client.request(method, request.url.clone());
    for (name, value) in &request.headers {
      builder = builder.header(name, value);
    }

    let response = builder
      .send()
      .await
      .map_err(|e| eyre!("Fetch failed for {}: {}", request.url, e))?;

    let status = response.status().as_u16();
    let headers = response
      .headers()
      .iter()
      .map(|(name, value)| {
        (
          name.to_string(),
          value.to_str().unwrap_or_default().to_string(),
        )
      })
      .collect();

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read body from {}: {}", request.url, e))?
      .to_vec();

    Ok(Response {
      status,
      headers,
      body,
    })
  }
}
