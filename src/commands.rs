//! CLI subcommands: drive the worker against the real network and the
//! on-disk store.

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use url::Url;

use crate::clients::{ControlMessage, TracingGateway, TracingNotifier};
use crate::config::WorkerConfig;
use crate::event::Event;
use crate::http::{status_text, Request};
use crate::net::HttpFetcher;
use crate::store::{NamespaceStore, SqliteStore};
use crate::worker::{Handled, Worker};

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Pre-cache the app shell and activate this version
  Install,
  /// Route a URL through the classifier and its strategy
  Fetch {
    /// Full URL to fetch
    url: String,
  },
  /// List cache namespaces present in the store
  Namespaces,
  /// Drop the API namespace, keeping static and asset entries
  InvalidateApi,
}

pub async fn run(command: Command, config: WorkerConfig) -> Result<()> {
  let store = Arc::new(SqliteStore::open()?);
  let fetch = Arc::new(HttpFetcher::new()?);
  let worker = Worker::new(
    config,
    fetch,
    Arc::clone(&store),
    Arc::new(TracingGateway),
    Arc::new(TracingNotifier),
  )?;

  match command {
    Command::Install => {
      worker.dispatch(Event::Install).await?;
      worker.dispatch(Event::Activate).await?;
      println!("Installed and activated. Namespaces:");
      for name in store.names()? {
        println!("  {}", name);
      }
    }

    Command::Fetch { url } => {
      let url = Url::parse(&url).map_err(|e| eyre!("Invalid URL {}: {}", url, e))?;
      match worker.dispatch(Event::Fetch(Request::get(url))).await? {
        Handled::Passthrough => println!("not intercepted (passthrough)"),
        Handled::Response(response) => {
          println!(
            "{} {} ({} bytes)",
            response.status,
            status_text(response.status),
            response.body.len()
          );
          if let Some(content_type) = response.header("Content-Type") {
            println!("Content-Type: {}", content_type);
          }
        }
        Handled::Done => {}
      }
    }

    Command::Namespaces => {
      let names = store.names()?;
      if names.is_empty() {
        println!("No namespaces. Run `cachefront install` first.");
      }
      for name in names {
        println!("{}", name);
      }
    }

    Command::InvalidateApi => {
      worker
        .dispatch(Event::Message(ControlMessage::InvalidateApiNamespace))
        .await?;
      println!("API namespace invalidated.");
    }
  }

  Ok(())
}
