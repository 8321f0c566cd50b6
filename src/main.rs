use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachefront::commands::{self, Command};
use cachefront::config::WorkerConfig;

#[derive(Parser, Debug)]
#[command(name = "cachefront")]
#[command(about = "Client-side offline cache and request-interception layer")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/cachefront/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| "cachefront=info".into()),
    ))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let args = Args::parse();

  let config = WorkerConfig::load(args.config.as_deref())?;

  commands::run(args.command, config).await
}
