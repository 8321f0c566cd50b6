//! Worker configuration.
//!
//! The application supplies everything here once, at construction: the
//! version tag, the pre-cache manifest, the four ordered pattern lists, the
//! offline document and the notification defaults. The running worker never
//! mutates it. Every field has a default mirroring the admin deployment
//! profile, so an empty YAML file is a valid configuration.

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
  /// Deployed version tag. Bumping it invalidates every prior cache
  /// generation on the next activation.
  pub version: String,

  /// Prefix for namespace names ({prefix}-{role}-{version}).
  pub cache_prefix: String,

  /// Origin the worker runs on. Shell URLs are resolved against it, and a
  /// local-development origin disables interception entirely.
  pub origin: String,

  /// Human-readable application name, used in synthesized offline documents
  /// and as the default notification title.
  pub app_name: String,

  /// App-shell paths pre-cached at install so the application can render
  /// without connectivity.
  pub app_shell: Vec<String>,

  /// Single entry document that can answer any navigation (the application
  /// is a single-page app).
  pub offline_page: String,

  /// Deadline for the network-first race, in seconds.
  pub network_timeout_secs: u64,

  /// Deadline for the default navigation strategy, in seconds. Navigations
  /// fall back sooner than API calls.
  pub navigation_timeout_secs: u64,

  pub routes: RoutePatterns,

  pub notifications: NotificationDefaults,

  /// Background-sync tags this deployment knows about. Tags not listed are
  /// logged and dropped; an empty list relays everything.
  pub sync_tags: Vec<String>,
}

/// The four ordered pattern lists, consulted in a fixed priority order.
/// Patterns are regular expressions matched against the full request URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutePatterns {
  /// Always pass through: identity/session endpoints, realtime channels,
  /// extension schemes, loopback and private-network hosts.
  pub never_cache: Vec<String>,
  pub network_first: Vec<String>,
  pub cache_first: Vec<String>,
  pub stale_while_revalidate: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
  pub icon: String,
  pub badge: String,
  /// Grouping tag applied when the payload carries none.
  pub tag: String,
  /// Window URL opened when a clicked payload carries no URL.
  pub url: String,
  /// Keep the notification on screen until the user interacts with it.
  pub require_interaction: bool,
  pub vibrate: Vec<u32>,
  /// Action buttons attached when the payload carries none.
  pub actions: Vec<ActionDefault>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionDefault {
  pub action: String,
  pub title: String,
}

impl Default for WorkerConfig {
  fn default() -> Self {
    Self {
      version: "v0.1.0".to_string(),
      cache_prefix: "app".to_string(),
      origin: "https://app.example.com".to_string(),
      app_name: "Application".to_string(),
      app_shell: vec![
        "/".to_string(),
        "/index.html".to_string(),
        "/manifest.json".to_string(),
        "/favicon.svg".to_string(),
        "/favicon.png".to_string(),
        "/pwa-icon.png".to_string(),
      ],
      offline_page: "/index.html".to_string(),
      network_timeout_secs: 8,
      navigation_timeout_secs: 5,
      routes: RoutePatterns::default(),
      notifications: NotificationDefaults::default(),
      sync_tags: Vec::new(),
    }
  }
}

impl Default for RoutePatterns {
  fn default() -> Self {
    Self {
      never_cache: vec![
        r"auth/v1/".to_string(),
        r"rest/v1/".to_string(),
        r"functions/v1/".to_string(),
        r"realtime/v1/".to_string(),
        r"chrome-extension".to_string(),
        r"sockjs".to_string(),
        r"localhost".to_string(),
        r"127\.0\.0\.1".to_string(),
        r"192\.168\.".to_string(),
      ],
      // Empty by default: the admin profile excludes its API endpoints via
      // never_cache. Field deployments route their REST endpoints here.
      network_first: Vec::new(),
      cache_first: vec![
        r"(?i)\.(?:png|jpg|jpeg|svg|gif|webp|ico|woff2?|ttf|eot)$".to_string(),
        r"fonts\.googleapis\.com".to_string(),
        r"fonts\.gstatic\.com".to_string(),
        r"cdn\.jsdelivr\.net".to_string(),
      ],
      stale_while_revalidate: vec![r"/assets/".to_string(), r"(?i)\.(?:js|css)$".to_string()],
    }
  }
}

impl Default for NotificationDefaults {
  fn default() -> Self {
    Self {
      icon: "/pwa-icon.png".to_string(),
      badge: "/favicon.png".to_string(),
      tag: "app-notification".to_string(),
      url: "/".to_string(),
      require_interaction: false,
      vibrate: vec![200, 100, 200],
      actions: Vec::new(),
    }
  }
}

impl WorkerConfig {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cachefront.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cachefront/config.yaml
  ///
  /// With no file found anywhere, the defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cachefront.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cachefront").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: WorkerConfig = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Parsed worker origin.
  pub fn origin_url(&self) -> Result<Url> {
    Url::parse(&self.origin).map_err(|e| eyre!("Invalid origin {}: {}", self.origin, e))
  }

  /// Whether the worker runs against a local-development origin. Interception
  /// is disabled there so the cache cannot interfere with iterative builds.
  pub fn is_dev_origin(&self) -> bool {
    let host = match self.origin_url() {
      Ok(url) => match url.host_str() {
        Some(h) => h.to_string(),
        None => return false,
      },
      Err(_) => return false,
    };

    host == "localhost" || host == "127.0.0.1" || host.starts_with("192.168.")
  }

  /// Resolve an app-relative path (or absolute URL) against the origin.
  pub fn resolve(&self, path: &str) -> Result<Url> {
    let origin = self.origin_url()?;
    origin
      .join(path)
      .map_err(|e| eyre!("Cannot resolve {} against {}: {}", path, self.origin, e))
  }

  pub fn network_timeout(&self) -> Duration {
    Duration::from_secs(self.network_timeout_secs)
  }

  pub fn navigation_timeout(&self) -> Duration {
    Duration::from_secs(self.navigation_timeout_secs)
  }
}
