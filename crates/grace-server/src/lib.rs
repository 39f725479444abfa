//! Wiring for the `grace` binary: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GRACE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  #[serde(default = "default_store_path")]
  pub store_path:            PathBuf,
  #[serde(default = "default_provider_timeout_secs")]
  pub provider_timeout_secs: u64,
  /// TMDB v4 read access token.
  #[serde(default)]
  pub tmdb_api_key:          String,
  #[serde(default)]
  pub igdb_client_id:        String,
  #[serde(default)]
  pub igdb_client_secret:    String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("grace.db") }

fn default_provider_timeout_secs() -> u64 { 10 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn provider_timeout(&self) -> Duration { Duration::from_secs(self.provider_timeout_secs) }

  /// Names of provider credentials that are not set.
  pub fn missing_credentials(&self) -> Vec<&'static str> {
    [
      ("tmdb_api_key", &self.tmdb_api_key),
      ("igdb_client_id", &self.igdb_client_id),
      ("igdb_client_secret", &self.igdb_client_secret),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Mount `api` under `/api` next to `/health`, with request tracing and
/// permissive CORS.
pub fn app(api: Router) -> Router {
  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> { Json(json!({ "status": "ok" })) }

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{Config, File, FileFormat};
  use tower::ServiceExt as _;

  use super::*;

  fn load(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg = load("port = 9000\ntmdb_api_key = \"abc\"");
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.store_path, PathBuf::from("grace.db"));
    assert_eq!(cfg.provider_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.missing_credentials(), vec!["igdb_client_id", "igdb_client_secret"]);
  }

  #[test]
  fn config_reads_every_key() {
    let cfg = load(
      r#"
      host = "0.0.0.0"
      port = 3000
      store_path = "/var/lib/grace/grace.db"
      provider_timeout_secs = 3
      tmdb_api_key = "t"
      igdb_client_id = "i"
      igdb_client_secret = "s"
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:3000");
    assert_eq!(cfg.provider_timeout_secs, 3);
    assert!(cfg.missing_credentials().is_empty());
  }

  #[test]
  fn tilde_is_expanded_only_as_a_prefix() {
    assert_eq!(expand_tilde(Path::new("/tmp/grace.db")), PathBuf::from("/tmp/grace.db"));
    assert_eq!(expand_tilde(Path::new("a/~/b")), PathBuf::from("a/~/b"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/grace.db")), PathBuf::from(home).join("grace.db"));
    }
  }

  #[tokio::test]
  async fn health_is_mounted_beside_the_api() {
    let app = app(Router::new().route("/ping", get(|| async { "pong" })));

    let resp = app
      .clone()
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
      .oneshot(Request::get("/api/ping").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
