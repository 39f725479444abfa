//! grace server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `GRACE_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use grace_providers::{IgdbClient, OpenLibraryClient, TmdbClient, http_client};
use grace_server::{ServerConfig, app, expand_tilde};
use grace_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Grace metadata API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GRACE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  for name in server_cfg.missing_credentials() {
    warn!(setting = name, "provider credential not configured");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  info!(path = %store_path.display(), "store opened");

  let client = http_client(server_cfg.provider_timeout()).context("failed to build HTTP client")?;
  let books = OpenLibraryClient::new(client.clone());
  let games = IgdbClient::new(
    client.clone(),
    server_cfg.igdb_client_id.clone(),
    server_cfg.igdb_client_secret.clone(),
  );
  let movies = TmdbClient::new(client, server_cfg.tmdb_api_key.clone());

  let app = app(grace_api::api_router(Arc::new(store), books, games, movies));
  let address = server_cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    warn!(error = %err, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutdown requested");
}
