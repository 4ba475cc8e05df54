//! carshop server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, optionally inserts the seed data and serves the JSON API over HTTP.

mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use carshop_api::AppState;
use carshop_core::{
  seed,
  store::{Failure, StoreError, UnitOfWork},
};
use carshop_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Car marketplace server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Insert the seed people and cars before serving.
  #[arg(long)]
  seed: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store = if server_cfg.in_memory() {
    SqliteStore::open_in_memory().await
  } else {
    if let Some(parent) = server_cfg.store_path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("failed to create {parent:?}"))?;
    }
    SqliteStore::open(&server_cfg.store_path).await
  }
  .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  if cli.seed || server_cfg.seed {
    seed_store(&store).await?;
  }

  let state = AppState::new(store, server_cfg.image_root.clone());
  let app = carshop_api::router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}{}", carshop_api::BASE_PATH);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Insert the seed data. A store that already holds it is left alone.
async fn seed_store(store: &SqliteStore) -> anyhow::Result<()> {
  match store.commit(seed::session(), Some("seed")).await {
    Ok(_) => {
      tracing::info!("seed data inserted");
      Ok(())
    }
    Err(e) if e.failure() == Failure::Conflict => {
      tracing::info!("seed data already present");
      Ok(())
    }
    Err(e) => Err(e).context("failed to seed store"),
  }
}
