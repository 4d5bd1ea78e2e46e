//! DeceptiScan server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `DECEPTISCAN_*` environment variables on top, opens an in-process SQLite
//! store, and serves the history and/or articles APIs over HTTP.
//!
//! ```toml
//! host       = "0.0.0.0"
//! port       = 8004
//! store_path = "~/.local/share/deceptiscan/store.sqlite"
//!
//! [auth]
//! mode = "static"
//! tokens = { dev-token = "dev-user" }
//! ```
//!
//! Nested keys map to environment variables with `__`, e.g.
//! `DECEPTISCAN_AUTH__MODE=jwt`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use deceptiscan_identity::Verifier;
use deceptiscan_server::{ServerConfig, Service};
use deceptiscan_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "DeceptiScan history and articles server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Which service to mount.
  #[arg(long, value_enum, default_value = "all")]
  service: Service,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 8004)?
    .set_default("store_path", "deceptiscan.sqlite")?
    .set_default("auth.mode", "static")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DECEPTISCAN").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Build the identity verifier.
  let verifier = Verifier::from_settings(&server_cfg.auth)
    .context("failed to build identity verifier")?;
  if matches!(verifier, Verifier::Static(_)) {
    tracing::warn!("static bearer tokens in use; not for production");
  }

  let app = deceptiscan_server::app(Arc::new(store), Arc::new(verifier), cli.service);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(service = ?cli.service, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
