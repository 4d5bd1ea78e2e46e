//! Process wiring for the DeceptiScan services.
//!
//! Builds the full axum [`Router`] (health probe, history and/or articles
//! routers, HTTP tracing) from a store and a verifier that the binary
//! constructs exactly once at startup.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use deceptiscan_core::{
  identity::IdentityVerifier,
  store::{ArticleStore, HistoryStore},
};
use deceptiscan_identity::IdentitySettings;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DECEPTISCAN_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub auth:       IdentitySettings,
}

/// Which service routers a process mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Service {
  History,
  Articles,
  All,
}

impl Service {
  fn serves_history(self) -> bool { matches!(self, Self::History | Self::All) }

  fn serves_articles(self) -> bool { matches!(self, Self::Articles | Self::All) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router for `service`.
pub fn app<S, V>(store: Arc<S>, verifier: Arc<V>, service: Service) -> Router
where
  S: HistoryStore + ArticleStore + 'static,
  V: IdentityVerifier + 'static,
{
  let mut router = Router::new().route("/health", get(deceptiscan_api::health));

  if service.serves_history() {
    router = router.nest(
      "/history",
      deceptiscan_api::history_router(store.clone(), verifier.clone()),
    );
  }
  if service.serves_articles() {
    router = router.nest(
      "/articles",
      deceptiscan_api::articles_router(store, verifier),
    );
  }

  router
    .fallback(deceptiscan_api::not_found)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use deceptiscan_identity::{StaticTokenVerifier, Verifier};
  use deceptiscan_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn router(service: Service) -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let verifier = Arc::new(Verifier::Static(StaticTokenVerifier::from_pairs([(
      "dev-token",
      "dev-user",
    )])));
    app(store, verifier, service)
  }

  async fn get_status(app: &Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut req = Request::builder().uri(uri);
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app
      .clone()
      .oneshot(req.body(Body::empty()).unwrap())
      .await
      .unwrap()
      .status()
  }

  #[tokio::test]
  async fn health_is_open() {
    let app = router(Service::All).await;
    let resp = app
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "up" }));
  }

  #[tokio::test]
  async fn all_mounts_both_services() {
    let app = router(Service::All).await;
    assert_eq!(get_status(&app, "/history/linkAnalyser", Some("dev-token")).await, StatusCode::OK);
    assert_eq!(get_status(&app, "/articles", Some("dev-token")).await, StatusCode::OK);
    assert_eq!(get_status(&app, "/articles", None).await, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn single_service_mounts_only_its_router() {
    let history = router(Service::History).await;
    assert_eq!(get_status(&history, "/history/linkAnalyser", Some("dev-token")).await, StatusCode::OK);
    assert_eq!(get_status(&history, "/articles", Some("dev-token")).await, StatusCode::NOT_FOUND);
    assert_eq!(get_status(&history, "/health", None).await, StatusCode::OK);

    let articles = router(Service::Articles).await;
    assert_eq!(get_status(&articles, "/articles", Some("dev-token")).await, StatusCode::OK);
    assert_eq!(get_status(&articles, "/history/linkAnalyser", Some("dev-token")).await, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn unknown_paths_get_a_json_404() {
    let app = router(Service::History).await;
    let resp = app
      .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Not found" }));
  }

  #[test]
  fn config_deserialises_from_layered_sources() {
    let settings = config::Config::builder()
      .set_default("host", "0.0.0.0").unwrap()
      .set_default("port", 8004).unwrap()
      .set_default("store_path", "deceptiscan.sqlite").unwrap()
      .set_default("auth.mode", "static").unwrap()
      .add_source(config::File::from_str(
        "port = 9000\n[auth.tokens]\ndev-token = \"dev-user\"\n",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();

    let cfg: ServerConfig = settings.try_deserialize().unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 9000);
    let IdentitySettings::Static { tokens } = cfg.auth else {
      panic!("expected static auth settings");
    };
    assert_eq!(tokens["dev-token"], "dev-user");
  }
}
