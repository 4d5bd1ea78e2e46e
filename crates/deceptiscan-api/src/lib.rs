//! JSON REST API for the DeceptiScan history and articles services.
//!
//! Exposes axum [`Router`]s backed by any [`HistoryStore`] /
//! [`ArticleStore`], gated by any [`IdentityVerifier`]. TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .nest("/history", deceptiscan_api::history_router(store.clone(), verifier.clone()))
//!   .nest("/articles", deceptiscan_api::articles_router(store, verifier))
//! ```

pub mod articles;
pub mod auth;
pub mod error;
pub mod history;

use std::sync::Arc;

use axum::{
  Json, Router, middleware,
  routing::{any, get},
};
use deceptiscan_core::{
  identity::IdentityVerifier,
  store::{ArticleStore, HistoryStore},
};
use serde_json::{Value, json};

pub use error::ApiError;

/// Build the history ledger router. Every route sits behind the auth gate.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn history_router<S, V>(store: Arc<S>, verifier: Arc<V>) -> Router<()>
where
  S: HistoryStore + 'static,
  V: IdentityVerifier + 'static,
{
  Router::new()
    .route("/", any(history::missing_service))
    .route("/{service}", get(history::list::<S>).post(history::create::<S>))
    .route(
      "/{service}/{id}",
      get(history::get_one::<S>)
        .put(history::update::<S>)
        .delete(history::delete_one::<S>),
    )
    .method_not_allowed_fallback(method_not_allowed)
    .route_layer(middleware::from_fn_with_state(
      verifier,
      auth::require_identity::<V>,
    ))
    .with_state(store)
}

/// Build the article catalog router. Every route sits behind the auth gate.
pub fn articles_router<S, V>(store: Arc<S>, verifier: Arc<V>) -> Router<()>
where
  S: ArticleStore + 'static,
  V: IdentityVerifier + 'static,
{
  Router::new()
    .route("/", get(articles::list::<S>).post(articles::create::<S>))
    .route(
      "/{id}",
      get(articles::get_one::<S>)
        .put(articles::update::<S>)
        .delete(articles::remove::<S>),
    )
    .method_not_allowed_fallback(method_not_allowed)
    .route_layer(middleware::from_fn_with_state(
      verifier,
      auth::require_identity::<V>,
    ))
    .with_state(store)
}

/// `GET /health`: unauthenticated liveness probe.
pub async fn health() -> Json<Value> { Json(json!({ "status": "up" })) }

/// Fallback for paths no router matches.
pub async fn not_found() -> ApiError { ApiError::NotFound("Not found") }

async fn method_not_allowed() -> ApiError { ApiError::MethodNotAllowed }

// ─── Integration tests ────────────────────────────────────────────────────────
