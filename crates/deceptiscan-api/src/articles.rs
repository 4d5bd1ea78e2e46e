//! Handlers for `/articles` endpoints.
//!
//! | Method   | Path    | Notes |
//! |----------|---------|-------|
//! | `GET`    | `/`     | `?page=&limit=`; returns `{"items", "total"}` |
//! | `GET`    | `/{id}` | 404 if not found |
//! | `POST`   | `/`     | Body: any JSON object; returns 201 + `{"id"}` |
//! | `PUT`    | `/{id}` | Body: any JSON object; shallow merge; 204 |
//! | `DELETE` | `/{id}` | 204, also when already gone |
//!
//! Authenticated, but not tenant-scoped: every caller sees one collection.

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use deceptiscan_core::{
  article::{Article, ArticlePage},
  document::{self, Document},
  identity::Identity,
  store::ArticleStore,
};
use serde_json::Value;

use crate::{error::ApiError, history::Created};

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;
const NOT_FOUND: &str = "Not found";

fn body_document(body: Result<Json<Value>, JsonRejection>) -> Result<Document, ApiError> {
  let Json(body) = body?;
  document::from_value(body)
    .map_err(|_| ApiError::BadRequest("article body must be a JSON object".to_owned()))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// Raw query parameters. Parsed leniently: anything that is not a positive
/// integer falls back to the default, and so does a repeated key.
#[derive(Debug, Default)]
pub struct ListParams {
  pub page:  Option<String>,
  pub limit: Option<String>,
}

impl ListParams {
  pub fn from_pairs(pairs: &[(String, String)]) -> Self {
    Self {
      page:  Self::single(pairs, "page"),
      limit: Self::single(pairs, "limit"),
    }
  }

  fn single(pairs: &[(String, String)], key: &str) -> Option<String> {
    let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v);
    match (values.next(), values.next()) {
      (Some(value), None) => Some(value.clone()),
      _ => None,
    }
  }

  fn positive(raw: Option<&str>, default: usize) -> usize {
    raw
      .and_then(|s| s.trim().parse::<usize>().ok())
      .filter(|n| *n > 0)
      .unwrap_or(default)
  }

  /// `(limit, offset)` for the requested page.
  pub fn window(&self) -> (usize, usize) {
    let page = Self::positive(self.page.as_deref(), DEFAULT_PAGE);
    let limit = Self::positive(self.limit.as_deref(), DEFAULT_LIMIT);
    (limit, (page - 1).saturating_mul(limit))
  }
}

/// `GET /[?page=<n>][&limit=<n>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ArticlePage>, ApiError>
where
  S: ArticleStore,
{
  let Query(pairs) = query?;
  let (limit, offset) = ListParams::from_pairs(&pairs).window();
  let items = store
    .list_articles(limit, offset)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ArticlePage::new(items)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<Article>, ApiError>
where
  S: ArticleStore,
{
  let Path(id) = path?;
  let article = store
    .get_article(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;
  Ok(Json(article))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /`: returns 201 + `{"id": "..."}`.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ArticleStore,
{
  let fields = body_document(body)?;
  let article = store
    .create_article(fields)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(id = %article.id, by = %identity.uid, "article created");
  Ok((StatusCode::CREATED, Json(Created { id: article.id })))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /{id}`: returns 204.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<String>, PathRejection>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
  S: ArticleStore,
{
  let Path(id) = path?;
  let patch = body_document(body)?;
  store
    .update_article(id.clone(), patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;

  tracing::info!(%id, by = %identity.uid, "article updated");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /{id}`: returns 204.
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: ArticleStore,
{
  let Path(id) = path?;
  let removed = store
    .delete_article(id.clone())
    .await
    .map_err(ApiError::store)?;

  tracing::info!(%id, removed, by = %identity.uid, "article delete");
  Ok(StatusCode::NO_CONTENT)
}
