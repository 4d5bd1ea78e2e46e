//! Handlers for `/history` endpoints.
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `POST`   | `/{service}`      | Body: `{"data": {...}}`; returns 201 + `{"id"}` |
//! | `GET`    | `/{service}`      | Newest first |
//! | `GET`    | `/{service}/{id}` | 404 if not in the caller's partition |
//! | `PUT`    | `/{service}/{id}` | Body: `{"data": {...}}`; shallow merge |
//! | `DELETE` | `/{service}/{id}` | Permanent |
//!
//! Every operation is scoped to `history/{uid}/{service}`, where `uid` comes
//! from the verified bearer token. Ids from other partitions never resolve.

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use deceptiscan_core::{
  document::{self, Document},
  history::{HistoryEntry, Partition, ServiceName},
  identity::Identity,
  store::HistoryStore,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

const SERVICE_REQUIRED: &str = "Service name (URL param) is required";
const RECORD_PATH_REQUIRED: &str = "Service name and record ID are required";
const DATA_REQUIRED: &str = "data (object) is required";
const DATA_REQUIRED_FOR_UPDATE: &str = "data has to be provided for update";
const DATA_NOT_OBJECT: &str = "data must be a JSON object";
const NOT_FOUND: &str = "History entry not found";

/// `{"id": "..."}`: body of a 201 from `POST /{service}`.
#[derive(Debug, Serialize)]
pub struct Created {
  pub id: String,
}

/// `{"message": "..."}`: body of a successful update or delete.
#[derive(Debug, Serialize)]
pub struct Message {
  pub message: &'static str,
}

// ─── Path validation ─────────────────────────────────────────────────────────

fn partition(identity: &Identity, service: String) -> Result<Partition, ApiError> {
  let service = ServiceName::parse(service)
    .map_err(|_| ApiError::BadRequest(SERVICE_REQUIRED.to_owned()))?;
  Ok(Partition::new(identity.uid.clone(), service))
}

fn record(
  identity: &Identity,
  (service, id): (String, String),
) -> Result<(Partition, String), ApiError> {
  let invalid = || ApiError::BadRequest(RECORD_PATH_REQUIRED.to_owned());
  if id.is_empty() {
    return Err(invalid());
  }
  let service = ServiceName::parse(service).map_err(|_| invalid())?;
  Ok((Partition::new(identity.uid.clone(), service), id))
}

/// Pull `data` out of a request body. `None` means the key is absent.
fn take_data(body: Value) -> Option<Value> {
  match body {
    Value::Object(mut map) => map.remove("data"),
    _ => None,
  }
}

fn data_document(data: Value) -> Result<Document, ApiError> {
  document::from_value(data).map_err(|_| ApiError::BadRequest(DATA_NOT_OBJECT.to_owned()))
}

// ─── Missing service ─────────────────────────────────────────────────────────

/// Any method on `/history` itself: the service segment is missing.
pub async fn missing_service() -> ApiError {
  ApiError::BadRequest(SERVICE_REQUIRED.to_owned())
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /{service}`: body: `{"data": {...}}`
///
/// Upserts the caller's root marker, then appends the entry. The two writes
/// are independent; if the append fails the marker simply stays, and the
/// next create upserts it again.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<String>, PathRejection>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HistoryStore,
{
  let Path(service) = path?;
  let partition = partition(&identity, service)?;
  let Json(body) = body?;

  let data = match take_data(body) {
    None | Some(Value::Null) => {
      return Err(ApiError::BadRequest(DATA_REQUIRED.to_owned()));
    }
    Some(data) => data_document(data)?,
  };

  store
    .ensure_root(identity.uid.clone())
    .await
    .map_err(ApiError::store)?;

  let path = partition.to_string();
  let entry = store
    .append(partition, data)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(%path, id = %entry.id, "history entry created");
  Ok((StatusCode::CREATED, Json(Created { id: entry.id })))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /{service}`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: HistoryStore,
{
  let Path(service) = path?;
  let partition = partition(&identity, service)?;

  let entries = store.list(partition).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /{service}/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<HistoryEntry>, ApiError>
where
  S: HistoryStore,
{
  let Path(params) = path?;
  let (partition, id) = record(&identity, params)?;

  let entry = store
    .get(partition, id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;
  Ok(Json(entry))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /{service}/{id}`: body: `{"data": {...}}`
///
/// Only an absent `data` is rejected. `{}` and `null` are both accepted and
/// leave every field as it was, apart from `updatedAt`.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<(String, String)>, PathRejection>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Message>, ApiError>
where
  S: HistoryStore,
{
  let Path(params) = path?;
  let (partition, id) = record(&identity, params)?;
  let Json(body) = body?;

  let patch = match take_data(body) {
    None => {
      return Err(ApiError::BadRequest(DATA_REQUIRED_FOR_UPDATE.to_owned()));
    }
    Some(Value::Null) => Document::new(),
    Some(data) => data_document(data)?,
  };

  let path = partition.to_string();
  let entry = store
    .merge(partition, id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;

  tracing::info!(%path, id = %entry.id, "history entry updated");
  Ok(Json(Message { message: "Updated successfully" }))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /{service}/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Extension(identity): Extension<Identity>,
  path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Message>, ApiError>
where
  S: HistoryStore,
{
  let Path(params) = path?;
  let (partition, id) = record(&identity, params)?;

  let path = partition.to_string();
  let removed = store
    .delete(partition, id.clone())
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(NOT_FOUND));
  }

  tracing::info!(%path, %id, "history entry deleted");
  Ok(Json(Message { message: "Deleted successfully" }))
}
