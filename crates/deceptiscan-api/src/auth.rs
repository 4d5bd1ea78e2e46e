//! The auth gate: bearer-token middleware.
//!
//! Runs before every history and articles handler. A request only reaches a
//! handler with a verified [`Identity`] in its extensions.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use deceptiscan_core::identity::{Identity, IdentityVerifier};

use crate::error::ApiError;

pub const MALFORMED_HEADER: &str = "Missing or malformed Authorization header";
pub const INVALID_TOKEN: &str = "Invalid or expired ID token";

/// Extract `<token>` from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .filter(|token| !token.is_empty())
    .ok_or(ApiError::Unauthorized(MALFORMED_HEADER))
}

/// Verify the bearer credential in `headers` against `verifier`.
pub async fn verify_bearer<V>(
  headers: &HeaderMap,
  verifier: &V,
) -> Result<Identity, ApiError>
where
  V: IdentityVerifier,
{
  let token = bearer_token(headers)?.to_owned();
  verifier.verify(token).await.map_err(|e| {
    tracing::debug!(error = %e, "bearer token rejected");
    ApiError::Unauthorized(INVALID_TOKEN)
  })
}

/// Middleware: reject unauthenticated requests with 401, otherwise insert
/// the caller's [`Identity`] into the request extensions.
pub async fn require_identity<V>(
  State(verifier): State<Arc<V>>,
  mut request: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  V: IdentityVerifier + 'static,
{
  let identity = verify_bearer(request.headers(), verifier.as_ref()).await?;
  tracing::trace!(uid = %identity.uid, "request authenticated");
  request.extensions_mut().insert(identity);
  Ok(next.run(request).await)
}
