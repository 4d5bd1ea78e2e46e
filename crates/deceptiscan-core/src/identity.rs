//! The identity-verifier seam.
//!
//! Bearer tokens are issued by an external identity provider. The services
//! only ever ask one question of it: "who does this token belong to?"

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
  /// Subject identifier; the tenant key for history operations.
  pub uid:    String,
  /// Every other claim the provider vouched for (email, name, ...).
  #[serde(default)]
  pub claims: Map<String, Value>,
}

impl Identity {
  pub fn new(uid: impl Into<String>) -> Self {
    Self { uid: uid.into(), claims: Map::new() }
  }
}

/// Abstraction over an identity provider's token-verification call.
///
/// Every request is verified independently; implementations need not cache.
pub trait IdentityVerifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Verify `token` and return the identity it was issued to. Expired,
  /// malformed and revoked tokens are all errors.
  fn verify(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;
}
