//! Error type for `deceptiscan-identity`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Signature, expiry, issuer or audience check failed, or the token is not
  /// a JWT at all.
  #[error("token rejected: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("token has no usable `sub` claim")]
  MissingSubject,

  #[error("unknown token")]
  UnknownToken,

  #[error("failed to read key file {path}: {source}")]
  KeyFile {
    path:   String,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid verifier settings: {0}")]
  Settings(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
