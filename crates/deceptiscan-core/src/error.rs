//! Error types for `deceptiscan-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("service name must be a non-empty path segment, got {0:?}")]
  InvalidServiceName(String),

  #[error("expected a JSON object, got {0}")]
  NotAnObject(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
