//! Identity-provider backends for [`IdentityVerifier`].
//!
//! - [`JwtVerifier`] checks signed ID tokens (the managed provider's format).
//! - [`StaticTokenVerifier`] maps fixed tokens to uids for local development.
//!
//! [`Verifier`] picks one of them from [`IdentitySettings`] at startup.

pub mod error;
pub mod jwt;
pub mod settings;
pub mod static_tokens;

use deceptiscan_core::identity::{Identity, IdentityVerifier};

pub use error::{Error, Result};
pub use jwt::JwtVerifier;
pub use settings::IdentitySettings;
pub use static_tokens::StaticTokenVerifier;

/// The verifier selected by configuration.
#[derive(Clone)]
pub enum Verifier {
  Jwt(JwtVerifier),
  Static(StaticTokenVerifier),
}

impl Verifier {
  /// Build the verifier described by `settings`, reading key material from
  /// disk where required.
  pub fn from_settings(settings: &IdentitySettings) -> Result<Self> {
    match settings {
      IdentitySettings::Jwt(jwt) => Ok(Self::Jwt(JwtVerifier::from_settings(jwt)?)),
      IdentitySettings::Static { tokens } => {
        Ok(Self::Static(StaticTokenVerifier::new(tokens.clone())))
      }
    }
  }
}

impl IdentityVerifier for Verifier {
  type Error = Error;

  async fn verify(&self, token: String) -> Result<Identity> {
    match self {
      Self::Jwt(v) => v.verify(token).await,
      Self::Static(v) => v.verify(token).await,
    }
  }
}
