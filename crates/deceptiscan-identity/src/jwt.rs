//! Signed ID-token verification.
//!
//! The provider issues JWTs whose `sub` claim is the user id. A token is
//! accepted when its signature, `exp` and (if configured) `iss`/`aud` all
//! check out; every other claim is passed through untouched.

use std::str::FromStr;

use deceptiscan_core::identity::{Identity, IdentityVerifier};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::{Error, Result, settings::JwtSettings};

#[derive(Clone)]
pub struct JwtVerifier {
  key:        DecodingKey,
  validation: Validation,
}

impl JwtVerifier {
  pub fn new(key: DecodingKey, validation: Validation) -> Self {
    Self { key, validation }
  }

  pub fn from_settings(settings: &JwtSettings) -> Result<Self> {
    let algorithm = Algorithm::from_str(&settings.algorithm).map_err(|_| {
      Error::Settings(format!("unknown algorithm {:?}", settings.algorithm))
    })?;

    let key = match algorithm {
      Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
        let secret = settings.secret.as_deref().ok_or_else(|| {
          Error::Settings(format!("{algorithm:?} requires `secret`"))
        })?;
        DecodingKey::from_secret(secret.as_bytes())
      }
      _ => {
        let path = settings.key_path.as_ref().ok_or_else(|| {
          Error::Settings(format!("{algorithm:?} requires `key_path`"))
        })?;
        let pem = std::fs::read(path).map_err(|source| Error::KeyFile {
          path: path.display().to_string(),
          source,
        })?;
        match algorithm {
          Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(&pem)?,
          Algorithm::EdDSA => DecodingKey::from_ed_pem(&pem)?,
          _ => DecodingKey::from_rsa_pem(&pem)?,
        }
      }
    };

    let mut validation = Validation::new(algorithm);
    validation.leeway = settings.leeway;
    if let Some(issuer) = &settings.issuer {
      validation.set_issuer(&[issuer]);
    }
    match &settings.audience {
      Some(audience) => validation.set_audience(&[audience]),
      None => validation.validate_aud = false,
    }

    tracing::info!(?algorithm, issuer = ?settings.issuer, "jwt verifier configured");
    Ok(Self::new(key, validation))
  }
}

impl IdentityVerifier for JwtVerifier {
  type Error = Error;

  async fn verify(&self, token: String) -> Result<Identity> {
    let data = jsonwebtoken::decode::<Map<String, Value>>(
      &token,
      &self.key,
      &self.validation,
    )?;

    let mut claims = data.claims;
    let uid = match claims.remove("sub") {
      Some(Value::String(sub)) if !sub.is_empty() => sub,
      _ => return Err(Error::MissingSubject),
    };
    Ok(Identity { uid, claims })
  }
}
