//! Serde-facing verifier configuration, embedded in the server config.
//!
//! ```toml
//! [auth]
//! mode      = "jwt"
//! algorithm = "RS256"
//! key_path  = "/etc/deceptiscan/provider.pem"
//! issuer    = "https://securetoken.google.com/deceptiscan"
//! audience  = "deceptiscan"
//! ```
//!
//! or, for local development:
//!
//! ```toml
//! [auth]
//! mode = "static"
//! tokens = { dev-token = "dev-user" }
//! ```

use std::{collections::HashMap, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IdentitySettings {
  Jwt(JwtSettings),
  Static {
    /// token → uid
    #[serde(default)]
    tokens: HashMap<String, String>,
  },
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
  /// `HS256`, `RS256`, `ES256`, ...
  pub algorithm: String,
  /// Shared secret for HMAC algorithms.
  pub secret:    Option<String>,
  /// PEM public key for RSA/EC algorithms.
  pub key_path:  Option<PathBuf>,
  /// Required `iss` claim, if set.
  pub issuer:    Option<String>,
  /// Required `aud` claim, if set.
  pub audience:  Option<String>,
  /// Clock-skew allowance for `exp`/`nbf`, in seconds.
  #[serde(default = "default_leeway")]
  pub leeway:    u64,
}

fn default_leeway() -> u64 { 60 }
