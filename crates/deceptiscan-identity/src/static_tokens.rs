//! Fixed token table for local development and tests.

use std::{collections::HashMap, sync::Arc};

use deceptiscan_core::identity::{Identity, IdentityVerifier};

use crate::{Error, Result};

/// Accepts exactly the tokens it was built with.
#[derive(Clone, Default)]
pub struct StaticTokenVerifier {
  tokens: Arc<HashMap<String, String>>,
}

impl StaticTokenVerifier {
  /// `tokens` maps bearer token → uid.
  pub fn new(tokens: HashMap<String, String>) -> Self {
    Self { tokens: Arc::new(tokens) }
  }

  /// Convenience constructor from `(token, uid)` pairs.
  pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    Self::new(
      pairs
        .into_iter()
        .map(|(token, uid)| (token.to_owned(), uid.to_owned()))
        .collect(),
    )
  }
}

impl IdentityVerifier for StaticTokenVerifier {
  type Error = Error;

  async fn verify(&self, token: String) -> Result<Identity> {
    self
      .tokens
      .get(&token)
      .map(|uid| Identity::new(uid.clone()))
      .ok_or(Error::UnknownToken)
  }
}
