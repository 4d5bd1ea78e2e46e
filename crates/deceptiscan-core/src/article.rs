//! Article catalog types.
//!
//! Articles live in one global collection; any authenticated caller may read
//! or write any article.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// An awareness article. Its body is an opaque document (title, content,
/// image URL, ...) chosen by whoever publishes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub id:         String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(flatten)]
  pub fields:     Document,
}

/// One page of the article listing.
///
/// `total` is the number of items on this page, not the size of the
/// collection. Clients in the field rely on that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
  pub items: Vec<Article>,
  pub total: usize,
}

impl ArticlePage {
  pub fn new(items: Vec<Article>) -> Self {
    let total = items.len();
    Self { items, total }
  }
}
