//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! so that lexicographic order in SQL equals chronological order. Documents
//! are stored as compact JSON objects.

use chrono::{DateTime, SecondsFormat, Utc};
use deceptiscan_core::{article::Article, document::Document, history::HistoryEntry};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Document ────────────────────────────────────────────────────────────────

pub fn encode_document(doc: &Document) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<Document> {
  Ok(serde_json::from_str(s)?)
}

/// Conversion for use inside a `tokio_rusqlite` closure, where only
/// `tokio_rusqlite::Error` can be returned.
pub fn in_call<T>(
  result: serde_json::Result<T>,
) -> std::result::Result<T, tokio_rusqlite::Error> {
  result.map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `history_entries` row.
pub struct RawEntry {
  pub entry_id:   String,
  pub data_json:  String,
  pub created_at: String,
  pub updated_at: Option<String>,
}

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:   row.get(0)?,
      data_json:  row.get(1)?,
      created_at: row.get(2)?,
      updated_at: row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      id:         self.entry_id,
      created_at: decode_dt(&self.created_at)?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
      data:       decode_document(&self.data_json)?,
    })
  }
}

/// Raw strings read directly from an `articles` row.
pub struct RawArticle {
  pub article_id:  String,
  pub fields_json: String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawArticle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      article_id:  row.get(0)?,
      fields_json: row.get(1)?,
      created_at:  row.get(2)?,
      updated_at:  row.get(3)?,
    })
  }

  pub fn into_article(self) -> Result<Article> {
    Ok(Article {
      id:         self.article_id,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      fields:     decode_document(&self.fields_json)?,
    })
  }
}
