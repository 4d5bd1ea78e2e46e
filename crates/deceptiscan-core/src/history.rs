//! History ledger types.
//!
//! Every entry lives in exactly one partition `history/{uid}/{service}`. The
//! uid comes from the verified caller, the service from the route, and the
//! entry id from the store. Nothing in a client payload can move an entry to
//! another partition.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, document::Document};

// ─── Service namespace ───────────────────────────────────────────────────────

/// A client-chosen sub-ledger name such as `linkAnalyser` or
/// `messageAnalyser`. Not checked against a fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);

impl ServiceName {
  /// Accept any non-empty string that forms a single path segment.
  /// Whitespace is a legal name.
  pub fn parse(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    if raw.is_empty() || raw.contains('/') {
      return Err(Error::InvalidServiceName(raw));
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for ServiceName {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { Self::parse(raw) }
}

impl From<ServiceName> for String {
  fn from(name: ServiceName) -> Self { name.0 }
}

impl fmt::Display for ServiceName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Partition ───────────────────────────────────────────────────────────────

/// The `(uid, service)` pair that scopes every history operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
  pub uid:     String,
  pub service: ServiceName,
}

impl Partition {
  pub fn new(uid: impl Into<String>, service: ServiceName) -> Self {
    Self { uid: uid.into(), service }
  }
}

impl fmt::Display for Partition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "history/{}/{}", self.uid, self.service)
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Placeholder document at `history/{uid}` marking that a tenant's namespace
/// exists. Created on first write and never overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRoot {
  pub uid:        String,
  pub created_at: DateTime<Utc>,
}

/// One remembered analysis result.
///
/// Serialises flat, the way clients see it:
/// `{"id": "...", "createdAt": "...", "url": "...", "safe": true, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub id:         String,
  /// Server-assigned once at creation; the sole listing sort key.
  pub created_at: DateTime<Utc>,
  /// Server-assigned on every update; absent until the first one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub data:       Document,
}
