//! Schemaless JSON documents.
//!
//! History payloads and articles are opaque to the services: whatever object
//! the client sends is stored and returned unchanged, apart from the
//! server-managed keys listed in [`RESERVED_FIELDS`].

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

/// A JSON object as stored in the document store.
pub type Document = Map<String, Value>;

/// Keys owned by the server. They are stripped from every client-supplied
/// document so a payload can never spoof an id or move `createdAt`.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Interpret `value` as a [`Document`], rejecting every non-object JSON value.
pub fn from_value(value: Value) -> Result<Document> {
  match value {
    Value::Object(map) => Ok(map),
    other => Err(Error::NotAnObject(json_kind(&other))),
  }
}

/// Remove [`RESERVED_FIELDS`] from a client-supplied document.
pub fn strip_reserved(mut doc: Document) -> Document {
  for key in RESERVED_FIELDS {
    doc.remove(key);
  }
  doc
}

/// Shallow merge: every top-level key of `patch` replaces the same key in
/// `target`. Keys absent from `patch` are left untouched; nested objects are
/// replaced wholesale, not merged.
pub fn merge_fields(target: &mut Document, patch: Document) {
  for (key, value) in patch {
    target.insert(key, value);
  }
}

/// Generate a fresh document id: 32 lowercase hex characters.
pub fn new_document_id() -> String { Uuid::new_v4().simple().to_string() }

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn doc(value: Value) -> Document { from_value(value).unwrap() }

  #[test]
  fn from_value_rejects_non_objects() {
    assert!(matches!(from_value(json!([1, 2])), Err(Error::NotAnObject("an array"))));
    assert!(matches!(from_value(json!("x")), Err(Error::NotAnObject("a string"))));
    assert!(matches!(from_value(Value::Null), Err(Error::NotAnObject("null"))));
    assert!(from_value(json!({})).is_ok());
  }

  #[test]
  fn strip_reserved_keeps_payload_fields() {
    let stripped = strip_reserved(doc(json!({
      "id": "spoofed",
      "createdAt": "1970-01-01T00:00:00Z",
      "updatedAt": "1970-01-01T00:00:00Z",
      "url": "http://x",
    })));
    assert_eq!(Value::Object(stripped), json!({ "url": "http://x" }));
  }

  #[test]
  fn merge_replaces_top_level_keys_only() {
    let mut target = doc(json!({ "y": 2, "nested": { "a": 1, "b": 2 } }));
    merge_fields(&mut target, doc(json!({ "x": 1, "nested": { "a": 9 } })));
    assert_eq!(
      Value::Object(target),
      json!({ "x": 1, "y": 2, "nested": { "a": 9 } })
    );
  }

  #[test]
  fn document_ids_are_unique_hex() {
    let a = new_document_id();
    let b = new_document_id();
    assert_ne!(a, b);
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
  }
}
