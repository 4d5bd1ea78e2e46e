//! Integration tests for `SqliteStore` against an in-memory database.

use deceptiscan_core::{
  document::{Document, from_value},
  history::{Partition, ServiceName},
  store::{ArticleStore, HistoryStore},
};
use serde_json::{Value, json};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn partition(uid: &str, service: &str) -> Partition {
  Partition::new(uid, ServiceName::parse(service).unwrap())
}

fn doc(value: Value) -> Document { from_value(value).unwrap() }

// ─── Root marker ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_root_is_idempotent_and_never_overwrites() {
  let s = store().await;
  assert!(s.get_root("alice".into()).await.unwrap().is_none());

  let first = s.ensure_root("alice".into()).await.unwrap();
  let second = s.ensure_root("alice".into()).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(s.get_root("alice".into()).await.unwrap(), Some(first));
}

#[tokio::test]
async fn entries_exist_without_a_root_marker() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");

  let entry = s.append(p.clone(), doc(json!({ "url": "http://x" }))).await.unwrap();
  assert!(s.get_root("alice".into()).await.unwrap().is_none());
  assert!(s.get(p, entry.id).await.unwrap().is_some());
}

// ─── Append / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_then_get_returns_payload() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");
  let data = doc(json!({ "url": "http://x", "safe": true, "issues": [] }));

  let created = s.append(p.clone(), data.clone()).await.unwrap();
  let fetched = s.get(p, created.id.clone()).await.unwrap().unwrap();

  assert_eq!(fetched, created);
  assert_eq!(fetched.data, data);
  assert!(fetched.updated_at.is_none());
}

#[tokio::test]
async fn append_strips_server_managed_keys() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");

  let created = s
    .append(
      p.clone(),
      doc(json!({ "id": "mine", "createdAt": "1999-01-01T00:00:00Z", "safe": false })),
    )
    .await
    .unwrap();

  assert_ne!(created.id, "mine");
  assert_eq!(Value::Object(created.data.clone()), json!({ "safe": false }));
  assert!(s.get(p, "mine".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_payloads_get_distinct_ids() {
  let s = store().await;
  let p = partition("alice", "messageAnalyser");
  let data = doc(json!({ "message": "you won", "classification": "scam" }));

  let a = s.append(p.clone(), data.clone()).await.unwrap();
  let b = s.append(p.clone(), data).await.unwrap();
  assert_ne!(a.id, b.id);
  assert_eq!(s.list(p).await.unwrap().len(), 2);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");

  let mut ids = Vec::new();
  for n in 1..=3 {
    ids.push(s.append(p.clone(), doc(json!({ "n": n }))).await.unwrap().id);
  }

  let listed: Vec<String> =
    s.list(p).await.unwrap().into_iter().map(|e| e.id).collect();
  ids.reverse();
  assert_eq!(listed, ids);
}

#[tokio::test]
async fn list_of_empty_partition_is_empty() {
  let s = store().await;
  assert!(s.list(partition("nobody", "linkAnalyser")).await.unwrap().is_empty());
}

#[tokio::test]
async fn partitions_are_isolated_by_user_and_service() {
  let s = store().await;
  let alice_links = partition("alice", "linkAnalyser");
  let alice_news = partition("alice", "FakeNewsDetector");
  let bob_links = partition("bob", "linkAnalyser");

  let entry = s
    .append(alice_links.clone(), doc(json!({ "url": "http://x" })))
    .await
    .unwrap();

  assert!(s.list(bob_links.clone()).await.unwrap().is_empty());
  assert!(s.list(alice_news.clone()).await.unwrap().is_empty());
  assert!(s.get(bob_links.clone(), entry.id.clone()).await.unwrap().is_none());
  assert!(s.get(alice_news, entry.id.clone()).await.unwrap().is_none());

  // Writes through a foreign partition must not touch the entry either.
  assert!(
    s.merge(bob_links.clone(), entry.id.clone(), doc(json!({ "url": "evil" })))
      .await
      .unwrap()
      .is_none()
  );
  assert!(!s.delete(bob_links, entry.id.clone()).await.unwrap());

  let still_there = s.get(alice_links, entry.id).await.unwrap().unwrap();
  assert_eq!(still_there.data["url"], "http://x");
  assert!(still_there.updated_at.is_none());
}

// ─── Merge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_keeps_untouched_fields_and_stamps_updated_at() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");
  let created = s.append(p.clone(), doc(json!({ "y": "keep" }))).await.unwrap();

  let merged = s
    .merge(p.clone(), created.id.clone(), doc(json!({ "x": 1 })))
    .await
    .unwrap()
    .unwrap();

  assert_eq!(Value::Object(merged.data.clone()), json!({ "x": 1, "y": "keep" }));
  assert_eq!(merged.created_at, created.created_at);
  let updated_at = merged.updated_at.expect("updatedAt set");
  assert!(updated_at > merged.created_at);

  assert_eq!(s.get(p, created.id).await.unwrap().unwrap(), merged);
}

#[tokio::test]
async fn merge_cannot_move_created_at() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");
  let created = s.append(p.clone(), doc(json!({}))).await.unwrap();

  let merged = s
    .merge(
      p,
      created.id.clone(),
      doc(json!({ "createdAt": "2000-01-01T00:00:00Z", "id": "other" })),
    )
    .await
    .unwrap()
    .unwrap();

  assert_eq!(merged.id, created.id);
  assert_eq!(merged.created_at, created.created_at);
  assert!(merged.data.is_empty());
}

#[tokio::test]
async fn merge_with_empty_patch_only_refreshes_updated_at() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");
  let created = s.append(p.clone(), doc(json!({ "a": 1 }))).await.unwrap();

  let first = s.merge(p.clone(), created.id.clone(), Document::new()).await.unwrap().unwrap();
  let second = s.merge(p, created.id, Document::new()).await.unwrap().unwrap();

  assert_eq!(first.data, created.data);
  assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn merge_missing_entry_returns_none() {
  let s = store().await;
  let result = s
    .merge(partition("alice", "linkAnalyser"), "nope".into(), doc(json!({ "x": 1 })))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn concurrent_merges_leave_the_latest_stamp_on_the_last_write() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");
  let created = s.append(p.clone(), doc(json!({}))).await.unwrap();

  let handles: Vec<_> = (0..16)
    .map(|n| {
      let (s, p, id) = (s.clone(), p.clone(), created.id.clone());
      tokio::spawn(async move {
        s.merge(p, id, doc(json!({ "n": n }))).await.unwrap().unwrap()
      })
    })
    .collect();

  let mut results = Vec::new();
  for handle in handles {
    results.push(handle.await.unwrap());
  }
  let last = results
    .iter()
    .max_by_key(|entry| entry.updated_at)
    .unwrap();

  let stored = s.get(p, created.id).await.unwrap().unwrap();
  assert_eq!(stored.updated_at, last.updated_at);
  assert_eq!(stored.data["n"], last.data["n"]);
}

#[tokio::test]
async fn concurrent_article_updates_leave_the_latest_stamp_on_the_last_write() {
  let s = store().await;
  let created = s.create_article(doc(json!({}))).await.unwrap();

  let handles: Vec<_> = (0..16)
    .map(|n| {
      let (s, id) = (s.clone(), created.id.clone());
      tokio::spawn(async move {
        s.update_article(id, doc(json!({ "n": n }))).await.unwrap().unwrap()
      })
    })
    .collect();

  let mut results = Vec::new();
  for handle in handles {
    results.push(handle.await.unwrap());
  }
  let last = results.iter().max_by_key(|a| a.updated_at).unwrap();

  let stored = s.get_article(created.id).await.unwrap().unwrap();
  assert_eq!(stored.updated_at, last.updated_at);
  assert_eq!(stored.fields["n"], last.fields["n"]);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_is_permanent() {
  let s = store().await;
  let p = partition("alice", "linkAnalyser");
  let created = s.append(p.clone(), doc(json!({ "x": 1 }))).await.unwrap();

  assert!(s.delete(p.clone(), created.id.clone()).await.unwrap());
  assert!(s.get(p.clone(), created.id.clone()).await.unwrap().is_none());
  assert!(!s.delete(p.clone(), created.id.clone()).await.unwrap());
  assert!(s.merge(p.clone(), created.id, doc(json!({}))).await.unwrap().is_none());
  assert!(s.list(p).await.unwrap().is_empty());
}

// ─── Articles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn article_create_get_roundtrip() {
  let s = store().await;
  let fields = doc(json!({ "title": "Phishing 101", "body": "..." }));

  let created = s.create_article(fields.clone()).await.unwrap();
  assert_eq!(created.created_at, created.updated_at);
  assert_eq!(created.fields, fields);

  let fetched = s.get_article(created.id.clone()).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert!(s.get_article("missing".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn article_list_pages_newest_first() {
  let s = store().await;
  let mut ids = Vec::new();
  for n in 0..5 {
    ids.push(s.create_article(doc(json!({ "n": n }))).await.unwrap().id);
  }
  ids.reverse();

  let first: Vec<_> =
    s.list_articles(2, 0).await.unwrap().into_iter().map(|a| a.id).collect();
  let second: Vec<_> =
    s.list_articles(2, 2).await.unwrap().into_iter().map(|a| a.id).collect();
  let third: Vec<_> =
    s.list_articles(2, 4).await.unwrap().into_iter().map(|a| a.id).collect();

  assert_eq!(first, ids[0..2]);
  assert_eq!(second, ids[2..4]);
  assert_eq!(third, ids[4..5]);
  assert!(s.list_articles(2, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn article_update_merges_and_delete_is_idempotent() {
  let s = store().await;
  let created = s
    .create_article(doc(json!({ "title": "Old", "author": "team" })))
    .await
    .unwrap();

  let updated = s
    .update_article(created.id.clone(), doc(json!({ "title": "New" })))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(
    Value::Object(updated.fields.clone()),
    json!({ "title": "New", "author": "team" })
  );
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at > created.updated_at);

  assert!(s.update_article("missing".into(), doc(json!({}))).await.unwrap().is_none());

  assert!(s.delete_article(created.id.clone()).await.unwrap());
  assert!(!s.delete_article(created.id.clone()).await.unwrap());
  assert!(s.get_article(created.id).await.unwrap().is_none());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_entries() {
  let path = std::env::temp_dir().join(format!(
    "deceptiscan-store-{}.sqlite",
    deceptiscan_core::document::new_document_id()
  ));
  let p = partition("alice", "linkAnalyser");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.ensure_root("alice".into()).await.unwrap();
    s.append(p.clone(), doc(json!({ "url": "http://x" }))).await.unwrap().id
  };

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert!(reopened.get_root("alice".into()).await.unwrap().is_some());
  assert!(reopened.get(p, id).await.unwrap().is_some());

  drop(reopened);
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}
