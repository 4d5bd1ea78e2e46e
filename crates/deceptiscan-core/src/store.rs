//! The `HistoryStore` and `ArticleStore` traits.
//!
//! These describe the managed document database the services sit on. They
//! are implemented by storage backends (e.g. `deceptiscan-store-sqlite`);
//! `deceptiscan-api` depends only on the traits.

use std::future::Future;

use crate::{
  article::Article,
  document::Document,
  history::{HistoryEntry, Partition, TenantRoot},
};

// ─── History ─────────────────────────────────────────────────────────────────

/// Per-tenant, per-service history ledger.
///
/// Every method takes a [`Partition`]; a backend must never let an id
/// resolve outside the partition it was created in. Each call is atomic for
/// the single document it touches; no call spans several documents.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the root marker at `history/{uid}` if it does not exist yet and
  /// return it. An existing marker is left exactly as it was.
  fn ensure_root(
    &self,
    uid: String,
  ) -> impl Future<Output = Result<TenantRoot, Self::Error>> + Send + '_;

  /// Read the root marker for `uid`, if any.
  fn get_root(
    &self,
    uid: String,
  ) -> impl Future<Output = Result<Option<TenantRoot>, Self::Error>> + Send + '_;

  /// Append a new entry holding `data` and return it. The id and
  /// `createdAt` are assigned by the store.
  fn append(
    &self,
    partition: Partition,
    data: Document,
  ) -> impl Future<Output = Result<HistoryEntry, Self::Error>> + Send + '_;

  /// All entries in `partition`, newest `createdAt` first; ties fall back to
  /// reverse insertion order.
  fn list(
    &self,
    partition: Partition,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + '_;

  /// Retrieve one entry. Returns `None` if `id` is not in `partition`.
  fn get(
    &self,
    partition: Partition,
    id: String,
  ) -> impl Future<Output = Result<Option<HistoryEntry>, Self::Error>> + Send + '_;

  /// Merge the top-level fields of `patch` into an entry and refresh its
  /// `updatedAt`. Returns the updated entry, or `None` if it does not exist.
  fn merge(
    &self,
    partition: Partition,
    id: String,
    patch: Document,
  ) -> impl Future<Output = Result<Option<HistoryEntry>, Self::Error>> + Send + '_;

  /// Permanently remove an entry. Returns `false` if it did not exist.
  fn delete(
    &self,
    partition: Partition,
    id: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Articles ────────────────────────────────────────────────────────────────

/// The global article collection.
pub trait ArticleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Up to `limit` articles after skipping `offset`, newest first.
  fn list_articles(
    &self,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + '_;

  fn get_article(
    &self,
    id: String,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  /// Persist a new article; `createdAt` and `updatedAt` are both stamped.
  fn create_article(
    &self,
    fields: Document,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Merge `patch` into an article and refresh `updatedAt`. Returns `None`
  /// if the article does not exist.
  fn update_article(
    &self,
    id: String,
    patch: Document,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  /// Remove an article. Returns whether anything was removed.
  fn delete_article(
    &self,
    id: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
