//! [`SqliteStore`]: the SQLite implementation of [`HistoryStore`] and
//! [`ArticleStore`].

use std::{path::Path, sync::Arc};

use rusqlite::OptionalExtension as _;

use deceptiscan_core::{
  article::Article,
  clock::MonotonicClock,
  document::{Document, merge_fields, new_document_id, strip_reserved},
  history::{HistoryEntry, Partition, TenantRoot},
  store::{ArticleStore, HistoryStore},
};

use crate::{
  Result,
  encode::{
    RawArticle, RawEntry, decode_dt, encode_document, encode_dt, in_call,
  },
  schema::SCHEMA,
};

const ENTRY_COLUMNS: &str = "entry_id, data_json, created_at, updated_at";
const ARTICLE_COLUMNS: &str = "article_id, fields_json, created_at, updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection and clock are reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<MonotonicClock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(Self { conn, clock: Arc::new(MonotonicClock::new()) })
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = crate::Error;

  async fn ensure_root(&self, uid: String) -> Result<TenantRoot> {
    let at_str = encode_dt(self.clock.now());

    let (uid, created_at): (String, String) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO history_roots (uid, created_at) VALUES (?1, ?2)",
          rusqlite::params![uid, at_str],
        )?;
        let created_at: String = conn.query_row(
          "SELECT created_at FROM history_roots WHERE uid = ?1",
          rusqlite::params![uid],
          |row| row.get(0),
        )?;
        Ok((uid, created_at))
      })
      .await?;

    Ok(TenantRoot { uid, created_at: decode_dt(&created_at)? })
  }

  async fn get_root(&self, uid: String) -> Result<Option<TenantRoot>> {
    let created_at: Option<String> = self
      .conn
      .call({
        let uid = uid.clone();
        move |conn| {
          Ok(conn
            .query_row(
              "SELECT created_at FROM history_roots WHERE uid = ?1",
              rusqlite::params![uid],
              |row| row.get(0),
            )
            .optional()?)
        }
      })
      .await?;

    created_at
      .map(|at| Ok(TenantRoot { uid, created_at: decode_dt(&at)? }))
      .transpose()
  }

  async fn append(
    &self,
    partition: Partition,
    data: Document,
  ) -> Result<HistoryEntry> {
    let entry = HistoryEntry {
      id:         new_document_id(),
      created_at: self.clock.now(),
      updated_at: None,
      data:       strip_reserved(data),
    };

    let uid         = partition.uid;
    let service     = partition.service.to_string();
    let entry_id    = entry.id.clone();
    let data_json   = encode_document(&entry.data)?;
    let created_str = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO history_entries (uid, service, entry_id, data_json, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![uid, service, entry_id, data_json, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn list(&self, partition: Partition) -> Result<Vec<HistoryEntry>> {
    let uid     = partition.uid;
    let service = partition.service.to_string();

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ENTRY_COLUMNS} FROM history_entries
           WHERE uid = ?1 AND service = ?2
           ORDER BY created_at DESC, seq DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![uid, service], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn get(
    &self,
    partition: Partition,
    id: String,
  ) -> Result<Option<HistoryEntry>> {
    let uid     = partition.uid;
    let service = partition.service.to_string();

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {ENTRY_COLUMNS} FROM history_entries
               WHERE uid = ?1 AND service = ?2 AND entry_id = ?3"
            ),
            rusqlite::params![uid, service, id],
            RawEntry::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn merge(
    &self,
    partition: Partition,
    id: String,
    patch: Document,
  ) -> Result<Option<HistoryEntry>> {
    let uid     = partition.uid;
    let service = partition.service.to_string();
    let patch   = strip_reserved(patch);
    let clock   = self.clock.clone();

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Stamped under the connection so stamp order matches commit order.
        let updated_str = encode_dt(clock.now());
        let current = tx
          .query_row(
            &format!(
              "SELECT {ENTRY_COLUMNS} FROM history_entries
               WHERE uid = ?1 AND service = ?2 AND entry_id = ?3"
            ),
            rusqlite::params![uid, service, id],
            RawEntry::from_row,
          )
          .optional()?;
        let Some(mut raw) = current else {
          return Ok(None);
        };

        let mut data: Document = in_call(serde_json::from_str(&raw.data_json))?;
        merge_fields(&mut data, patch);
        raw.data_json = in_call(serde_json::to_string(&data))?;
        raw.updated_at = Some(updated_str);

        tx.execute(
          "UPDATE history_entries SET data_json = ?1, updated_at = ?2
           WHERE uid = ?3 AND service = ?4 AND entry_id = ?5",
          rusqlite::params![raw.data_json, raw.updated_at, uid, service, id],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn delete(&self, partition: Partition, id: String) -> Result<bool> {
    let uid     = partition.uid;
    let service = partition.service.to_string();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM history_entries
           WHERE uid = ?1 AND service = ?2 AND entry_id = ?3",
          rusqlite::params![uid, service, id],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}

// ─── ArticleStore impl ───────────────────────────────────────────────────────

impl ArticleStore for SqliteStore {
  type Error = crate::Error;

  async fn list_articles(&self, limit: usize, offset: usize) -> Result<Vec<Article>> {
    let limit_val  = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(offset).unwrap_or(i64::MAX);

    let raws: Vec<RawArticle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTICLE_COLUMNS} FROM articles
           ORDER BY created_at DESC, seq DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], RawArticle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArticle::into_article).collect()
  }

  async fn get_article(&self, id: String) -> Result<Option<Article>> {
    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = ?1"),
            rusqlite::params![id],
            RawArticle::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawArticle::into_article).transpose()
  }

  async fn create_article(&self, fields: Document) -> Result<Article> {
    let now = self.clock.now();
    let article = Article {
      id:         new_document_id(),
      created_at: now,
      updated_at: now,
      fields:     strip_reserved(fields),
    };

    let article_id  = article.id.clone();
    let fields_json = encode_document(&article.fields)?;
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO articles (article_id, fields_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![article_id, fields_json, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(article)
  }

  async fn update_article(
    &self,
    id: String,
    patch: Document,
  ) -> Result<Option<Article>> {
    let patch = strip_reserved(patch);
    let clock = self.clock.clone();

    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let updated_str = encode_dt(clock.now());
        let current = tx
          .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE article_id = ?1"),
            rusqlite::params![id],
            RawArticle::from_row,
          )
          .optional()?;
        let Some(mut raw) = current else {
          return Ok(None);
        };

        let mut fields: Document = in_call(serde_json::from_str(&raw.fields_json))?;
        merge_fields(&mut fields, patch);
        raw.fields_json = in_call(serde_json::to_string(&fields))?;
        raw.updated_at = updated_str;

        tx.execute(
          "UPDATE articles SET fields_json = ?1, updated_at = ?2 WHERE article_id = ?3",
          rusqlite::params![raw.fields_json, raw.updated_at, id],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawArticle::into_article).transpose()
  }

  async fn delete_article(&self, id: String) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM articles WHERE article_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
