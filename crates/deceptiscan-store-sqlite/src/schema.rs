//! SQL schema for the DeceptiScan SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Root marker per tenant: `history/{uid}`. Insert-if-absent only.
CREATE TABLE IF NOT EXISTS history_roots (
    uid         TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL
);

-- `history/{uid}/{service}/{entry_id}`. Entries do not reference
-- history_roots; an entry may exist without its marker.
CREATE TABLE IF NOT EXISTS history_entries (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order
    uid         TEXT NOT NULL,
    service     TEXT NOT NULL,
    entry_id    TEXT NOT NULL,
    data_json   TEXT NOT NULL,   -- JSON object, reserved keys stripped
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    updated_at  TEXT,            -- NULL until the first update
    UNIQUE (uid, service, entry_id)
);

CREATE TABLE IF NOT EXISTS articles (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id  TEXT NOT NULL UNIQUE,
    fields_json TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS history_partition_idx
    ON history_entries(uid, service, created_at);
CREATE INDEX IF NOT EXISTS articles_created_idx ON articles(created_at);

PRAGMA user_version = 1;
";
