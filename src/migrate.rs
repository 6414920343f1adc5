//! Schema creation.
//!
//! Four tables (documents, segments, tags, doc_tags) plus the `segments_fts`
//! FTS5 index. The FTS table uses external content, so the segment rows are
//! the single source of truth and the triggers below mirror every segment
//! insert, update and delete into the index inside the same statement.

use sqlx::SqlitePool;

use crate::error::{Error, Result};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id INTEGER PRIMARY KEY,
        doc_type TEXT NOT NULL,
        href TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS segments (
        id INTEGER PRIMARY KEY,
        doc_id INTEGER NOT NULL,
        position INTEGER NOT NULL DEFAULT 0,
        text TEXT NOT NULL,
        FOREIGN KEY (doc_id) REFERENCES documents(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY,
        tag TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS doc_tags (
        id INTEGER PRIMARY KEY,
        doc_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        UNIQUE(doc_id, tag_id),
        FOREIGN KEY (doc_id) REFERENCES documents(id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tags(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_segments_doc_id ON segments(doc_id)",
    "CREATE INDEX IF NOT EXISTS idx_doc_tags_tag_id ON doc_tags(tag_id)",
];

const FTS_TABLE: &str = r#"
    CREATE VIRTUAL TABLE segments_fts USING fts5(
        text,
        content = 'segments',
        content_rowid = 'id',
        tokenize = 'porter unicode61'
    )
    "#;

const FTS_TRIGGERS: &[&str] = &[
    r#"
    CREATE TRIGGER IF NOT EXISTS segments_ai AFTER INSERT ON segments BEGIN
        INSERT INTO segments_fts(rowid, text) VALUES (new.id, new.text);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS segments_ad AFTER DELETE ON segments BEGIN
        INSERT INTO segments_fts(segments_fts, rowid, text) VALUES ('delete', old.id, old.text);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS segments_au AFTER UPDATE ON segments BEGIN
        INSERT INTO segments_fts(segments_fts, rowid, text) VALUES ('delete', old.id, old.text);
        INSERT INTO segments_fts(rowid, text) VALUES (new.id, new.text);
    END
    "#,
];

/// Create all tables, indexes and triggers. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(Error::Schema)?;
    }

    // FTS5 CREATE is not idempotent natively, so we check first
    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='segments_fts'",
    )
    .fetch_one(pool)
    .await
    .map_err(Error::Schema)?;

    if !fts_exists {
        sqlx::query(FTS_TABLE)
            .execute(pool)
            .await
            .map_err(Error::Schema)?;
    }

    for trigger in FTS_TRIGGERS {
        sqlx::query(trigger)
            .execute(pool)
            .await
            .map_err(Error::Schema)?;
    }

    Ok(())
}
