//! Index statistics.
//!
//! A quick summary of what's indexed: document, segment, tag and link
//! counts plus a per-type breakdown. Used by `knov stats`.

use sqlx::{Row, SqlitePool};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: i64,
    pub segments: i64,
    pub tags: i64,
    pub links: i64,
    /// `(doc_type, document count)`, largest first.
    pub by_type: Vec<(String, i64)>,
}

pub async fn collect_stats(pool: &SqlitePool) -> Result<IndexStats> {
    let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    let segments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM segments")
        .fetch_one(pool)
        .await?;
    let tags: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(pool)
        .await?;
    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doc_tags")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(
        r#"
        SELECT doc_type, COUNT(*) AS doc_count
        FROM documents
        GROUP BY doc_type
        ORDER BY doc_count DESC, doc_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    let by_type: Vec<(String, i64)> = rows
        .iter()
        .map(|row| (row.get("doc_type"), row.get("doc_count")))
        .collect();

    Ok(IndexStats {
        documents,
        segments,
        tags,
        links,
        by_type,
    })
}
