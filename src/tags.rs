//! Tag reconciliation.
//!
//! Converges the tag links of one document to a target tag set with the
//! minimal number of link inserts and deletes. Tag rows are created lazily
//! and never removed.
//!
//! All functions take a `&mut SqliteConnection` so the caller decides the
//! transaction boundary; [`crate::ingest`] passes its upsert transaction.

use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::BTreeSet;

use crate::error::Result;

/// Converge the links of `doc_id` to exactly `tags`.
///
/// Returns the resolved tag ids. An empty `tags` removes every link.
pub async fn reconcile_tags(
    conn: &mut SqliteConnection,
    doc_id: i64,
    tags: &BTreeSet<String>,
) -> Result<BTreeSet<i64>> {
    let target_ids = resolve_tag_ids(conn, tags).await?;
    sync_links(conn, doc_id, &target_ids).await?;
    Ok(target_ids)
}

/// Look up the id of every tag text, creating rows for unknown texts.
pub async fn resolve_tag_ids(
    conn: &mut SqliteConnection,
    tags: &BTreeSet<String>,
) -> Result<BTreeSet<i64>> {
    if tags.is_empty() {
        return Ok(BTreeSet::new());
    }

    let sql = format!(
        "SELECT id, tag FROM tags WHERE tag IN ({})",
        placeholders(tags.len())
    );
    let mut query = sqlx::query::<Sqlite>(&sql);
    for tag in tags {
        query = query.bind(tag);
    }
    let rows = query.fetch_all(&mut *conn).await?;

    let mut ids = BTreeSet::new();
    let mut found: BTreeSet<String> = BTreeSet::new();
    for row in &rows {
        ids.insert(row.get::<i64, _>("id"));
        found.insert(row.get("tag"));
    }

    for tag in tags.difference(&found) {
        // The UNIQUE constraint turns a racing duplicate into a no-op update
        // that still hands back the existing id.
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tags (tag) VALUES (?) ON CONFLICT(tag) DO UPDATE SET tag = excluded.tag RETURNING id",
        )
        .bind(tag)
        .fetch_one(&mut *conn)
        .await?;
        tracing::debug!(tag = %tag, id, "created tag");
        ids.insert(id);
    }

    Ok(ids)
}

/// Insert and delete links so the tag ids of `doc_id` equal `target_ids`.
pub async fn sync_links(
    conn: &mut SqliteConnection,
    doc_id: i64,
    target_ids: &BTreeSet<i64>,
) -> Result<()> {
    let current_ids: BTreeSet<i64> =
        sqlx::query_scalar("SELECT tag_id FROM doc_tags WHERE doc_id = ?")
            .bind(doc_id)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .collect();

    let stale: Vec<i64> = current_ids.difference(target_ids).copied().collect();
    let missing: Vec<i64> = target_ids.difference(&current_ids).copied().collect();

    for tag_id in &stale {
        sqlx::query("DELETE FROM doc_tags WHERE doc_id = ? AND tag_id = ?")
            .bind(doc_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    for tag_id in &missing {
        sqlx::query("INSERT INTO doc_tags (doc_id, tag_id) VALUES (?, ?)")
            .bind(doc_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    tracing::debug!(
        doc_id,
        removed = stale.len(),
        added = missing.len(),
        "synced tag links"
    );
    Ok(())
}

/// Tag texts linked to the document with the given href, sorted.
pub async fn tags_by_href(pool: &SqlitePool, href: &str) -> Result<Vec<String>> {
    let tags = sqlx::query_scalar(
        r#"
        SELECT t.tag
        FROM tags t
        JOIN doc_tags dt ON dt.tag_id = t.id
        JOIN documents d ON d.id = dt.doc_id
        WHERE d.href = ?
        ORDER BY t.tag
        "#,
    )
    .bind(href)
    .fetch_all(pool)
    .await?;
    Ok(tags)
}

/// `?, ?, ?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
