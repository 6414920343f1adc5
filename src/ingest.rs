//! Document upsert.
//!
//! Keyed by `href`: the first index of an href creates the document and
//! inserts its segments, every later one updates the row in place and runs
//! the segment and tag reconcilers. The whole upsert is one transaction that
//! is rolled back on any failure, so readers never see a half-reconciled
//! document.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{Error, Result};
use crate::models::ParsedDocument;
use crate::segments::{self, SegmentChanges};
use crate::tags;

/// What an upsert did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub document_id: i64,
    pub created: bool,
    pub segments: SegmentChanges,
    pub tag_count: usize,
}

/// Create or reconcile `doc` atomically.
///
/// Calling this twice with identical content leaves the store unchanged
/// after the second call.
///
/// # Errors
///
/// Any failure rolls the transaction back and is returned as
/// [`Error::Upsert`] carrying the href and the underlying cause.
pub async fn upsert_document(pool: &SqlitePool, doc: &ParsedDocument) -> Result<UpsertOutcome> {
    let mut tx = pool.begin().await?;

    match upsert_in(&mut *tx, doc).await {
        Ok(outcome) => {
            tx.commit().await.map_err(|e| Error::Upsert {
                href: doc.href.clone(),
                source: Box::new(Error::Store(e)),
            })?;

            if outcome.created {
                tracing::info!(href = %doc.href, id = outcome.document_id, "indexed new document");
            } else {
                tracing::info!(href = %doc.href, id = outcome.document_id, "re-indexed document");
            }
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!(href = %doc.href, error = %e, "upsert failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(Error::Upsert {
                href: doc.href.clone(),
                source: Box::new(e),
            })
        }
    }
}

async fn upsert_in(conn: &mut SqliteConnection, doc: &ParsedDocument) -> Result<UpsertOutcome> {
    let existing_id: Option<i64> = sqlx::query_scalar("SELECT id FROM documents WHERE href = ?")
        .bind(&doc.href)
        .fetch_optional(&mut *conn)
        .await?;

    let (document_id, created, changes) = match existing_id {
        None => {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO documents (doc_type, href, title) VALUES (?, ?, ?) RETURNING id",
            )
            .bind(&doc.doc_type)
            .bind(&doc.href)
            .bind(&doc.title)
            .fetch_one(&mut *conn)
            .await?;

            let changes = segments::insert_segments(conn, id, &doc.segments).await?;
            (id, true, changes)
        }
        Some(id) => {
            sqlx::query("UPDATE documents SET doc_type = ?, title = ? WHERE id = ?")
                .bind(&doc.doc_type)
                .bind(&doc.title)
                .bind(id)
                .execute(&mut *conn)
                .await?;

            let existing = segments::segment_ids(conn, id).await?;
            let changes = segments::reconcile_segments(conn, id, &existing, &doc.segments).await?;
            (id, false, changes)
        }
    };

    tracing::debug!(
        id = document_id,
        updated = changes.updated,
        inserted = changes.inserted,
        deleted = changes.deleted,
        "reconciled segments"
    );

    let tag_ids = tags::reconcile_tags(conn, document_id, &doc.tags).await?;

    Ok(UpsertOutcome {
        document_id,
        created,
        segments: changes,
        tag_count: tag_ids.len(),
    })
}

/// Whether a document with this href has been indexed.
pub async fn href_exists(pool: &SqlitePool, href: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM documents WHERE href = ?")
        .bind(href)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}
