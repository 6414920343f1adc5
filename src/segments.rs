//! Segment reconciliation.
//!
//! Stored segments are paired with incoming ones by list order, not by
//! content: the i-th existing row is overwritten with the i-th target
//! segment, surplus targets are appended and surplus rows are deleted.
//! Segment ids are therefore not content-addressed. Prepending a segment
//! shifts every later text onto a different id.

use sqlx::SqliteConnection;

use crate::error::Result;
use crate::models::Segment;

/// One row mutation produced by [`plan_segments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOp<'a> {
    Update { id: i64, segment: &'a Segment },
    Insert(&'a Segment),
    Delete(i64),
}

/// Counts of applied row mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentChanges {
    pub updated: usize,
    pub inserted: usize,
    pub deleted: usize,
}

/// Pair `existing` ids with `target` segments positionally.
///
/// Updates come first in list order, then inserts in target order, then
/// deletes of the trailing surplus ids.
pub fn plan_segments<'a>(existing: &[i64], target: &'a [Segment]) -> Vec<SegmentOp<'a>> {
    let paired = existing.len().min(target.len());
    let mut ops = Vec::with_capacity(existing.len().max(target.len()));

    for (id, segment) in existing.iter().zip(target) {
        ops.push(SegmentOp::Update { id: *id, segment });
    }
    for segment in &target[paired..] {
        ops.push(SegmentOp::Insert(segment));
    }
    for id in &existing[paired..] {
        ops.push(SegmentOp::Delete(*id));
    }

    ops
}

/// Converge the segments of `doc_id` to `target`, reusing the rows in
/// `existing` (which must be ordered by insertion).
pub async fn reconcile_segments(
    conn: &mut SqliteConnection,
    doc_id: i64,
    existing: &[i64],
    target: &[Segment],
) -> Result<SegmentChanges> {
    let mut changes = SegmentChanges::default();

    for op in plan_segments(existing, target) {
        match op {
            SegmentOp::Update { id, segment } => {
                sqlx::query("UPDATE segments SET position = ?, text = ? WHERE id = ?")
                    .bind(segment.position)
                    .bind(&segment.text)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                changes.updated += 1;
            }
            SegmentOp::Insert(segment) => {
                insert_segment(conn, doc_id, segment).await?;
                changes.inserted += 1;
            }
            SegmentOp::Delete(id) => {
                sqlx::query("DELETE FROM segments WHERE id = ?")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                changes.deleted += 1;
            }
        }
    }

    Ok(changes)
}

/// Insert all `segments` for a freshly created document, in order.
pub async fn insert_segments(
    conn: &mut SqliteConnection,
    doc_id: i64,
    segments: &[Segment],
) -> Result<SegmentChanges> {
    for segment in segments {
        insert_segment(conn, doc_id, segment).await?;
    }
    Ok(SegmentChanges {
        inserted: segments.len(),
        ..SegmentChanges::default()
    })
}

/// Ids of the document's segments in insertion order.
pub async fn segment_ids(conn: &mut SqliteConnection, doc_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM segments WHERE doc_id = ? ORDER BY id")
        .bind(doc_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

async fn insert_segment(conn: &mut SqliteConnection, doc_id: i64, segment: &Segment) -> Result<()> {
    sqlx::query("INSERT INTO segments (doc_id, position, text) VALUES (?, ?, ?)")
        .bind(doc_id)
        .bind(segment.position)
        .bind(&segment.text)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
