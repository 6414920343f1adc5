//! Query execution with literal-quoting fallback.
//!
//! FTS5 parses the free-text query with its own grammar, so input such as
//! `don"t` or `sun AND` is rejected at execution time. When that happens the
//! query is retried exactly once with the raw string wrapped as an FTS5
//! string literal, which makes every character ordinary text. A second
//! failure is returned to the caller.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool};

use crate::error::{Error, Result};
use crate::models::{SearchHit, TagFilterHit};
use crate::query::{
    build_search, build_tag_filter, BuiltQuery, QueryParam, SearchRequest, TagFilterRequest,
};

/// Run a full-text search, ranked best-first.
pub async fn search(pool: &SqlitePool, req: &SearchRequest) -> Result<Vec<SearchHit>> {
    if req.query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let built = build_search(req);
    let rows = match fetch(pool, &built).await {
        Ok(rows) => rows,
        Err(e) if is_query_syntax_error(&e) => {
            tracing::warn!(query = %req.query, error = %e, "query rejected, retrying as literal text");
            let quoted = with_literal_query(&built, &req.query);
            match fetch(pool, &quoted).await {
                Ok(rows) => rows,
                Err(e) if is_query_syntax_error(&e) => {
                    return Err(Error::QuerySyntax {
                        query: req.query.clone(),
                        source: e,
                    });
                }
                Err(e) => return Err(Error::Store(e)),
            }
        }
        Err(e) => return Err(Error::Store(e)),
    };

    let hits: Vec<SearchHit> = rows
        .iter()
        .map(|row| SearchHit {
            href: row.get("href"),
            position: row.get("position"),
            title: row.get("title"),
            content: row.get("content"),
            doc_type: row.get("doc_type"),
        })
        .collect();
    Ok(hits)
}

/// Documents carrying every requested tag, in indexing order. An empty
/// tag set matches nothing.
pub async fn filter_by_tags(pool: &SqlitePool, req: &TagFilterRequest) -> Result<Vec<TagFilterHit>> {
    if req.tags.is_empty() {
        return Ok(Vec::new());
    }

    let built = build_tag_filter(req);
    let rows = fetch(pool, &built).await?;

    let hits: Vec<TagFilterHit> = rows
        .iter()
        .map(|row| TagFilterHit {
            href: row.get("href"),
            title: row.get("title"),
            doc_type: row.get("doc_type"),
        })
        .collect();
    Ok(hits)
}

async fn fetch(pool: &SqlitePool, built: &BuiltQuery) -> std::result::Result<Vec<SqliteRow>, sqlx::Error> {
    let mut query = sqlx::query::<Sqlite>(&built.sql);
    for param in &built.params {
        query = match param {
            QueryParam::Text(s) => query.bind(s.as_str()),
            QueryParam::Int(n) => query.bind(*n),
        };
    }
    query.fetch_all(pool).await
}

/// Wrap `raw` as an FTS5 string literal, doubling embedded quotes.
pub fn quote_literal(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

fn with_literal_query(built: &BuiltQuery, raw: &str) -> BuiltQuery {
    let mut quoted = built.clone();
    if let Some(idx) = quoted.match_param {
        quoted.params[idx] = QueryParam::Text(quote_literal(raw));
    }
    quoted
}

/// Whether `err` is FTS5 rejecting the MATCH expression, as opposed to a
/// store or schema failure.
fn is_query_syntax_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => is_fts_syntax_message(db.message()),
        _ => false,
    }
}

fn is_fts_syntax_message(message: &str) -> bool {
    const MARKERS: &[&str] = &[
        "fts5: syntax error",
        "unterminated string",
        "unknown special query",
        "fts5: parser stack overflow",
    ];
    if MARKERS.iter().any(|m| message.starts_with(m)) {
        return true;
    }
    // FTS5 reports an unknown `col:` filter with a bare name. A qualified
    // name (`s.position`) comes from the outer statement, i.e. the schema.
    match message.strip_prefix("no such column: ") {
        Some(column) => !column.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_wraps_plain_text() {
        assert_eq!(quote_literal("shine"), "\"shine\"");
    }

    #[test]
    fn test_quote_literal_doubles_embedded_quotes() {
        assert_eq!(quote_literal("say \"hi"), "\"say \"\"hi\"");
    }

    #[test]
    fn test_literal_query_replaces_only_match_param() {
        let req = SearchRequest::new("a\"b").with_tags(["a\"b"]).with_limit(3);
        let built = build_search(&req);
        let quoted = with_literal_query(&built, &req.query);

        let idx = built.match_param.unwrap();
        assert_eq!(quoted.params[idx], QueryParam::Text("\"a\"\"b\"".into()));
        assert_eq!(quoted.params[0], QueryParam::Text("a\"b".into()));
        assert_eq!(quoted.sql, built.sql);
    }

    #[test]
    fn test_syntax_messages_are_recognised() {
        assert!(is_fts_syntax_message("fts5: syntax error near \"\""));
        assert!(is_fts_syntax_message("unterminated string"));
        assert!(is_fts_syntax_message("no such column: title"));
        assert!(!is_fts_syntax_message("database is locked"));
        assert!(!is_fts_syntax_message("no such table: segments_fts"));
    }

    #[test]
    fn test_qualified_missing_column_is_not_syntax() {
        assert!(!is_fts_syntax_message("no such column: s.position"));
        assert!(!is_fts_syntax_message("no such column: d.doc_type"));
    }
}
