//! Query assembly for full-text search and tag filtering.
//!
//! Builders produce a [`BuiltQuery`]: SQL text with positional `?`
//! placeholders and the parameter list in placeholder order. No caller
//! input is ever spliced into the SQL text itself.
//!
//! # Tag filtering
//!
//! Both request shapes restrict documents conjunctively: a document is kept
//! only if it carries every requested tag. This is done with one join over
//! `tags`/`doc_tags`, grouped by document and filtered on
//! `COUNT(d.id) = <number of tags>`. Tags are a set, so the count cannot be
//! inflated by duplicates.
//!
//! # Search shape
//!
//! ```text
//! SELECT href, position, title, <text | snippet(...)>, doc_type
//! FROM (<restricted documents>) d
//! JOIN segments s ON s.doc_id = d.id
//! JOIN segments_fts ON segments_fts.rowid = s.id
//! WHERE segments_fts MATCH ?
//! ORDER BY rank
//! [LIMIT ?]
//! ```

use std::collections::BTreeSet;

use crate::models::SnippetOptions;
use crate::tags::placeholders;

/// A bound value for one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Text(String),
    Int(i64),
}

/// SQL text plus parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
    /// Index into `params` of the free-text match string, if any.
    pub match_param: Option<usize>,
}

/// A full-text search request.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub tags: BTreeSet<String>,
    pub limit: Option<i64>,
    pub doc_type: Option<String>,
    pub snippet: Option<SnippetOptions>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_snippet(mut self, snippet: SnippetOptions) -> Self {
        self.snippet = Some(snippet);
        self
    }
}

/// A tag-only filter request.
#[derive(Debug, Clone, Default)]
pub struct TagFilterRequest {
    pub tags: BTreeSet<String>,
    pub limit: Option<i64>,
    pub doc_type: Option<String>,
}

impl TagFilterRequest {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

/// Build the full-text search query for `req`.
pub fn build_search(req: &SearchRequest) -> BuiltQuery {
    let mut params = Vec::new();

    let content = match &req.snippet {
        None => "s.text".to_string(),
        Some(snip) => {
            params.push(QueryParam::Text(snip.left.clone()));
            params.push(QueryParam::Text(snip.right.clone()));
            params.push(QueryParam::Text(snip.truncation.clone()));
            params.push(QueryParam::Int(snip.tokens));
            "snippet(segments_fts, 0, ?, ?, ?, ?)".to_string()
        }
    };

    let restricted = restricted_documents(&req.tags, req.doc_type.as_deref(), &mut params);

    let mut sql = format!(
        "SELECT d.href, s.position, d.title, {content} AS content, d.doc_type \
         FROM ({restricted}) d \
         JOIN segments s ON s.doc_id = d.id \
         JOIN segments_fts ON segments_fts.rowid = s.id \
         WHERE segments_fts MATCH ? \
         ORDER BY rank"
    );
    params.push(QueryParam::Text(req.query.clone()));
    let match_param = Some(params.len() - 1);

    push_limit(&mut sql, &mut params, req.limit);

    BuiltQuery {
        sql,
        params,
        match_param,
    }
}

/// Build the tag filter query for `req`. With an empty tag set the query
/// applies no tag restriction; `search::filter_by_tags` returns nothing
/// for that case without running it.
pub fn build_tag_filter(req: &TagFilterRequest) -> BuiltQuery {
    let mut params = Vec::new();
    let restricted = restricted_documents(&req.tags, req.doc_type.as_deref(), &mut params);

    let mut sql = format!(
        "SELECT d.href, d.title, d.doc_type FROM ({restricted}) d ORDER BY d.id"
    );
    push_limit(&mut sql, &mut params, req.limit);

    BuiltQuery {
        sql,
        params,
        match_param: None,
    }
}

/// The document subquery narrowed by tags and type. Appends its parameters
/// to `params` in the order its placeholders appear.
fn restricted_documents(
    tags: &BTreeSet<String>,
    doc_type: Option<&str>,
    params: &mut Vec<QueryParam>,
) -> String {
    let mut sql = String::from("SELECT d.id, d.href, d.title, d.doc_type FROM documents d");

    if !tags.is_empty() {
        sql.push_str(&format!(
            " JOIN tags t ON t.tag IN ({}) \
             JOIN doc_tags dt ON dt.tag_id = t.id AND dt.doc_id = d.id",
            placeholders(tags.len())
        ));
        params.extend(tags.iter().cloned().map(QueryParam::Text));
    }

    if let Some(doc_type) = doc_type {
        sql.push_str(" WHERE d.doc_type = ?");
        params.push(QueryParam::Text(doc_type.to_string()));
    }

    if !tags.is_empty() {
        sql.push_str(" GROUP BY d.id HAVING COUNT(d.id) = ?");
        params.push(QueryParam::Int(tags.len() as i64));
    }

    sql
}

fn push_limit(sql: &mut String, params: &mut Vec<QueryParam>, limit: Option<i64>) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        params.push(QueryParam::Int(limit));
    }
}
