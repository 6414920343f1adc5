//! Core data models.
//!
//! [`ParsedDocument`] is what document types hand to the index; the search
//! row types are what the query engine hands back.

use std::collections::BTreeSet;

/// One ordered chunk of a document's text (a page, a paragraph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub position: i64,
    pub text: String,
}

impl Segment {
    pub fn new(position: i64, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// A document ready to be stored, keyed by its `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub href: String,
    pub title: String,
    pub doc_type: String,
    pub segments: Vec<Segment>,
    pub tags: BTreeSet<String>,
}

/// Caller input for indexing a source through a registered document type.
#[derive(Debug, Clone, Default)]
pub struct IndexRequest {
    pub href: String,
    pub title: String,
    pub tags: BTreeSet<String>,
}

/// Snippet markup produced by the full-text engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetOptions {
    pub left: String,
    pub right: String,
    pub truncation: String,
    /// Approximate number of tokens in each excerpt.
    pub tokens: i64,
}

impl SnippetOptions {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            truncation: "...".to_string(),
            tokens: 50,
        }
    }
}

/// A single full-text match, one per matching segment.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub href: String,
    pub position: i64,
    pub title: String,
    /// Raw segment text, or the marked-up excerpt when snippets were requested.
    pub content: String,
    pub doc_type: String,
}

/// A document matched by a tag filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilterHit {
    pub href: String,
    pub title: String,
    pub doc_type: String,
}
