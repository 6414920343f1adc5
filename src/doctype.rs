//! Document types and their registry.
//!
//! A [`DocumentType`] turns an [`IndexRequest`] (a source reference plus the
//! caller's title and tags) into a [`ParsedDocument`] with ordered segments.
//! The index only ever talks to the trait; the [`DocumentTypeRegistry`]
//! maps a type identifier such as `"note"` to the implementation.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use knovleks::doctype::{DocumentType, DocumentTypeRegistry};
//! use knovleks::models::{IndexRequest, ParsedDocument, Segment};
//!
//! struct Inline;
//!
//! #[async_trait]
//! impl DocumentType for Inline {
//!     fn type_id(&self) -> &str { "inline" }
//!
//!     async fn parse(&self, req: IndexRequest) -> knovleks::Result<ParsedDocument> {
//!         Ok(ParsedDocument {
//!             segments: vec![Segment::new(0, req.href.clone())],
//!             href: req.href,
//!             title: req.title,
//!             doc_type: "inline".to_string(),
//!             tags: req.tags,
//!         })
//!     }
//! }
//!
//! let mut registry = DocumentTypeRegistry::with_builtin();
//! registry.register(Box::new(Inline));
//! assert!(registry.get("inline").is_some());
//! ```

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{IndexRequest, ParsedDocument, Segment};

pub const NOTE_TYPE: &str = "note";
pub const PDF_TYPE: &str = "pdf";

/// A kind of document the index knows how to read.
#[async_trait]
pub trait DocumentType: Send + Sync {
    /// Identifier stored in the document's `doc_type` column.
    fn type_id(&self) -> &str;

    /// Read the source named by `req.href` and produce its segments.
    ///
    /// Implementations may override the title or add tags (a web page's
    /// own title and keywords, for example).
    async fn parse(&self, req: IndexRequest) -> Result<ParsedDocument>;
}

/// Maps type identifiers to [`DocumentType`] implementations.
pub struct DocumentTypeRegistry {
    types: BTreeMap<String, Box<dyn DocumentType>>,
}

impl DocumentTypeRegistry {
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Registry with the `note` and `pdf` types.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NoteDocument));
        registry.register(Box::new(PdfDocument));
        registry
    }

    /// Add a type, replacing any existing one with the same id.
    pub fn register(&mut self, doc_type: Box<dyn DocumentType>) {
        self.types.insert(doc_type.type_id().to_string(), doc_type);
    }

    pub fn get(&self, type_id: &str) -> Option<&dyn DocumentType> {
        self.types.get(type_id).map(|t| t.as_ref())
    }

    /// Parse `req` with the type registered under `type_id`.
    pub async fn parse(&self, type_id: &str, req: IndexRequest) -> Result<ParsedDocument> {
        let doc_type = self
            .get(type_id)
            .ok_or_else(|| Error::UnknownDocType(type_id.to_string()))?;
        doc_type.parse(req).await
    }

    pub fn type_ids(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }
}

impl Default for DocumentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A plain UTF-8 text file stored as a single segment.
pub struct NoteDocument;

#[async_trait]
impl DocumentType for NoteDocument {
    fn type_id(&self) -> &str {
        NOTE_TYPE
    }

    async fn parse(&self, req: IndexRequest) -> Result<ParsedDocument> {
        let content = tokio::fs::read_to_string(&req.href).await?;
        Ok(ParsedDocument {
            segments: vec![Segment::new(0, content)],
            href: req.href,
            title: req.title,
            doc_type: NOTE_TYPE.to_string(),
            tags: req.tags,
        })
    }
}

/// A PDF file, one segment per page numbered from 1.
pub struct PdfDocument;

#[async_trait]
impl DocumentType for PdfDocument {
    fn type_id(&self) -> &str {
        PDF_TYPE
    }

    async fn parse(&self, req: IndexRequest) -> Result<ParsedDocument> {
        let bytes = tokio::fs::read(&req.href).await?;
        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| Error::Parse {
            href: req.href.clone(),
            reason: e.to_string(),
        })?;

        Ok(ParsedDocument {
            segments: split_pages(&text),
            href: req.href,
            title: req.title,
            doc_type: PDF_TYPE.to_string(),
            tags: req.tags,
        })
    }
}

/// Split extracted PDF text on form feeds. Text without page breaks is one
/// page.
fn split_pages(text: &str) -> Vec<Segment> {
    text.split('\u{c}')
        .filter(|page| !page.trim().is_empty())
        .enumerate()
        .map(|(i, page)| Segment::new(i as i64 + 1, page.trim()))
        .collect()
}
