//! The index handle.
//!
//! [`Index`] owns the connection pool and the document type registry and is
//! the entry point for everything the presentation layer needs: indexing,
//! searching, tag filtering and lookups by href.

use sqlx::SqlitePool;
use std::collections::BTreeSet;

use crate::config::Config;
use crate::db;
use crate::doctype::DocumentTypeRegistry;
use crate::error::Result;
use crate::ingest::{self, UpsertOutcome};
use crate::migrate;
use crate::models::{IndexRequest, ParsedDocument, SearchHit, TagFilterHit};
use crate::query::{SearchRequest, TagFilterRequest};
use crate::search;
use crate::stats::{self, IndexStats};
use crate::tags;

/// Handle to an opened document index and its document-type registry.
pub struct Index {
    pool: SqlitePool,
    registry: DocumentTypeRegistry,
}

impl Index {
    /// Connect to the configured database and bring its schema up to date.
    pub async fn open(config: &Config, registry: DocumentTypeRegistry) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool, registry })
    }

    /// Parse `href` with the `doc_type` parser and store the result.
    pub async fn index_document(
        &self,
        doc_type: &str,
        href: &str,
        title: &str,
        tags: BTreeSet<String>,
    ) -> Result<UpsertOutcome> {
        let req = IndexRequest {
            href: href.to_string(),
            title: title.to_string(),
            tags,
        };
        let doc = self.registry.parse(doc_type, req).await?;
        self.upsert(&doc).await
    }

    /// Store an already parsed document.
    pub async fn upsert(&self, doc: &ParsedDocument) -> Result<UpsertOutcome> {
        ingest::upsert_document(&self.pool, doc).await
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<SearchHit>> {
        search::search(&self.pool, req).await
    }

    pub async fn filter_by_tags(&self, req: &TagFilterRequest) -> Result<Vec<TagFilterHit>> {
        search::filter_by_tags(&self.pool, req).await
    }

    pub async fn tags_by_href(&self, href: &str) -> Result<Vec<String>> {
        tags::tags_by_href(&self.pool, href).await
    }

    pub async fn href_exists(&self, href: &str) -> Result<bool> {
        ingest::href_exists(&self.pool, href).await
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        stats::collect_stats(&self.pool).await
    }

    pub fn registry(&self) -> &DocumentTypeRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
