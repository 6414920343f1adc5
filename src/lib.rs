//! # Knovleks
//!
//! A personal document index: notes, PDFs and other documents are stored as
//! ordered text segments with tags, and served back through ranked,
//! snippeted full-text search and conjunctive tag filters.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌────────────────┐
//! │ DocumentType │──▶│ ingest (upsert)  │──▶│     SQLite     │
//! │ note / pdf   │   │ segments + tags  │   │ tables + FTS5  │
//! └──────────────┘   └──────────────────┘   └───────┬────────┘
//!                                                   │
//!                    ┌──────────────────┐           │
//!                    │ query → search   │◀──────────┘
//!                    │ (literal retry)  │
//!                    └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! knov init
//! knov index ~/notes/lady.txt -t roman -t excerpt --title "The Lovely Lady"
//! knov search "shine" -t excerpt --show-tags
//! knov tags roman excerpt
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema and FTS triggers |
//! | [`models`] | Core data types |
//! | [`doctype`] | Document type trait and registry |
//! | [`segments`] | Positional segment reconciliation |
//! | [`tags`] | Tag set reconciliation |
//! | [`ingest`] | Atomic document upsert |
//! | [`query`] | Search and tag-filter query assembly |
//! | [`search`] | Query execution with literal-quoting retry |
//! | [`stats`] | Index statistics |
//! | [`index`] | The [`Index`] handle tying it together |

pub mod config;
pub mod db;
pub mod doctype;
pub mod error;
pub mod index;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod query;
pub mod search;
pub mod segments;
pub mod stats;
pub mod tags;

pub use error::{Error, Result};
pub use index::Index;
