//! Error types for the index.
//!
//! Every failure the library can surface is one [`Error`] variant, so callers
//! can tell a store outage apart from a rejected search query or a rolled-back
//! upsert without string matching.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store could not be reached or rejected a statement.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Schema creation failed; the database is unusable or incompatible.
    #[error("schema error: {0}")]
    Schema(#[source] sqlx::Error),

    /// The free-text query was rejected even after literal quoting.
    #[error("malformed search query {query:?}: {source}")]
    QuerySyntax {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("unknown document type: {0}")]
    UnknownDocType(String),

    /// An upsert failed part way and was rolled back as a whole.
    #[error("failed to index {href}: {source}")]
    Upsert {
        href: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to parse {href}: {reason}")]
    Parse { href: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
