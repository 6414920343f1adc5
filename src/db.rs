//! SQLite database connection management.
//!
//! The index follows a single-writer model: the pool defaults to one
//! connection and every upsert runs inside one transaction on it.
//!
//! # In-memory databases
//!
//! A `:memory:` database lives only as long as its connection. For that path
//! the pool pins exactly one connection and disables idle and lifetime
//! recycling so the data is not silently dropped.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;
use crate::error::Result;

/// Create a connection pool to the configured SQLite database.
///
/// Creates the database file and its parent directories if they don't exist
/// and enables WAL journal mode for file databases.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    if config.db.is_memory() {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        return Ok(pool);
    }

    let db_path = &config.db.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
