//! TOML configuration.
//!
//! The configuration is an explicit value handed to [`Index::open`](crate::index::Index::open);
//! the library never falls back to a default database location on its own.
//!
//! ```toml
//! [db]
//! path = "./data/knov.sqlite"
//!
//! [search]
//! limit = 20
//!
//! [snippet]
//! left = ">>>"
//! right = "<<<"
//! tokens = 50
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::SnippetOptions;

/// Path value that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Upper bound FTS5 places on the snippet token window.
const MAX_SNIPPET_TOKENS: i64 = 64;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub snippet: SnippetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    1
}

impl DbConfig {
    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchConfig {
    /// Default result cap when a request carries none.
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnippetConfig {
    #[serde(default = "default_left")]
    pub left: String,
    #[serde(default = "default_right")]
    pub right: String,
    #[serde(default = "default_truncation")]
    pub truncation: String,
    #[serde(default = "default_tokens")]
    pub tokens: i64,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
            truncation: default_truncation(),
            tokens: default_tokens(),
        }
    }
}

fn default_left() -> String {
    ">>>".to_string()
}
fn default_right() -> String {
    "<<<".to_string()
}
fn default_truncation() -> String {
    "...".to_string()
}
fn default_tokens() -> i64 {
    50
}

impl SnippetConfig {
    pub fn to_options(&self) -> SnippetOptions {
        SnippetOptions {
            left: self.left.clone(),
            right: self.right.clone(),
            truncation: self.truncation.clone(),
            tokens: self.tokens,
        }
    }
}

impl Config {
    /// Configuration for a throwaway in-memory index.
    pub fn in_memory() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from(MEMORY_PATH),
                max_connections: default_max_connections(),
            },
            search: SearchConfig::default(),
            snippet: SnippetConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.db.max_connections == 0 {
            return Err(Error::Config("db.max_connections must be >= 1".into()));
        }

        if let Some(limit) = self.search.limit {
            if limit < 1 {
                return Err(Error::Config("search.limit must be >= 1".into()));
            }
        }

        if !(1..=MAX_SNIPPET_TOKENS).contains(&self.snippet.tokens) {
            return Err(Error::Config(format!(
                "snippet.tokens must be in [1, {}]",
                MAX_SNIPPET_TOKENS
            )));
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse config file: {}", e)))?;

    config.validate()?;
    Ok(config)
}
