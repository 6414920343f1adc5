//! # Knovleks CLI (`knov`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `knov init` | Create the SQLite database and schema |
//! | `knov index <href>` | Index (or re-index) a document |
//! | `knov search "<query>"` | Full-text search with snippets |
//! | `knov tags <tag>...` | List documents carrying every given tag |
//! | `knov exists <href>` | Check whether an href is indexed |
//! | `knov stats` | Show index counts |
//!
//! Logging goes to stderr; set `KNOV_LOG` (e.g. `KNOV_LOG=knovleks=debug`)
//! to override the `-v`/`-q` flags.

use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use knovleks::config;
use knovleks::doctype::{DocumentTypeRegistry, NOTE_TYPE};
use knovleks::query::{SearchRequest, TagFilterRequest};
use knovleks::Index;

/// Knovleks: a personal document index with tag-filtered full-text search.
#[derive(Parser)]
#[command(name = "knov", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/knov.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Index a document, updating it in place if its href is already known.
    Index {
        /// Source reference (file path).
        href: String,

        /// Tag to attach; repeat for several. Replaces the stored tag set.
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long, default_value = "")]
        title: String,

        /// Document type (`note`, `pdf`).
        #[arg(short = 'd', long = "type", default_value = NOTE_TYPE)]
        doc_type: String,
    },

    /// Full-text search.
    Search {
        query: String,

        /// Only documents carrying this tag; repeat to require several.
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Print each hit's tags.
        #[arg(long)]
        show_tags: bool,

        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(long)]
        doc_type: Option<String>,
    },

    /// List documents carrying every given tag.
    Tags {
        tags: Vec<String>,

        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(long)]
        doc_type: Option<String>,
    },

    /// Exit successfully if the href is indexed.
    Exists { href: String },

    /// Show document, segment and tag counts.
    Stats,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("KNOV_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cfg = config::load_config(&cli.config)?;
    let index = Index::open(&cfg, DocumentTypeRegistry::with_builtin()).await?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized successfully.");
        }
        Commands::Index {
            href,
            tags,
            title,
            doc_type,
        } => {
            let outcome = index
                .index_document(&doc_type, &href, &title, tags.into_iter().collect())
                .await?;
            println!(
                "{} {} ({} segments, {} tags)",
                if outcome.created { "indexed" } else { "updated" },
                href,
                outcome.segments.inserted + outcome.segments.updated,
                outcome.tag_count
            );
        }
        Commands::Search {
            query,
            tags,
            show_tags,
            limit,
            doc_type,
        } => {
            let req = SearchRequest {
                query,
                tags: tags.into_iter().collect::<BTreeSet<_>>(),
                limit: limit.or(cfg.search.limit),
                doc_type,
                snippet: Some(cfg.snippet.to_options()),
            };
            let hits = index.search(&req).await?;
            if hits.is_empty() {
                println!("No results.");
            }
            for hit in &hits {
                if hit.position > 0 {
                    println!("{} : page {}", hit.href, hit.position);
                } else {
                    println!("{}", hit.href);
                }
                if show_tags {
                    println!("tags: {}", index.tags_by_href(&hit.href).await?.join(", "));
                }
                println!("    {}", hit.content.replace('\n', " ").trim());
                println!();
            }
        }
        Commands::Tags {
            tags,
            limit,
            doc_type,
        } => {
            let req = TagFilterRequest {
                tags: tags.into_iter().collect(),
                limit: limit.or(cfg.search.limit),
                doc_type,
            };
            let hits = index.filter_by_tags(&req).await?;
            if hits.is_empty() {
                println!("No results.");
            }
            for hit in &hits {
                println!("{}\t{}\t{}", hit.href, hit.doc_type, hit.title);
            }
        }
        Commands::Exists { href } => {
            let exists = index.href_exists(&href).await?;
            index.close().await;
            if !exists {
                println!("not indexed: {}", href);
                std::process::exit(1);
            }
            println!("indexed: {}", href);
            return Ok(());
        }
        Commands::Stats => {
            let stats = index.stats().await?;
            println!("Knovleks Index Stats");
            println!("====================");
            println!();
            println!("  Database:    {}", cfg.db.path.display());
            println!("  Documents:   {}", stats.documents);
            println!("  Segments:    {}", stats.segments);
            println!("  Tags:        {}", stats.tags);
            println!("  Tag links:   {}", stats.links);
            if !stats.by_type.is_empty() {
                println!();
                for (doc_type, count) in &stats.by_type {
                    println!("  {:<12} {}", doc_type, count);
                }
            }
        }
    }

    index.close().await;
    Ok(())
}
