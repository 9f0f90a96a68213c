//! # opentdb-import
//!
//! Imports trivia questions from the [Open Trivia Database](https://opentdb.com)
//! into a normalized SQLite schema.
//!
//! ## Design Philosophy
//!
//! opentdb-import is designed to be:
//! - **Idempotent** - Re-running an import never duplicates questions or answers
//! - **Polite** - One session token, capped pages and a fixed pause between requests
//! - **Contained failures** - A bad item skips itself, a bad category skips itself
//! - **Library-first** - The `opentdb-import` binary is a thin shell over this crate
//!
//! ## Quick Start
//!
//! ```no_run
//! use opentdb_import::{CategoryConfig, Config, Database, Importer, OpenTdbClient, TokenManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         categories: vec![CategoryConfig::new(9, "General Knowledge")],
//!         ..Default::default()
//!     };
//!
//!     let db = Arc::new(Database::new(&config.persistence.database_path).await?);
//!     let client = Arc::new(OpenTdbClient::new(&config.api, config.retry.clone())?);
//!     let tokens = TokenManager::new(client.clone(), db.clone());
//!
//!     let mut importer = Importer::new(client, db.clone(), tokens, config.import.clone());
//!     let report = importer.run(&config.categories).await;
//!     println!("{report}");
//!
//!     db.close().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// OpenTDB HTTP client
pub mod api;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Question text seen-set
pub mod dedup;
/// Error types
pub mod error;
/// Export of stored questions
pub mod export;
/// HTML entity decoding
pub mod html;
/// Paginated category import
pub mod importer;
/// Item, category and run reports
pub mod report;
/// Retry logic with exponential backoff
pub mod retry;
/// Persistence interface
pub mod store;
/// Session token lifecycle
pub mod token;
/// Core domain types
pub mod types;
/// Mapping of API items onto the schema
pub mod upsert;

// Re-export commonly used types
pub use api::{Batch, OpenTdbClient, RawQuestion};
pub use config::{CategoryConfig, Config, DedupScope, ImportConfig};
pub use db::Database;
pub use dedup::Deduplicator;
pub use error::{DatabaseError, Error, FetchError, PersistError, Result, TokenAcquisitionError};
pub use html::decode_html_entities;
pub use importer::Importer;
pub use report::{CategoryReport, CategoryStatus, ItemOutcome, RunReport, SkipReason, StopReason};
pub use store::{NewQuestion, QuestionStore};
pub use token::{FileTokenStore, TokenManager, TokenRecord, TokenState, TokenStore};
pub use types::{Difficulty, QuestionKind, ResponseCode};
