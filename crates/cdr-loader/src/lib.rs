//! CDR Loader Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads call-record extract files into PostgreSQL.
//!
//! Each file in the scan directory whose name starts with `cdr` or `cmr`
//! carries a header of column names, a header of column types, then data
//! rows. The loader infers a table from the headers, inserts the rows in one
//! transaction per file, and moves the file into `archive/<YYYY>/<MM>`.
//!
//! # Example
//!
//! ```no_run
//! use cdr_loader::{config::Config, db, ingest::{Ingestor, PgSession}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let summary = Ingestor::new(config, PgSession::new(pool))?.run().await?;
//!     println!("{} rows from {} files", summary.total_entries, summary.parsed_files);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;

// Re-export commonly used types
pub use error::{IngestError, Result, StatementStage};
