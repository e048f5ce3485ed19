//! Extract file ingestion
//!
//! Components, leaf-first:
//!
//! - [`schema`]: column names and store types from the two header lines
//! - [`rows`]: data lines to row values, with column-count validation
//! - [`statement`]: create-table and parameterized bulk-insert statements
//! - [`parser`]: ties the three together for one file
//! - [`store`]: the transaction contract against PostgreSQL
//! - [`archive`]: year/month partitioned archive of committed files
//! - [`driver`]: scan, load, archive, one file at a time

pub mod archive;
pub mod driver;
pub mod models;
pub mod parser;
pub mod rows;
pub mod schema;
pub mod statement;
pub mod store;

// Re-export commonly used types
pub use archive::Archiver;
pub use driver::{classify, discover, Ingestor};
pub use models::{Column, ColumnSpec, DiscoveredFile, IngestResult, RecordType, RowValues, RunSummary};
pub use parser::{ExtractParser, LoadPlan};
pub use statement::{CreateTableStatement, InsertStatement};
pub use store::{PgSession, StoreSession};
