//! Loader error types
//!
//! Every variant aborts the run. Nothing here is recovered locally: the
//! driver rolls back the open transaction when a statement fails and then
//! propagates the error up to `main`, which exits non-zero.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Point in the per-file transaction where a statement failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementStage {
    Begin,
    Create,
    Insert,
    Commit,
}

impl std::fmt::Display for StatementStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementStage::Begin => "begin",
            StatementStage::Create => "create",
            StatementStage::Insert => "insert",
            StatementStage::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Fatal ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// Configuration missing, unparseable or invalid
    #[error(transparent)]
    Config(#[from] cdr_common::CommonError),

    /// The column-name line or the column-type line is absent or empty
    #[error("File '{file}' is missing header line {line}")]
    MissingHeader { file: String, line: usize },

    /// Header declares a different number of names than types
    #[error("File '{file}' declares {names} column names but {types} column types")]
    HeaderShape {
        file: String,
        names: usize,
        types: usize,
    },

    /// Table or column name that cannot be used as a bare SQL identifier
    #[error("File '{file}': '{identifier}' is not a valid SQL identifier")]
    InvalidIdentifier { file: String, identifier: String },

    /// Column type token that is not a plain SQL type name
    #[error("File '{file}': column '{column}' has unsupported type '{store_type}'")]
    InvalidType {
        file: String,
        column: String,
        store_type: String,
    },

    /// Data row whose field count differs from the header's column count
    #[error(
        "Timestamp: {timestamp} File: {file} Line: {line} \
         (expected {expected} fields, found {found})"
    )]
    RowShape {
        timestamp: DateTime<Local>,
        file: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Begin, create, insert or commit failed; the transaction was rolled back
    #[error("Unable to insert content from file '{file}' ({stage} failed): {source}")]
    Statement {
        file: String,
        stage: StatementStage,
        #[source]
        source: sqlx::Error,
    },

    /// Listing, reading, archive directory creation or move failed
    #[error("Filesystem operation failed on '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection-level store failure outside a file's transaction
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl IngestError {
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn statement(file: impl Into<String>, stage: StatementStage, source: sqlx::Error) -> Self {
        Self::Statement {
            file: file.into(),
            stage,
            source,
        }
    }
}
